use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::TreeWalker;
use crate::token::SourcePos;
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// String to number, `novalue` on anything unparseable or non-string.
pub fn num(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    _pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let Value::Str(chars) = &args[0] else {
        return Ok(Value::NoValue);
    };
    let text: String = chars.borrow().iter().collect();
    match text.trim().parse::<f64>() {
        Ok(n) => Ok(Value::Number(n)),
        Err(_) => Ok(Value::NoValue),
    }
}

pub fn rng(
    walker: &mut TreeWalker,
    _args: Vec<Value>,
    _pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    Ok(Value::Number(walker.rng.r#gen::<f64>()))
}

pub fn seed(
    walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let seed = match &args[0] {
        Value::Number(n) => n.to_bits(),
        Value::Str(chars) => {
            let mut hasher = DefaultHasher::new();
            chars.borrow().iter().collect::<String>().hash(&mut hasher);
            hasher.finish()
        }
        other => {
            return Err(RuntimeError::type_error(
                format!(
                    "First argument of 'seed' must be a number or a string, got '{}'",
                    other.type_name()
                ),
                pos.clone(),
            ))
        }
    };
    walker.rng = StdRng::seed_from_u64(seed);
    Ok(Value::NoValue)
}

pub fn round(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    _pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    match args[0].as_number() {
        Some(n) => Ok(Value::Number(n.round())),
        None => Ok(Value::NoValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn pos() -> SourcePos {
        SourcePos {
            line: 1,
            column: 1,
            file: Rc::from("test.sil"),
        }
    }

    fn walker() -> TreeWalker {
        TreeWalker::new(vec!["test.sil".to_string()])
    }

    #[test]
    fn test_num_parses_or_yields_novalue() {
        let mut w = walker();
        assert_eq!(
            num(&mut w, vec![Value::string("4.5")], &pos()),
            Ok(Value::Number(4.5))
        );
        assert_eq!(
            num(&mut w, vec![Value::string("nope")], &pos()),
            Ok(Value::NoValue)
        );
        assert_eq!(
            num(&mut w, vec![Value::Bool(true)], &pos()),
            Ok(Value::NoValue)
        );
    }

    #[test]
    fn test_rng_is_in_unit_interval() {
        let mut w = walker();
        for _ in 0..100 {
            let Ok(Value::Number(n)) = rng(&mut w, vec![], &pos()) else {
                panic!("rng failed");
            };
            assert!((0.0..1.0).contains(&n));
        }
    }

    #[test]
    fn test_seed_makes_rng_deterministic() {
        let mut a = walker();
        let mut b = walker();
        seed(&mut a, vec![Value::Number(7.0)], &pos()).unwrap();
        seed(&mut b, vec![Value::Number(7.0)], &pos()).unwrap();
        for _ in 0..10 {
            assert_eq!(
                rng(&mut a, vec![], &pos()),
                rng(&mut b, vec![], &pos())
            );
        }
    }

    #[test]
    fn test_seed_accepts_strings() {
        let mut a = walker();
        let mut b = walker();
        seed(&mut a, vec![Value::string("lucky")], &pos()).unwrap();
        seed(&mut b, vec![Value::string("lucky")], &pos()).unwrap();
        assert_eq!(rng(&mut a, vec![], &pos()), rng(&mut b, vec![], &pos()));

        let error = seed(&mut a, vec![Value::NoValue], &pos()).unwrap_err();
        assert!(error.message().contains("'seed'"));
    }

    #[test]
    fn test_round() {
        let mut w = walker();
        assert_eq!(
            round(&mut w, vec![Value::Number(1.4)], &pos()),
            Ok(Value::Number(1.0))
        );
        assert_eq!(
            round(&mut w, vec![Value::Number(1.6)], &pos()),
            Ok(Value::Number(2.0))
        );
        assert_eq!(
            round(&mut w, vec![Value::string("x")], &pos()),
            Ok(Value::NoValue)
        );
    }
}
