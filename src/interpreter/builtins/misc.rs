use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::TreeWalker;
use crate::token::SourcePos;
use crate::value::Value;

pub fn exit(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    match args[0].as_number() {
        Some(code) => std::process::exit(code as i32),
        None => Err(RuntimeError::type_error(
            format!(
                "First argument of 'exit' must be a number, got '{}'",
                args[0].type_name()
            ),
            pos.clone(),
        )),
    }
}

/// Command-line argument by index; index 0 is the script path. Out-of-range
/// indices yield `novalue`.
pub fn arg(
    walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let Some(raw) = args[0].as_number() else {
        return Err(RuntimeError::type_error(
            format!(
                "First argument of 'arg' must be a number, got '{}'",
                args[0].type_name()
            ),
            pos.clone(),
        ));
    };

    let index = raw as i64;
    if index < 0 {
        return Ok(Value::NoValue);
    }
    match walker.script_args.get(index as usize) {
        Some(value) => Ok(Value::string(value)),
        None => Ok(Value::NoValue),
    }
}

/// Code point to single-character string, or the reverse, picked by the
/// argument's type. Unencodable code points yield `novalue`.
pub fn char_code(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Number(n) => {
            let code = *n as i64;
            if code < 0 || code > u32::MAX as i64 {
                return Ok(Value::NoValue);
            }
            match char::from_u32(code as u32) {
                Some(c) => Ok(Value::string(&c.to_string())),
                None => Ok(Value::NoValue),
            }
        }
        Value::Str(chars) => {
            let chars = chars.borrow();
            if chars.len() != 1 {
                return Err(RuntimeError::type_error(
                    "First argument of 'char' must be a number or a single character string",
                    pos.clone(),
                ));
            }
            Ok(Value::Number(chars[0] as u32 as f64))
        }
        _ => Err(RuntimeError::type_error(
            "First argument of 'char' must be a number or a single character string",
            pos.clone(),
        )),
    }
}

pub fn type_of(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    _pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    Ok(match &args[0] {
        Value::Number(_) => Value::string("number"),
        Value::Str(_) => Value::string("string"),
        Value::Bool(_) => Value::string("bool"),
        Value::List(_) => Value::string("list"),
        Value::Callable(_) => Value::string("function"),
        Value::NoValue => Value::NoValue,
    })
}
