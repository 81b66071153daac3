use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::TreeWalker;
use crate::token::SourcePos;
use crate::value::Value;

pub fn length(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
        Value::Str(chars) => Ok(Value::Number(chars.borrow().len() as f64)),
        other => Err(RuntimeError::type_error(
            format!(
                "Tried to get length of a non-list type '{}'",
                other.type_name()
            ),
            pos.clone(),
        )),
    }
}

pub fn push(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::List(items) => {
            items.borrow_mut().push(args[1].clone());
            Ok(Value::NoValue)
        }
        Value::Str(chars) => {
            let value = &args[1];
            if !value.is_char() {
                return Err(RuntimeError::type_error(
                    "Tried to push a non-character onto a string",
                    pos.clone(),
                ));
            }
            if let Value::Str(cell) = value {
                chars.borrow_mut().push(cell.borrow()[0]);
            }
            Ok(Value::NoValue)
        }
        other => Err(RuntimeError::type_error(
            format!("Tried to push to a non-list type '{}'", other.type_name()),
            pos.clone(),
        )),
    }
}

pub fn pop(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let raw = match &args[1] {
        Value::Number(n) => *n,
        other => {
            return Err(RuntimeError::type_error(
                format!(
                    "Cannot pop with non-numeric index of type '{}'",
                    other.type_name()
                ),
                pos.clone(),
            ))
        }
    };

    match &args[0] {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let index = pop_index(raw, items.len(), pos)?;
            Ok(items.remove(index))
        }
        Value::Str(chars) => {
            let mut chars = chars.borrow_mut();
            let index = pop_index(raw, chars.len(), pos)?;
            Ok(Value::string(&chars.remove(index).to_string()))
        }
        other => Err(RuntimeError::type_error(
            format!("Tried to pop from a non-list type '{}'", other.type_name()),
            pos.clone(),
        )),
    }
}

fn pop_index(raw: f64, length: usize, pos: &SourcePos) -> Result<usize, RuntimeError> {
    let raw = raw as i64;
    let mut index = raw;
    if index < 0 {
        index += length as i64;
    }
    if index < 0 || index >= length as i64 {
        return Err(RuntimeError::type_error(
            format!(
                "Index out of bounds! Cannot pop item '{}' from list of size '{}'",
                raw, length
            ),
            pos.clone(),
        ));
    }
    Ok(index as usize)
}
