use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::TreeWalker;
use crate::token::SourcePos;
use crate::value::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn path_arg(value: &Value, name: &str, pos: &SourcePos) -> Result<String, RuntimeError> {
    match value {
        Value::Str(chars) => Ok(chars.borrow().iter().collect()),
        _ => Err(RuntimeError::type_error(
            format!(
                "First argument of '{}' must be the path to a file as a string",
                name
            ),
            pos.clone(),
        )),
    }
}

pub fn read(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let path = path_arg(&args[0], "read", pos)?;
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(Value::string(&contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(RuntimeError::type_error(
            format!("File '{}' couldn't be found", path),
            pos.clone(),
        )),
        Err(e) => Err(RuntimeError::flat(format!(
            "Failed to read file '{}': {}",
            path, e
        ))),
    }
}

pub fn write(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let path = path_arg(&args[0], "write", pos)?;
    let Value::Str(contents) = &args[1] else {
        return Err(RuntimeError::type_error(
            "Second argument of 'write' must be a string of the new contents of the file",
            pos.clone(),
        ));
    };

    let contents: String = contents.borrow().iter().collect();
    fs::write(&path, contents.as_bytes())
        .map_err(|e| RuntimeError::flat(format!("Failed to write file '{}': {}", path, e)))?;
    Ok(Value::NoValue)
}

pub fn exists(
    _walker: &mut TreeWalker,
    args: Vec<Value>,
    pos: &SourcePos,
) -> Result<Value, RuntimeError> {
    let path = path_arg(&args[0], "exists", pos)?;
    Ok(Value::Bool(Path::new(&path).is_file()))
}
