use crate::interpreter::error::RuntimeError;
use crate::token::SourcePos;
use crate::value::Value;

/// Outcome of executing a statement. Signals carry the position of the
/// statement that raised them so misuse can be reported at the right spot.
pub enum ControlFlow {
    Normal,
    Return(Value, SourcePos),
    Skip(SourcePos),
    Stop(SourcePos),
}

/// Error channel for expression evaluation. A `skip` or `stop` left over
/// from a function body travels through the call expression until the
/// statement containing it folds the signal into its own outcome, where the
/// dynamically enclosing loop can catch it.
pub enum Unwind {
    Error(RuntimeError),
    Skip(SourcePos),
    Stop(SourcePos),
}

impl Unwind {
    /// Fold into a statement outcome: errors stay fatal, signals become the
    /// statement's control flow.
    pub fn into_flow(self) -> Result<ControlFlow, RuntimeError> {
        match self {
            Unwind::Error(error) => Err(error),
            Unwind::Skip(pos) => Ok(ControlFlow::Skip(pos)),
            Unwind::Stop(pos) => Ok(ControlFlow::Stop(pos)),
        }
    }
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}
