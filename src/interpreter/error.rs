use crate::diagnostic::Diagnostics;
use crate::token::SourcePos;

/// A fatal runtime error. Everything except `Flat` carries the position of
/// the expression or statement it originated from.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndeclaredVariable {
        name: String,
        action: &'static str,
        pos: SourcePos,
    },
    RedeclaredVariable {
        name: String,
        pos: SourcePos,
    },
    RedeclaredFunction {
        name: String,
        pos: SourcePos,
    },
    NotCallable {
        pos: SourcePos,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        pos: SourcePos,
    },
    IndexOutOfBounds {
        index: i64,
        length: usize,
        pos: SourcePos,
    },
    DivisionByZero {
        pos: SourcePos,
    },
    TypeError {
        message: String,
        pos: SourcePos,
    },
    SignalMisuse {
        signal: &'static str,
        context: &'static str,
        pos: SourcePos,
    },
    Flat {
        message: String,
    },
}

impl RuntimeError {
    pub fn undeclared(name: impl Into<String>, action: &'static str, pos: SourcePos) -> Self {
        Self::UndeclaredVariable {
            name: name.into(),
            action,
            pos,
        }
    }

    pub fn redeclared(name: impl Into<String>, pos: SourcePos) -> Self {
        Self::RedeclaredVariable {
            name: name.into(),
            pos,
        }
    }

    pub fn redeclared_function(name: impl Into<String>, pos: SourcePos) -> Self {
        Self::RedeclaredFunction {
            name: name.into(),
            pos,
        }
    }

    pub fn not_callable(pos: SourcePos) -> Self {
        Self::NotCallable { pos }
    }

    pub fn arity_mismatch(name: impl Into<String>, expected: usize, actual: usize, pos: SourcePos) -> Self {
        Self::ArityMismatch {
            name: name.into(),
            expected,
            actual,
            pos,
        }
    }

    pub fn index_out_of_bounds(index: i64, length: usize, pos: SourcePos) -> Self {
        Self::IndexOutOfBounds { index, length, pos }
    }

    pub fn division_by_zero(pos: SourcePos) -> Self {
        Self::DivisionByZero { pos }
    }

    pub fn type_error(message: impl Into<String>, pos: SourcePos) -> Self {
        Self::TypeError {
            message: message.into(),
            pos,
        }
    }

    pub fn signal_misuse(signal: &'static str, context: &'static str, pos: SourcePos) -> Self {
        Self::SignalMisuse {
            signal,
            context,
            pos,
        }
    }

    pub fn flat(message: impl Into<String>) -> Self {
        Self::Flat {
            message: message.into(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::UndeclaredVariable { name, action, .. } => format!(
                "Tried to {} variable '{}' that doesn't exist in the current scope",
                action, name
            ),
            Self::RedeclaredVariable { name, .. } => format!(
                "Tried to declare variable '{}' that already exists in the current scope",
                name
            ),
            Self::RedeclaredFunction { name, .. } => format!(
                "Tried to define a function with name '{}', but such a variable already exists in the global scope.",
                name
            ),
            Self::NotCallable { .. } => "Tried to call a non-callable expression".to_string(),
            Self::ArityMismatch {
                name,
                expected,
                actual,
                ..
            } => {
                let direction = if actual > expected { "many" } else { "few" };
                format!(
                    "Too {} arguments passed to function '{}'. Expected {} got {}",
                    direction, name, expected, actual
                )
            }
            Self::IndexOutOfBounds { index, length, .. } => format!(
                "List index out of bounds. Tried to access item '{}' from list of size '{}'",
                index, length
            ),
            Self::DivisionByZero { .. } => "Division by zero".to_string(),
            Self::TypeError { message, .. } => message.clone(),
            Self::SignalMisuse {
                signal, context, ..
            } => format!("Use of '{}' outside of a {}", signal, context),
            Self::Flat { message } => message.clone(),
        }
    }

    pub fn pos(&self) -> Option<&SourcePos> {
        match self {
            Self::UndeclaredVariable { pos, .. }
            | Self::RedeclaredVariable { pos, .. }
            | Self::RedeclaredFunction { pos, .. }
            | Self::NotCallable { pos }
            | Self::ArityMismatch { pos, .. }
            | Self::IndexOutOfBounds { pos, .. }
            | Self::DivisionByZero { pos }
            | Self::TypeError { pos, .. }
            | Self::SignalMisuse { pos, .. } => Some(pos),
            Self::Flat { .. } => None,
        }
    }

    pub fn report(&self, diags: &mut Diagnostics) {
        match self.pos() {
            Some(pos) => diags.report(&self.message(), pos),
            None => diags.report_flat(&self.message()),
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RuntimeError {}
