pub mod ast;
pub mod cli;
pub mod diagnostic;
pub mod format;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Stmt, StmtKind};
pub use token::Token;
pub use value::Value;
