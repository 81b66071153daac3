use crate::ast::Stmt;
use crate::interpreter::control_flow::Unwind;
use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::TreeWalker;
use crate::token::SourcePos;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A runtime value. Strings are mutable character sequences and lists are
/// shared mutable vectors, so both live behind `Rc<RefCell<..>>` and
/// assignment aliases rather than copies.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(Rc<RefCell<Vec<char>>>),
    Bool(bool),
    List(Rc<RefCell<Vec<Value>>>),
    NoValue,
    Callable(Rc<dyn Callable>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Str(Rc::new(RefCell::new(s.chars().collect())))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Only `false` and `novalue` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::NoValue => false,
            _ => true,
        }
    }

    /// Type name as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::NoValue => "novalue",
            Value::Callable(_) => "function",
        }
    }

    /// True for the single-character strings that can occupy a string cell.
    pub fn is_char(&self) -> bool {
        matches!(self, Value::Str(s) if s.borrow().len() == 1)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => *a.borrow() == *b.borrow(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            (Value::NoValue, Value::NoValue) => true,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s.borrow().iter().collect::<String>()),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::List(items) => write!(f, "List({:?})", items.borrow()),
            Value::NoValue => write!(f, "NoValue"),
            Value::Callable(c) => write!(f, "Callable({})", c.name()),
        }
    }
}

/// Anything a `Call` expression can invoke: user functions and natives.
/// Loop signals left over from a user function body surface as `Unwind`,
/// not as values.
pub trait Callable {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn call(
        &self,
        walker: &mut TreeWalker,
        args: Vec<Value>,
        pos: &SourcePos,
    ) -> Result<Value, Unwind>;
}

/// A function declared with `fun`. The body executes in a fresh scope
/// parented to the global scope, so functions never close over locals.
pub struct UserFunction {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    pub body: Vec<Stmt>,
}

impl Callable for UserFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.params.len()
    }

    fn call(
        &self,
        walker: &mut TreeWalker,
        args: Vec<Value>,
        pos: &SourcePos,
    ) -> Result<Value, Unwind> {
        walker.call_function(self, args, pos)
    }
}

pub type NativeFn = fn(&mut TreeWalker, Vec<Value>, &SourcePos) -> Result<Value, RuntimeError>;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        walker: &mut TreeWalker,
        args: Vec<Value>,
        pos: &SourcePos,
    ) -> Result<Value, Unwind> {
        Ok((self.func)(walker, args, pos)?)
    }
}
