use crate::format;
use crate::token::SourcePos;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    And,
    Or,
}

impl BinaryOp {
    /// Maps an operator lexeme (as produced by the lexer) to its operator.
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "==" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::NotEq),
            ">" => Some(BinaryOp::Greater),
            ">=" => Some(BinaryOp::GreaterEq),
            "<" => Some(BinaryOp::Less),
            "<=" => Some(BinaryOp::LessEq),
            "and" => Some(BinaryOp::And),
            "or" => Some(BinaryOp::Or),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    ListLiteral(Vec<Expr>),
    Variable(Rc<str>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Input(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, pos: SourcePos) -> Self {
        Self { kind, pos }
    }

    /// Renders the expression tree in parenthesized prefix form, e.g.
    /// `1 + 2 * 3` becomes `(+ 1 (* 2 3))`.
    pub fn to_prefix_string(&self) -> String {
        match &self.kind {
            ExprKind::Literal(value) => format::render_value(value),
            ExprKind::ListLiteral(items) => {
                let rendered: Vec<String> = items.iter().map(|e| e.to_prefix_string()).collect();
                format!("[{}]", rendered.join(", "))
            }
            ExprKind::Variable(name) => name.to_string(),
            ExprKind::Unary { op, operand } => {
                format!("({} {})", op, operand.to_prefix_string())
            }
            ExprKind::Binary { op, left, right } => {
                format!(
                    "({} {} {})",
                    op,
                    left.to_prefix_string(),
                    right.to_prefix_string()
                )
            }
            ExprKind::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(|e| e.to_prefix_string()).collect();
                format!("({} {})", callee.to_prefix_string(), rendered.join(", "))
            }
            ExprKind::Index { base, index } => {
                format!(
                    "(index {} {})",
                    base.to_prefix_string(),
                    index.to_prefix_string()
                )
            }
            ExprKind::Input(prompt) => format!("(input {})", prompt.to_prefix_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: SourcePos,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: SourcePos) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expr(Expr),
    Print(Expr),
    VarDecl {
        name: Rc<str>,
        init: Expr,
    },
    VarSet {
        name: Rc<str>,
        value: Expr,
    },
    IndexSet {
        target: Expr,
        index: Expr,
        value: Expr,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        post: Option<Box<Stmt>>,
    },
    Function {
        name: Rc<str>,
        params: Vec<Rc<str>>,
        body: Vec<Stmt>,
    },
    Return(Expr),
    Skip,
    Stop,
}
