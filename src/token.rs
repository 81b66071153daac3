use std::fmt;
use std::rc::Rc;

/// A position in a source file. Columns are zero-based and reset on every
/// newline; lines start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub column: usize,
    pub file: Rc<str>,
}

impl SourcePos {
    pub fn new(line: usize, column: usize, file: Rc<str>) -> Self {
        Self { line, column, file }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals and identifiers
    Number,
    Str,
    Identifier,
    True,
    False,
    NoValue,

    // Operator classes; the concrete operator lives in the lexeme
    TermOp,
    FactorOp,
    ConditionalOp,
    LogicalOp,
    AssignOp,

    // Punctuation
    Semicolon,
    Exclamation,
    Comma,
    Point,
    OpenParen,
    ClosedParen,
    OpenSquare,
    ClosedSquare,
    OpenCurly,
    ClosedCurly,

    Keyword,
    Include,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TokenKind::Number => "num",
            TokenKind::Str => "str",
            TokenKind::Identifier => "identifier",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::NoValue => "novalue",
            TokenKind::TermOp => "term_op",
            TokenKind::FactorOp => "factor_op",
            TokenKind::ConditionalOp => "conditional_op",
            TokenKind::LogicalOp => "logical_op",
            TokenKind::AssignOp => "ass_op",
            TokenKind::Semicolon => ";",
            TokenKind::Exclamation => "!",
            TokenKind::Comma => ",",
            TokenKind::Point => ".",
            TokenKind::OpenParen => "(",
            TokenKind::ClosedParen => ")",
            TokenKind::OpenSquare => "[",
            TokenKind::ClosedSquare => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::ClosedCurly => "}",
            TokenKind::Keyword => "keyword",
            TokenKind::Include => "include",
            TokenKind::Eof => "eof",
        };
        write!(f, "{}", tag)
    }
}

pub const KEYWORDS: &[&str] = &[
    "if", "else", "stop", "skip", "while", "for", "return", "print", "var", "fun", "input",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: SourcePos,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }
}
