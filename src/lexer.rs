use crate::diagnostic::{Diagnostics, Stage};
use crate::token::{SourcePos, Token, TokenKind, KEYWORDS};
use std::path::Path;
use std::rc::Rc;

fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lexes every file reachable from the entry script through `#include`
/// directives.
///
/// Each included file's tokens are hoisted in front of everything lexed so
/// far, so includes run before any statement of the including file. Only the
/// entry file's EOF token survives the merge, and a path is lexed at most
/// once no matter how many directives name it.
pub struct MultiFileLexer {
    tokens: Vec<Token>,
    added: Vec<String>,
}

impl MultiFileLexer {
    pub fn lex(entry_path: &str, diags: &mut Diagnostics) -> Vec<Token> {
        let mut multi = Self {
            tokens: Vec::new(),
            added: Vec::new(),
        };
        multi.lex_file(entry_path, diags);
        multi.tokens
    }

    fn lex_file(&mut self, path: &str, diags: &mut Diagnostics) {
        self.added.push(path.to_string());

        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                diags.report_flat(&format!("Couldn't read file '{}': {}", path, err));
                return;
            }
        };

        let mut lexer = Lexer::new(&source, Rc::from(path), diags);
        lexer.lex(diags);

        let mut tokens = lexer.tokens;
        if !self.tokens.is_empty() {
            tokens.pop();
        }
        tokens.append(&mut self.tokens);
        self.tokens = tokens;

        for include in lexer.includes {
            let included = include.lexeme.clone();
            if self.added.iter().any(|p| p == &included) {
                continue;
            }
            if !Path::new(&included).is_file() {
                diags.report(
                    &format!("file with path '{}' doesn't exist.", included),
                    &include.pos,
                );
                continue;
            }
            self.lex_file(&included, diags);
        }
    }
}

/// Single-file scanner. Errors are reported and lexing continues, so one
/// pass can surface several problems.
pub struct Lexer {
    chars: Vec<char>,
    i: usize,
    line: usize,
    column: usize,
    file: Rc<str>,
    pub tokens: Vec<Token>,
    pub includes: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str, file: Rc<str>, diags: &mut Diagnostics) -> Self {
        diags.add_source(Rc::clone(&file), source);
        Self {
            chars: source.chars().collect(),
            i: 0,
            line: 1,
            column: 0,
            file,
            tokens: Vec::new(),
            includes: Vec::new(),
        }
    }

    pub fn lex(&mut self, diags: &mut Diagnostics) {
        diags.set_stage(Stage::Lexing);

        while !self.is_end() {
            let c = self.current();

            if c == '\n' {
                self.line += 1;
                self.column = 0;
                self.i += 1;
                continue;
            }

            // Include directives are only recognized in the first column.
            if self.column == 0 && c == '#' {
                self.handle_include();
                continue;
            }

            if c == ' ' || c == '\r' || c == '\t' {
                self.advance();
                continue;
            }

            if c == '/' && self.check_next('/') {
                self.skip_comment();
                continue;
            }

            match c {
                '*' | '/' => {
                    if self.check_next('=') {
                        self.add_token(TokenKind::AssignOp, c);
                    } else {
                        self.add_token(TokenKind::FactorOp, c);
                    }
                    self.advance();
                }
                '+' | '-' => {
                    if self.check_next('=') {
                        self.add_token(TokenKind::AssignOp, c);
                    } else {
                        self.add_token(TokenKind::TermOp, c);
                    }
                    self.advance();
                }
                '=' => {
                    if self.check_next('=') {
                        self.add_token(TokenKind::ConditionalOp, "==");
                    } else {
                        self.add_token(TokenKind::AssignOp, "");
                    }
                    self.advance();
                }
                '>' | '<' => {
                    if self.check_next('=') {
                        self.add_token(TokenKind::ConditionalOp, format!("{}=", c));
                    } else {
                        self.add_token(TokenKind::ConditionalOp, c);
                    }
                    self.advance();
                }
                '!' => {
                    if self.check_next('=') {
                        self.add_token(TokenKind::ConditionalOp, "!=");
                    } else {
                        self.add_token(TokenKind::Exclamation, "");
                    }
                    self.advance();
                }
                ';' => {
                    self.add_token(TokenKind::Semicolon, "");
                    self.advance();
                }
                ',' => {
                    self.add_token(TokenKind::Comma, "");
                    self.advance();
                }
                '.' => {
                    self.add_token(TokenKind::Point, "");
                    self.advance();
                }
                '(' => {
                    self.add_token(TokenKind::OpenParen, "");
                    self.advance();
                }
                ')' => {
                    self.add_token(TokenKind::ClosedParen, "");
                    self.advance();
                }
                '{' => {
                    self.add_token(TokenKind::OpenCurly, "");
                    self.advance();
                }
                '}' => {
                    self.add_token(TokenKind::ClosedCurly, "");
                    self.advance();
                }
                '[' => {
                    self.add_token(TokenKind::OpenSquare, "");
                    self.advance();
                }
                ']' => {
                    self.add_token(TokenKind::ClosedSquare, "");
                    self.advance();
                }
                '"' => self.lex_string(diags),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_id_char(c) => self.lex_id(),
                _ => {
                    diags.report(&format!("Unexpected character '{}'", c), &self.pos_here());
                    self.advance();
                }
            }
        }

        self.add_token(TokenKind::Eof, "");
    }

    fn pos_here(&self) -> SourcePos {
        SourcePos::new(self.line, self.column, Rc::clone(&self.file))
    }

    fn is_end(&self) -> bool {
        self.i >= self.chars.len()
    }

    fn current(&self) -> char {
        self.chars[self.i]
    }

    fn advance(&mut self) {
        self.i += 1;
        self.column += 1;
    }

    /// If the next character matches, consume the current one and return true.
    fn check_next(&mut self, expected: char) -> bool {
        if self.i + 1 >= self.chars.len() {
            return false;
        }
        if self.chars[self.i + 1] == expected {
            self.advance();
            return true;
        }
        false
    }

    fn add_token(&mut self, kind: TokenKind, lexeme: impl Into<String>) {
        let pos = self.pos_here();
        self.tokens.push(Token::new(kind, lexeme, pos));
    }

    fn add_token_at(&mut self, kind: TokenKind, lexeme: impl Into<String>, column: usize) {
        let pos = SourcePos::new(self.line, column, Rc::clone(&self.file));
        self.tokens.push(Token::new(kind, lexeme, pos));
    }

    fn skip_comment(&mut self) {
        while !self.is_end() && self.current() != '\n' && self.current() != '\r' {
            self.advance();
        }
    }

    fn handle_include(&mut self) {
        self.advance();
        let column = self.column;

        let mut path = String::new();
        while !self.is_end() && self.current() != '\n' && self.current() != '\r' {
            path.push(self.current());
            self.advance();
        }

        let pos = SourcePos::new(self.line, column, Rc::clone(&self.file));
        self.includes.push(Token::new(TokenKind::Include, path, pos));
    }

    fn lex_number(&mut self) {
        let start_column = self.column;
        let mut num = String::from(self.current());
        self.advance();

        while !self.is_end() && self.current().is_ascii_digit() {
            num.push(self.current());
            self.advance();
        }

        if !self.is_end() && self.current() == '.' {
            num.push('.');
            self.advance();
            while !self.is_end() && self.current().is_ascii_digit() {
                num.push(self.current());
                self.advance();
            }
        }

        self.add_token_at(TokenKind::Number, num, start_column);
    }

    fn lex_string(&mut self, diags: &mut Diagnostics) {
        let start_column = self.column;
        self.advance();

        let mut string = String::new();
        let mut closed = true;

        while !self.is_end() && self.current() != '"' {
            let mut c = self.current();

            if c == '\\' {
                self.advance();
                if self.is_end() || self.current() == '\n' || self.current() == '\r' {
                    closed = false;
                    break;
                }

                c = self.current();
                match c {
                    'n' => c = '\n',
                    't' => c = '\t',
                    'r' => c = '\r',
                    '"' => c = '"',
                    '\\' => c = '\\',
                    first if is_hex(first) => {
                        let mut value = String::from(first);
                        self.advance();
                        if self.is_end() {
                            closed = false;
                            break;
                        }
                        c = self.current();
                        value.push(c);
                        if is_hex(c) {
                            c = char::from(u8::from_str_radix(&value, 16).unwrap_or(0));
                        } else {
                            diags.report(
                                &format!(
                                    "invalid hex number '{}' found in string. needs to be 2 digits",
                                    value
                                ),
                                &self.pos_here(),
                            );
                        }
                    }
                    _ => {
                        diags.report(
                            &format!("invalid escape character '\\{}'", c),
                            &self.pos_here(),
                        );
                    }
                }
            }

            string.push(c);
            self.advance();

            if self.is_end() || self.current() == '\n' || self.current() == '\r' {
                closed = false;
                break;
            }
        }

        if closed && !self.is_end() {
            self.advance();
        } else {
            closed = false;
        }

        if !closed {
            let pos = SourcePos::new(self.line, start_column, Rc::clone(&self.file));
            diags.report("Start of unclosed string", &pos);
        }

        self.add_token_at(TokenKind::Str, string, start_column);
    }

    fn lex_id(&mut self) {
        let start_column = self.column;
        let mut id = String::from(self.current());
        self.advance();

        while !self.is_end() && is_id_char(self.current()) {
            id.push(self.current());
            self.advance();
        }

        match id.as_str() {
            "true" => self.add_token_at(TokenKind::True, "", start_column),
            "false" => self.add_token_at(TokenKind::False, "", start_column),
            "novalue" => self.add_token_at(TokenKind::NoValue, "", start_column),
            "and" | "or" => self.add_token_at(TokenKind::LogicalOp, id, start_column),
            _ if KEYWORDS.contains(&id.as_str()) => {
                self.add_token_at(TokenKind::Keyword, id, start_column)
            }
            _ => self.add_token_at(TokenKind::Identifier, id, start_column),
        }
    }
}
