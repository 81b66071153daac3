use crate::ast::{BinaryOp, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use crate::diagnostic::{Diagnostics, Stage};
use crate::token::{SourcePos, Token, TokenKind};
use crate::value::Value;
use std::rc::Rc;

/// Parsing gives up after this many errors; past that point the token
/// stream is usually garbage and further reports are noise.
const MAX_PARSE_ERRORS: usize = 10;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub pos: SourcePos,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

/// Recursive-descent parser over the lexed token stream.
///
/// Statement-level errors synchronize to the next `;` or `}` and parsing
/// continues, so a single pass can report several syntax errors. Once any
/// error is recorded the parse result is an empty program.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(&mut self, diags: &mut Diagnostics) -> Vec<Stmt> {
        diags.set_stage(Stage::Parsing);

        if self.tokens.is_empty() {
            return Vec::new();
        }

        let mut stmts = Vec::new();
        while !self.is_end() {
            match self.parse_statement() {
                Ok(Some(stmt)) => stmts.push(stmt),
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                    if self.errors.len() >= MAX_PARSE_ERRORS {
                        break;
                    }
                }
            }
        }

        if self.errors.is_empty() {
            return stmts;
        }

        for error in &self.errors {
            diags.report(&error.message, &error.pos);
        }
        Vec::new()
    }

    fn is_end(&self) -> bool {
        self.current >= self.tokens.len() || self.tokens[self.current].kind == TokenKind::Eof
    }

    fn current(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn current_pos(&self) -> SourcePos {
        self.current().pos.clone()
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_end() && self.current().kind == kind
    }

    fn check_keyword(&self, word: &str) -> bool {
        self.check(TokenKind::Keyword) && self.current().lexeme == word
    }

    fn peek(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|t| t.kind == kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            let token = self.current().clone();
            self.advance();
            return Ok(token);
        }

        Err(ParseError::new(
            format!("Expected '{}' but got '{}' instead", kind, self.current().kind),
            self.current_pos(),
        ))
    }

    /// Skip to just past the next `;` or `}` so the next statement can be
    /// tried.
    fn synchronize(&mut self) {
        while !self.is_end() {
            match self.current().kind {
                TokenKind::Semicolon | TokenKind::ClosedCurly => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        if self.check_keyword("print") {
            return self.parse_print().map(Some);
        }
        if self.check_keyword("fun") {
            return self.parse_function().map(Some);
        }
        if self.check_keyword("return") {
            return self.parse_return().map(Some);
        }
        if self.check_keyword("skip") {
            return self.parse_signal("skip").map(Some);
        }
        if self.check_keyword("stop") {
            return self.parse_signal("stop").map(Some);
        }
        if self.check_keyword("var") {
            return self.parse_var_decl().map(Some);
        }
        if self.check_keyword("while") {
            return self.parse_while().map(Some);
        }
        if self.check_keyword("for") {
            return self.parse_for().map(Some);
        }
        if self.check_keyword("if") {
            return self.parse_if().map(Some);
        }
        if self.check(TokenKind::Identifier) && self.peek(TokenKind::AssignOp) {
            return self.parse_var_set().map(Some);
        }
        if self.check(TokenKind::Identifier) && self.peek(TokenKind::OpenSquare) {
            return self.parse_index_set().map(Some);
        }
        if self.check(TokenKind::OpenCurly) {
            return self.parse_block().map(Some);
        }

        self.parse_expr_stmt()
    }

    fn parse_expr_stmt(&mut self) -> Result<Option<Stmt>, ParseError> {
        if self.check(TokenKind::Semicolon) {
            self.advance();
            return Ok(None);
        }

        let pos = self.current_pos();
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Some(Stmt::new(StmtKind::Expr(expr), pos)))
    }

    /// A statement used as a body. A lone `;` becomes an empty statement so
    /// constructs like `while x;` stay runnable.
    fn parse_body(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        match self.parse_statement()? {
            Some(stmt) => Ok(stmt),
            None => Ok(Stmt::new(
                StmtKind::Expr(Expr::new(ExprKind::Literal(Value::NoValue), pos.clone())),
                pos,
            )),
        }
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::new(StmtKind::Print(expr), pos))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let expr = if self.check(TokenKind::Semicolon) {
            Expr::new(ExprKind::Literal(Value::NoValue), pos.clone())
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::new(StmtKind::Return(expr), pos))
    }

    /// `skip;` / `stop;`, optionally guarded: `skip <expr>;` is sugar for
    /// `if <expr> skip;`.
    fn parse_signal(&mut self, which: &str) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let guard = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let kind = if which == "skip" {
            StmtKind::Skip
        } else {
            StmtKind::Stop
        };
        let signal = Stmt::new(kind, pos.clone());

        match guard {
            Some(condition) => Ok(Stmt::new(
                StmtKind::If {
                    condition,
                    then_branch: Box::new(signal),
                    else_branch: None,
                },
                pos,
            )),
            None => Ok(signal),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let name_token = self.expect(TokenKind::Identifier)?;
        let name: Rc<str> = Rc::from(name_token.lexeme.as_str());

        let init = if self.check(TokenKind::AssignOp) && self.current().lexeme.is_empty() {
            self.advance();
            self.parse_expression()?
        } else {
            Expr::new(ExprKind::Literal(Value::NoValue), pos.clone())
        };

        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::new(StmtKind::VarDecl { name, init }, pos))
    }

    fn parse_var_set(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        let name: Rc<str> = Rc::from(self.current().lexeme.as_str());
        self.advance();

        let op_token = self.expect(TokenKind::AssignOp)?;
        let mut value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;

        // Compound assignment desugars to the plain form.
        if !op_token.lexeme.is_empty() {
            let op = self.assign_op(&op_token)?;
            value = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(Expr::new(ExprKind::Variable(Rc::clone(&name)), pos.clone())),
                    right: Box::new(value),
                },
                pos.clone(),
            );
        }

        Ok(Stmt::new(StmtKind::VarSet { name, value }, pos))
    }

    fn parse_index_set(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        let name: Rc<str> = Rc::from(self.current().lexeme.as_str());
        self.advance();

        let mut target = Expr::new(ExprKind::Variable(name), pos.clone());
        let final_index;
        loop {
            self.expect(TokenKind::OpenSquare)?;
            let index = self.parse_expression()?;
            self.expect(TokenKind::ClosedSquare)?;
            if self.check(TokenKind::OpenSquare) {
                target = Expr::new(
                    ExprKind::Index {
                        base: Box::new(target),
                        index: Box::new(index),
                    },
                    pos.clone(),
                );
            } else {
                final_index = index;
                break;
            }
        }

        let op_token = self.expect(TokenKind::AssignOp)?;
        let mut value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;

        // `l[i] op= e` desugars to `l[i] = l[i] op e`.
        if !op_token.lexeme.is_empty() {
            let op = self.assign_op(&op_token)?;
            value = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(Expr::new(
                        ExprKind::Index {
                            base: Box::new(target.clone()),
                            index: Box::new(final_index.clone()),
                        },
                        pos.clone(),
                    )),
                    right: Box::new(value),
                },
                pos.clone(),
            );
        }

        Ok(Stmt::new(
            StmtKind::IndexSet {
                target,
                index: final_index,
                value,
            },
            pos,
        ))
    }

    fn assign_op(&self, token: &Token) -> Result<BinaryOp, ParseError> {
        BinaryOp::from_lexeme(&token.lexeme).ok_or_else(|| {
            ParseError::new(
                format!("Invalid assignment operator '{}='", token.lexeme),
                token.pos.clone(),
            )
        })
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let mut stmts = Vec::new();
        while !self.is_end() && !self.check(TokenKind::ClosedCurly) {
            if let Some(stmt) = self.parse_statement()? {
                stmts.push(stmt);
            }
        }
        self.expect(TokenKind::ClosedCurly)?;

        Ok(Stmt::new(StmtKind::Block(stmts), pos))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let condition = self.parse_expression()?;
        let then_branch = Box::new(self.parse_body()?);

        let else_branch = if self.check_keyword("else") {
            self.advance();
            Some(Box::new(self.parse_body()?))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            pos,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let condition = self.parse_expression()?;
        let body = Box::new(self.parse_body()?);

        Ok(Stmt::new(
            StmtKind::While {
                condition,
                body,
                post: None,
            },
            pos,
        ))
    }

    /// `for init; cond; post; body` desugars to a block holding the
    /// initializer and a while loop whose post statement runs after every
    /// iteration, including ones cut short by `skip`.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        self.advance();

        let init = if self.check_keyword("var") {
            Some(self.parse_var_decl()?)
        } else if self.check(TokenKind::Identifier) {
            Some(self.parse_var_set()?)
        } else {
            self.expect(TokenKind::Semicolon)?;
            None
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let post = self.parse_body()?;
        let body = self.parse_body()?;

        let cond_pos = condition
            .as_ref()
            .map(|c| c.pos.clone())
            .unwrap_or_else(|| pos.clone());
        let condition = condition
            .unwrap_or_else(|| Expr::new(ExprKind::Literal(Value::Bool(true)), cond_pos.clone()));

        let mut stmts = Vec::new();
        if let Some(init) = init {
            stmts.push(init);
        }
        stmts.push(Stmt::new(
            StmtKind::While {
                condition,
                body: Box::new(body),
                post: Some(Box::new(post)),
            },
            cond_pos,
        ));

        Ok(Stmt::new(StmtKind::Block(stmts), pos))
    }

    fn parse_params(&mut self) -> Result<Vec<Rc<str>>, ParseError> {
        let mut params = Vec::new();
        if self.check(TokenKind::ClosedParen) {
            return Ok(params);
        }

        let first = self.expect(TokenKind::Identifier)?;
        params.push(Rc::from(first.lexeme.as_str()));

        while self.check(TokenKind::Comma) {
            self.advance();
            let param = self.expect(TokenKind::Identifier)?;
            params.push(Rc::from(param.lexeme.as_str()));
        }

        Ok(params)
    }

    fn parse_function(&mut self) -> Result<Stmt, ParseError> {
        self.advance();

        let name_token = self.expect(TokenKind::Identifier)?;
        let name: Rc<str> = Rc::from(name_token.lexeme.as_str());
        let pos = name_token.pos;

        self.expect(TokenKind::OpenParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::ClosedParen)?;

        // An expression body is an implicit return; any other single
        // statement gets wrapped in a block.
        let mut body_stmt = self.parse_body()?;
        if let StmtKind::Expr(expr) = body_stmt.kind {
            body_stmt = Stmt::new(StmtKind::Return(expr), body_stmt.pos);
        }
        let body = match body_stmt.kind {
            StmtKind::Block(stmts) => stmts,
            _ => vec![body_stmt],
        };

        Ok(Stmt::new(StmtKind::Function { name, params, body }, pos))
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_logic()
    }

    fn binary_loop(
        &mut self,
        kind: TokenKind,
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;

        while self.check(kind) {
            let token = self.current().clone();
            self.advance();
            let op = BinaryOp::from_lexeme(&token.lexeme).ok_or_else(|| {
                ParseError::new(
                    format!("Unknown operator '{}'", token.lexeme),
                    token.pos.clone(),
                )
            })?;
            let right = next(self)?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                token.pos,
            );
        }

        Ok(left)
    }

    fn parse_logic(&mut self) -> Result<Expr, ParseError> {
        self.binary_loop(TokenKind::LogicalOp, Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        self.binary_loop(TokenKind::ConditionalOp, Self::parse_term)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.binary_loop(TokenKind::TermOp, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.binary_loop(TokenKind::FactorOp, Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let negation = self.check(TokenKind::TermOp) && self.current().lexeme == "-";
        if self.check(TokenKind::Exclamation) || negation {
            let token = self.current().clone();
            let op = if token.kind == TokenKind::Exclamation {
                UnaryOp::Not
            } else {
                UnaryOp::Neg
            };
            self.advance();
            let operand = self.parse_list_access()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                token.pos,
            ));
        }

        self.parse_list_access()
    }

    fn parse_list_access(&mut self) -> Result<Expr, ParseError> {
        let mut base = self.parse_call()?;

        while self.check(TokenKind::OpenSquare) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect(TokenKind::ClosedSquare)?;
            let pos = base.pos.clone();
            base = Expr::new(
                ExprKind::Index {
                    base: Box::new(base),
                    index: Box::new(index),
                },
                pos,
            );
        }

        Ok(base)
    }

    fn parse_expr_list(&mut self, end: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(end) {
            args.push(self.parse_expression()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        Ok(args)
    }

    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let start_pos = self.current_pos();
        let mut call = self.parse_primary()?;

        // Method-call sugar: `a.f(x)` reads as `f(a, x)`.
        let mut method: Option<(Rc<str>, SourcePos)> = None;
        if self.check(TokenKind::Point) {
            let point_pos = self.current_pos();
            self.advance();
            let name_token = self.expect(TokenKind::Identifier)?;
            method = Some((Rc::from(name_token.lexeme.as_str()), point_pos));
        }

        while self.check(TokenKind::OpenParen) {
            self.advance();
            let mut args = self.parse_expr_list(TokenKind::ClosedParen)?;
            self.expect(TokenKind::ClosedParen)?;

            if let Some((name, name_pos)) = method.take() {
                args.insert(0, call);
                call = Expr::new(ExprKind::Variable(name), name_pos);
            }
            call = Expr::new(
                ExprKind::Call {
                    callee: Box::new(call),
                    args,
                },
                start_pos.clone(),
            );
        }

        if let Some((_, point_pos)) = method {
            return Err(ParseError::new(
                "Method-style call with '.' requires an argument list",
                point_pos,
            ));
        }

        Ok(call)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if self.is_end() {
            return Err(ParseError::new(
                "Expected primary expression",
                self.current_pos(),
            ));
        }

        let token = self.current().clone();
        match token.kind {
            TokenKind::Keyword if token.lexeme == "input" => {
                self.advance();
                let prompt = self.parse_expression()?;
                Ok(Expr::new(ExprKind::Input(Box::new(prompt)), token.pos))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Variable(Rc::from(token.lexeme.as_str())),
                    token.pos,
                ))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Literal(Value::string(&token.lexeme)),
                    token.pos,
                ))
            }
            TokenKind::Number => {
                self.advance();
                let number = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        format!("Invalid number literal '{}'", token.lexeme),
                        token.pos.clone(),
                    )
                })?;
                Ok(Expr::new(
                    ExprKind::Literal(Value::Number(number)),
                    token.pos,
                ))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Value::Bool(true)), token.pos))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Value::Bool(false)), token.pos))
            }
            TokenKind::NoValue => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Value::NoValue), token.pos))
            }
            TokenKind::OpenSquare => {
                self.advance();
                let items = self.parse_expr_list(TokenKind::ClosedSquare)?;
                self.expect(TokenKind::ClosedSquare)?;
                Ok(Expr::new(ExprKind::ListLiteral(items), token.pos))
            }
            TokenKind::OpenParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::ClosedParen)?;
                Ok(expr)
            }
            _ => {
                let spacer = if token.lexeme.is_empty() { "" } else { " " };
                Err(ParseError::new(
                    format!(
                        "Expected primary but got '{}{}{}'",
                        token.kind, spacer, token.lexeme
                    ),
                    token.pos,
                ))
            }
        }
    }
}
