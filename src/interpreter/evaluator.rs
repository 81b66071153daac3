use crate::ast::{BinaryOp, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use crate::format;
use crate::interpreter::builtins;
use crate::interpreter::control_flow::{ControlFlow, Unwind};
use crate::interpreter::environment::Environment;
use crate::interpreter::error::RuntimeError;
use crate::token::SourcePos;
use crate::value::{Callable, UserFunction, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Calls nested deeper than this abort with a flat error instead of
/// overflowing the native stack.
const MAX_CALL_DEPTH: usize = 1000;

/// Walks the statement list produced by the parser. Holds the scope-chain
/// cursor, the global scope (builtins plus user functions), the script's
/// RNG and its command-line arguments.
pub struct TreeWalker {
    pub(crate) env: Rc<Environment>,
    pub(crate) globals: Rc<Environment>,
    pub(crate) rng: StdRng,
    pub(crate) script_args: Vec<String>,
    call_depth: usize,
}

impl TreeWalker {
    /// `script_args[0]` is the script path itself, mirroring what `arg(0)`
    /// hands back to the program.
    pub fn new(script_args: Vec<String>) -> Self {
        let globals = Rc::new(Environment::new());
        builtins::install(&globals);
        Self {
            env: Rc::clone(&globals),
            globals,
            rng: StdRng::from_entropy(),
            script_args,
            call_depth: 0,
        }
    }

    pub fn run(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        match self.execute_all(stmts)? {
            ControlFlow::Normal => Ok(()),
            ControlFlow::Return(_, pos) => Err(RuntimeError::signal_misuse("return", "function", pos)),
            ControlFlow::Skip(pos) => Err(RuntimeError::signal_misuse("skip", "loop", pos)),
            ControlFlow::Stop(pos) => Err(RuntimeError::signal_misuse("stop", "loop", pos)),
        }
    }

    fn execute_all(&mut self, stmts: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        for stmt in stmts {
            match self.execute(stmt)? {
                ControlFlow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Run statements with `env` as the current scope, restoring the prior
    /// scope on every exit path, including errors.
    fn execute_block(
        &mut self,
        stmts: &[Stmt],
        env: Rc<Environment>,
    ) -> Result<ControlFlow, RuntimeError> {
        let prev = std::mem::replace(&mut self.env, env);
        let result = self.execute_all(stmts);
        self.env = prev;
        result
    }

    /// Executes one statement. A signal that tunneled out of a call
    /// expression inside the statement becomes the statement's own outcome
    /// here, so the dynamically enclosing loop can still catch it.
    fn execute(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match self.execute_inner(stmt) {
            Ok(flow) => Ok(flow),
            Err(unwind) => unwind.into_flow(),
        }
    }

    fn execute_inner(&mut self, stmt: &Stmt) -> Result<ControlFlow, Unwind> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::Print(expr) => {
                let value = self.evaluate(expr)?;
                print!("{}", format::render_value(&value));
                let _ = io::stdout().flush();
                Ok(ControlFlow::Normal)
            }
            StmtKind::VarDecl { name, init } => {
                let value = self.evaluate(init)?;
                if !self.env.declare(Rc::clone(name), value) {
                    return Err(RuntimeError::redeclared(name.as_ref(), stmt.pos.clone()).into());
                }
                Ok(ControlFlow::Normal)
            }
            StmtKind::VarSet { name, value } => {
                let value = self.evaluate(value)?;
                if !self.env.set(name, value) {
                    return Err(
                        RuntimeError::undeclared(name.as_ref(), "set", stmt.pos.clone()).into()
                    );
                }
                Ok(ControlFlow::Normal)
            }
            StmtKind::IndexSet {
                target,
                index,
                value,
            } => {
                let base = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                self.assign_index(base, index, value, &stmt.pos)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::Block(stmts) => {
                let child = Rc::new(Environment::with_parent(Rc::clone(&self.env)));
                Ok(self.execute_block(stmts, child)?)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    Ok(self.execute(then_branch)?)
                } else if let Some(else_branch) = else_branch {
                    Ok(self.execute(else_branch)?)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            StmtKind::While {
                condition,
                body,
                post,
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        ControlFlow::Normal | ControlFlow::Skip(_) => {}
                        ControlFlow::Stop(_) => return Ok(ControlFlow::Normal),
                        flow @ ControlFlow::Return(..) => return Ok(flow),
                    }
                    // The post statement still runs after a skip; only stop
                    // suppresses it. It sits outside the loop's own signal
                    // handling, so a signal it raises itself travels to the
                    // enclosing construct.
                    if let Some(post) = post {
                        match self.execute(post)? {
                            ControlFlow::Normal => {}
                            flow => return Ok(flow),
                        }
                    }
                }
                Ok(ControlFlow::Normal)
            }
            StmtKind::Function { name, params, body } => {
                let function = UserFunction {
                    name: Rc::clone(name),
                    params: params.clone(),
                    body: body.clone(),
                };
                let declared = self
                    .globals
                    .declare(Rc::clone(name), Value::Callable(Rc::new(function)));
                if !declared {
                    return Err(RuntimeError::redeclared_function(
                        name.as_ref(),
                        stmt.pos.clone(),
                    )
                    .into());
                }
                Ok(ControlFlow::Normal)
            }
            StmtKind::Return(expr) => {
                let value = self.evaluate(expr)?;
                Ok(ControlFlow::Return(value, stmt.pos.clone()))
            }
            StmtKind::Skip => Ok(ControlFlow::Skip(stmt.pos.clone())),
            StmtKind::Stop => Ok(ControlFlow::Stop(stmt.pos.clone())),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, Unwind> {
        match &expr.kind {
            // String literals are copied out of the AST so scripts mutating
            // a string never mutate the literal itself.
            ExprKind::Literal(value) => Ok(match value {
                Value::Str(chars) => Value::Str(Rc::new(RefCell::new(chars.borrow().clone()))),
                other => other.clone(),
            }),
            ExprKind::ListLiteral(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item)?);
                }
                Ok(Value::list(values))
            }
            ExprKind::Variable(name) => Ok(self
                .env
                .get(name)
                .ok_or_else(|| RuntimeError::undeclared(name.as_ref(), "get", expr.pos.clone()))?),
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Neg => match value.as_number() {
                        Some(n) => Ok(Value::Number(-n)),
                        None => Err(RuntimeError::type_error(
                            "Attempt to invert a non numerical value",
                            expr.pos.clone(),
                        )
                        .into()),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    if !self.evaluate(left)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
                }
                BinaryOp::Or => {
                    if self.evaluate(left)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
                }
                BinaryOp::Eq => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    Ok(Value::Bool(left == right))
                }
                BinaryOp::NotEq => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    Ok(Value::Bool(left != right))
                }
                _ => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    Ok(self.binary_op(*op, left, right, &expr.pos)?)
                }
            },
            ExprKind::Call { callee, args } => {
                let callee_value = self.evaluate(callee)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate(arg)?);
                }
                match callee_value {
                    Value::Callable(function) => {
                        if arg_values.len() != function.arity() {
                            return Err(RuntimeError::arity_mismatch(
                                function.name(),
                                function.arity(),
                                arg_values.len(),
                                expr.pos.clone(),
                            )
                            .into());
                        }
                        function.call(self, arg_values, &expr.pos)
                    }
                    _ => Err(RuntimeError::not_callable(expr.pos.clone()).into()),
                }
            }
            ExprKind::Index { base, index } => {
                let base_value = self.evaluate(base)?;
                let index_value = self.evaluate(index)?;
                Ok(self.index_value(base_value, index_value, &expr.pos)?)
            }
            ExprKind::Input(prompt) => {
                let prompt = self.evaluate(prompt)?;
                Ok(self.read_input(prompt, &expr.pos)?)
            }
        }
    }

    /// Invoke a user function: exact arity, fresh scope under the global
    /// scope, and a Return signal becomes the call's value. A leftover
    /// `skip` or `stop` tunnels out of the call as `Unwind` so the
    /// dynamically enclosing loop can catch it.
    pub fn call_function(
        &mut self,
        function: &UserFunction,
        args: Vec<Value>,
        pos: &SourcePos,
    ) -> Result<Value, Unwind> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::arity_mismatch(
                function.name.as_ref(),
                function.params.len(),
                args.len(),
                pos.clone(),
            )
            .into());
        }
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::flat(format!(
                "Maximum recursion depth exceeded while calling function '{}'",
                function.name
            ))
            .into());
        }

        let call_env = Rc::new(Environment::with_parent(Rc::clone(&self.globals)));
        for (param, arg) in function.params.iter().zip(args) {
            if !call_env.declare(Rc::clone(param), arg) {
                return Err(RuntimeError::redeclared(param.as_ref(), pos.clone()).into());
            }
        }

        self.call_depth += 1;
        let result = self.execute_block(&function.body, call_env);
        self.call_depth -= 1;

        match result? {
            ControlFlow::Return(value, _) => Ok(value),
            ControlFlow::Normal => Ok(Value::NoValue),
            ControlFlow::Skip(pos) => Err(Unwind::Skip(pos)),
            ControlFlow::Stop(pos) => Err(Unwind::Stop(pos)),
        }
    }

    fn binary_op(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
        pos: &SourcePos,
    ) -> Result<Value, RuntimeError> {
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => self.number_op(op, *a, *b, pos),
            (Value::Str(a), Value::Str(b)) => {
                if op == BinaryOp::Add {
                    let mut chars = a.borrow().clone();
                    chars.extend(b.borrow().iter().copied());
                    return Ok(Value::Str(Rc::new(RefCell::new(chars))));
                }
                Err(RuntimeError::type_error(
                    format!("Invalid operation '{}' between two strings", op),
                    pos.clone(),
                ))
            }
            _ if std::mem::discriminant(&left) == std::mem::discriminant(&right) => {
                Err(RuntimeError::type_error(
                    format!(
                        "Invalid operation '{}' between two {}s",
                        op,
                        left.type_name()
                    ),
                    pos.clone(),
                ))
            }
            _ => Err(RuntimeError::type_error(
                format!(
                    "Invalid operation between two incompatible types {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
                pos.clone(),
            )),
        }
    }

    fn number_op(
        &self,
        op: BinaryOp,
        a: f64,
        b: f64,
        pos: &SourcePos,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinaryOp::Add => Ok(Value::Number(a + b)),
            BinaryOp::Sub => Ok(Value::Number(a - b)),
            BinaryOp::Mul => Ok(Value::Number(a * b)),
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(RuntimeError::division_by_zero(pos.clone()));
                }
                Ok(Value::Number(a / b))
            }
            BinaryOp::Greater => Ok(Value::Bool(a > b)),
            BinaryOp::GreaterEq => Ok(Value::Bool(a >= b)),
            BinaryOp::Less => Ok(Value::Bool(a < b)),
            BinaryOp::LessEq => Ok(Value::Bool(a <= b)),
            _ => Err(RuntimeError::type_error(
                format!("Invalid operation '{}' between two numbers", op),
                pos.clone(),
            )),
        }
    }

    /// Truncate the raw numeric index toward zero and resolve a negative
    /// index from the back of the sequence.
    pub(crate) fn resolve_index(
        raw: f64,
        length: usize,
        pos: &SourcePos,
    ) -> Result<usize, RuntimeError> {
        let raw = raw as i64;
        let mut index = raw;
        if index < 0 {
            index += length as i64;
        }
        if index < 0 || index >= length as i64 {
            return Err(RuntimeError::index_out_of_bounds(raw, length, pos.clone()));
        }
        Ok(index as usize)
    }

    fn index_number(&self, index: &Value, pos: &SourcePos) -> Result<f64, RuntimeError> {
        index.as_number().ok_or_else(|| {
            RuntimeError::type_error(
                format!(
                    "Tried to index with a non numerical value of type '{}'",
                    index.type_name()
                ),
                pos.clone(),
            )
        })
    }

    fn index_value(
        &self,
        base: Value,
        index: Value,
        pos: &SourcePos,
    ) -> Result<Value, RuntimeError> {
        let raw = self.index_number(&index, pos)?;
        match base {
            Value::List(items) => {
                let items = items.borrow();
                let index = Self::resolve_index(raw, items.len(), pos)?;
                Ok(items[index].clone())
            }
            Value::Str(chars) => {
                let chars = chars.borrow();
                let index = Self::resolve_index(raw, chars.len(), pos)?;
                Ok(Value::string(&chars[index].to_string()))
            }
            other => Err(RuntimeError::type_error(
                format!("Tried to index a value of type '{}'", other.type_name()),
                pos.clone(),
            )),
        }
    }

    fn assign_index(
        &self,
        base: Value,
        index: Value,
        value: Value,
        pos: &SourcePos,
    ) -> Result<(), RuntimeError> {
        let raw = self.index_number(&index, pos)?;
        match base {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let index = Self::resolve_index(raw, items.len(), pos)?;
                items[index] = value;
                Ok(())
            }
            Value::Str(chars) => {
                if !value.is_char() {
                    return Err(RuntimeError::type_error(
                        "Attempt to set character in string to non character",
                        pos.clone(),
                    ));
                }
                let mut chars = chars.borrow_mut();
                let index = Self::resolve_index(raw, chars.len(), pos)?;
                if let Value::Str(cell) = value {
                    chars[index] = cell.borrow()[0];
                }
                Ok(())
            }
            other => Err(RuntimeError::type_error(
                format!("Tried to index a value of type '{}'", other.type_name()),
                pos.clone(),
            )),
        }
    }

    fn read_input(&mut self, prompt: Value, pos: &SourcePos) -> Result<Value, RuntimeError> {
        let Value::Str(chars) = &prompt else {
            return Err(RuntimeError::type_error(
                format!(
                    "Tried to use a non-string value '{}' with 'input' expression",
                    prompt.type_name()
                ),
                pos.clone(),
            ));
        };

        let rendered: String = chars.borrow().iter().collect();
        print!("{}", format::ascii_replace(&rendered));
        let _ = io::stdout().flush();

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::flat(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            return Err(RuntimeError::flat("Reached end of input while reading"));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::string(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Diagnostics;
    use crate::interpreter::parser::Parser;
    use crate::lexer::Lexer;

    fn run_program(source: &str) -> (TreeWalker, Result<(), RuntimeError>) {
        let mut diags = Diagnostics::new(false);
        let mut lexer = Lexer::new(source, Rc::from("test.sil"), &mut diags);
        lexer.lex(&mut diags);
        let mut parser = Parser::new(std::mem::take(&mut lexer.tokens));
        let stmts = parser.parse(&mut diags);
        assert!(!diags.had_error(), "parse failed: {:?}", diags.messages());

        let mut walker = TreeWalker::new(vec!["test.sil".to_string()]);
        let result = walker.run(&stmts);
        (walker, result)
    }

    fn global(walker: &TreeWalker, name: &str) -> Value {
        walker.globals.get(name).expect("missing global")
    }

    fn eval_to(expr: &str) -> Value {
        let (walker, result) = run_program(&format!("var r = {};", expr));
        result.expect("program failed");
        global(&walker, "r")
    }

    fn run_err(source: &str) -> RuntimeError {
        let (_, result) = run_program(source);
        result.expect_err("program unexpectedly succeeded")
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_to("1 + 2 * 3"), Value::Number(7.0));
        assert_eq!(eval_to("(1 + 2) / 3"), Value::Number(1.0));
        assert_eq!(eval_to("-4 + 1"), Value::Number(-3.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval_to("\"ab\" + \"cd\""), Value::string("abcd"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_to("1 < 2"), Value::Bool(true));
        assert_eq!(eval_to("2 <= 1"), Value::Bool(false));
        assert_eq!(eval_to("\"a\" == \"a\""), Value::Bool(true));
        assert_eq!(eval_to("[1, 2] == [1, 2]"), Value::Bool(true));
    }

    #[test]
    fn test_cross_type_equality_never_errors() {
        assert_eq!(eval_to("1 == \"1\""), Value::Bool(false));
        assert_eq!(eval_to("novalue != false"), Value::Bool(true));
    }

    #[test]
    fn test_logic_always_yields_boolean() {
        // every number is truthy, including zero
        assert_eq!(eval_to("0 and 1"), Value::Bool(true));
        assert_eq!(eval_to("false and 1"), Value::Bool(false));
        assert_eq!(eval_to("false or \"x\""), Value::Bool(true));
        assert_eq!(eval_to("novalue or false"), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        // the undeclared variable on the right must never be evaluated
        assert_eq!(eval_to("false and missing"), Value::Bool(false));
        assert_eq!(eval_to("true or missing"), Value::Bool(true));
    }

    #[test]
    fn test_unary_not_coerces() {
        assert_eq!(eval_to("!0"), Value::Bool(false));
        assert_eq!(eval_to("!novalue"), Value::Bool(true));
    }

    #[test]
    fn test_division_by_zero() {
        let error = run_err("var r = 1 / 0;");
        assert!(matches!(error, RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn test_incompatible_types_error() {
        let error = run_err("var r = 1 + \"a\";");
        assert!(error.message().contains("incompatible types number and string"));
    }

    #[test]
    fn test_booleans_reject_every_operator() {
        let error = run_err("var r = true + false;");
        assert_eq!(error.message(), "Invalid operation '+' between two booleans");
    }

    #[test]
    fn test_variables_and_assignment() {
        let (walker, result) = run_program("var x = 5; x = x + 1;");
        result.expect("program failed");
        assert_eq!(global(&walker, "x"), Value::Number(6.0));
    }

    #[test]
    fn test_redeclaration_is_fatal() {
        let error = run_err("var x = 1; var x = 2;");
        assert!(matches!(error, RuntimeError::RedeclaredVariable { .. }));
    }

    #[test]
    fn test_undeclared_variable_is_fatal() {
        let error = run_err("y = 1;");
        assert!(matches!(error, RuntimeError::UndeclaredVariable { .. }));
        assert!(error.message().contains("'y'"));
    }

    #[test]
    fn test_block_shadowing_does_not_leak() {
        let source = "var x = 1; { var x = 2; x = 3; } var seen = x;";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "seen"), Value::Number(1.0));
    }

    #[test]
    fn test_for_loop_with_skip_and_stop() {
        // skip still runs the post statement; stop does not
        let source = "var s = 0;\n\
                      for var i = 0; i < 10; i += 1; {\n\
                          if i == 2 skip;\n\
                          if i == 4 stop;\n\
                          s += i;\n\
                      }";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "s"), Value::Number(0.0 + 1.0 + 3.0));
    }

    #[test]
    fn test_while_stop_ends_loop() {
        let source = "var n = 0; while true { n += 1; stop n > 4; }";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "n"), Value::Number(5.0));
    }

    #[test]
    fn test_function_call_and_return() {
        let source = "fun double(x) x * 2; var r = double(21);";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "r"), Value::Number(42.0));
    }

    #[test]
    fn test_function_without_return_yields_novalue() {
        let source = "fun noop(x) { x = x; } var r = noop(1);";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "r"), Value::NoValue);
    }

    #[test]
    fn test_recursion() {
        let source = "fun fib(n) {\n\
                          if n < 2 return n;\n\
                          return fib(n - 1) + fib(n - 2);\n\
                      }\n\
                      var r = fib(10);";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "r"), Value::Number(55.0));
    }

    #[test]
    fn test_arity_is_exact() {
        let error = run_err("fun f(a, b) return a; var r = f(1);");
        assert_eq!(
            error.message(),
            "Too few arguments passed to function 'f'. Expected 2 got 1"
        );
        let error = run_err("fun g(a) return a; var r = g(1, 2, 3);");
        assert!(error.message().starts_with("Too many"));
    }

    #[test]
    fn test_functions_do_not_close_over_locals() {
        let source = "fun f() return y; { var y = 2; var r = f(); }";
        let error = run_err(source);
        assert!(matches!(error, RuntimeError::UndeclaredVariable { .. }));
    }

    #[test]
    fn test_functions_see_globals() {
        let source = "var g = 10; fun f() return g; var r = f();";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "r"), Value::Number(10.0));
    }

    #[test]
    fn test_function_name_collision_is_fatal() {
        let error = run_err("var f = 1; fun f() return 2;");
        assert!(matches!(error, RuntimeError::RedeclaredFunction { .. }));
    }

    #[test]
    fn test_calling_a_non_callable() {
        let error = run_err("var x = 1; var r = x();");
        assert!(matches!(error, RuntimeError::NotCallable { .. }));
    }

    #[test]
    fn test_recursion_depth_is_limited() {
        let error = run_err("fun f() return f(); var r = f();");
        assert!(matches!(error, RuntimeError::Flat { .. }));
        assert!(error.message().contains("recursion depth"));
    }

    #[test]
    fn test_list_indexing() {
        assert_eq!(eval_to("[1, 2, 3][1]"), Value::Number(2.0));
        // negative indices resolve from the back
        assert_eq!(eval_to("[1, 2, 3][0 - 1]"), Value::Number(3.0));
        // fractional indices truncate toward zero
        assert_eq!(eval_to("[1, 2, 3][1.9]"), Value::Number(2.0));
    }

    #[test]
    fn test_index_out_of_bounds_names_index_and_size() {
        let error = run_err("var l = [1, 2, 3]; var r = l[5];");
        assert_eq!(
            error.message(),
            "List index out of bounds. Tried to access item '5' from list of size '3'"
        );
    }

    #[test]
    fn test_string_indexing_yields_single_char_string() {
        assert_eq!(eval_to("\"abc\"[1]"), Value::string("b"));
    }

    #[test]
    fn test_index_assignment() {
        let source = "var l = [1, 2, 3]; l[0] = 9;";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(
            global(&walker, "l"),
            Value::list(vec![Value::Number(9.0), Value::Number(2.0), Value::Number(3.0)])
        );
    }

    #[test]
    fn test_string_cell_assignment_requires_a_character() {
        let source = "var s = \"ab\"; s[0] = \"cd\";";
        let error = run_err(source);
        assert_eq!(
            error.message(),
            "Attempt to set character in string to non character"
        );

        let source = "var s = \"ab\"; s[0] = \"X\";";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "s"), Value::string("Xb"));
    }

    #[test]
    fn test_string_literals_are_copied_per_evaluation() {
        // mutating the result of one call must not poison the next
        let source = "fun make() { var s = \"ab\"; s[0] = \"X\"; return s; }\n\
                      var a = make();\n\
                      var b = make();";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "a"), Value::string("Xb"));
        assert_eq!(global(&walker, "b"), Value::string("Xb"));
    }

    #[test]
    fn test_lists_alias_on_assignment() {
        let source = "var a = [1]; var b = a; b[0] = 2;";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "a"), Value::list(vec![Value::Number(2.0)]));
    }

    #[test]
    fn test_signals_outside_their_context() {
        assert_eq!(run_err("skip;").message(), "Use of 'skip' outside of a loop");
        assert_eq!(run_err("stop;").message(), "Use of 'stop' outside of a loop");
        assert_eq!(
            run_err("return 1;").message(),
            "Use of 'return' outside of a function"
        );
    }

    #[test]
    fn test_skip_from_a_called_function_is_caught_by_the_enclosing_loop() {
        let source = "fun f() skip;\n\
                      var i = 0;\n\
                      while i < 3 { i += 1; var x = f(); }";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "i"), Value::Number(3.0));
    }

    #[test]
    fn test_stop_from_a_called_function_ends_the_enclosing_loop() {
        let source = "fun f() stop;\n\
                      var i = 0;\n\
                      while true { i += 1; f(); i += 100; }";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        // the signal aborts the rest of the body before ending the loop
        assert_eq!(global(&walker, "i"), Value::Number(1.0));
    }

    #[test]
    fn test_signal_from_a_call_without_an_enclosing_loop_is_fatal() {
        let error = run_err("fun f() skip; var r = f();");
        assert_eq!(error.message(), "Use of 'skip' outside of a loop");
    }

    #[test]
    fn test_stop_in_the_post_statement_propagates_to_the_enclosing_loop() {
        let source = "var log = \"\";\n\
                      var j = 0;\n\
                      while j < 2 {\n\
                          j += 1;\n\
                          for var i = 0; true; stop; { log = log + \"x\"; }\n\
                          log = log + \"-\";\n\
                      }";
        let (walker, result) = run_program(source);
        result.expect("program failed");
        assert_eq!(global(&walker, "log"), Value::string("x"));
        assert_eq!(global(&walker, "j"), Value::Number(1.0));
    }

    #[test]
    fn test_duplicate_parameter_names_are_fatal_at_call_time() {
        let error = run_err("fun f(a, a) return a; var r = f(1, 2);");
        assert!(matches!(error, RuntimeError::RedeclaredVariable { .. }));
        assert!(error.message().contains("'a'"));
    }
}
