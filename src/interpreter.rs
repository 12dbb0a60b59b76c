use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::environment::{Environment, SharedEnv};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::object::{Class, Function, Lambda, NativeFunction, INITIALIZER};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `Return` and `Break` unwind to the nearest
/// call or loop frame and are never reported as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: SharedEnv,
    environment: SharedEnv,
    /// Resolved depth per reference.  Entries are kept for the life of the
    /// interpreter: a closure defined by one `run` may be called by a later
    /// one and still needs its bodies' depths, so the table grows with every
    /// program resolved against this interpreter.
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout, with native functions
    /// such as `clock` defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates a new Interpreter whose `print` statements write to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().shared();

        debug!("Defining native function 'clock'");
        globals
            .borrow_mut()
            .define("clock", Value::Native(Rc::new(NativeFunction::clock())));

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    // ── resolution table ────────────────────────────────────────────────────

    /// Records that the reference `id` lives `depth` scopes out.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Resolved {:?} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Records that the reference `id` is a global.
    pub fn note_global(&mut self, id: ExprId) {
        self.locals.remove(&id);
    }

    pub fn locals(&self) -> &HashMap<ExprId, usize> {
        &self.locals
    }

    pub fn resolved_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    // ── statements ──────────────────────────────────────────────────────────

    /// Interprets a list of statements (a "program").  The first runtime
    /// error aborts the rest.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        info!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                other => {
                    // The resolver rejects top-level `return` and `break`.
                    warn!("Control signal {:?} reached the top level", other);
                    break;
                }
            }
        }

        self.output.flush().map_err(|e| output_error(&eof_token(), e))?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print { keyword, value } => {
                let value = self.evaluate(value)?;
                debug!("Printing value: {}", value);
                writeln!(self.output, "{}", value).map_err(|e| output_error(keyword, e))?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Variable '{}' defined with value: {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(self.environment.clone()).shared();
                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                debug!("Exited while loop");
                Ok(Flow::Normal)
            }

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);
                let function = Function::new(decl.clone(), self.environment.clone(), false);
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Class { name, methods } => {
                debug!("Defining class '{}'", name.lexeme);
                self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

                let methods = methods
                    .iter()
                    .map(|decl| {
                        let is_initializer = decl.name.lexeme == INITIALIZER;
                        let method =
                            Function::new(decl.clone(), self.environment.clone(), is_initializer);
                        (decl.name.lexeme.clone(), Rc::new(method))
                    })
                    .collect();

                let class = Class::new(name.lexeme.clone(), methods);
                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Runs `statements` with `env` as the current scope.  The previous scope
    /// is restored on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], env: SharedEnv) -> IResult<Flow> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal)
    }

    /// Shared invocation step for functions and lambdas: bind parameters in a
    /// fresh scope under `closure`, then run the body there.
    pub(crate) fn call_body(
        &mut self,
        closure: &SharedEnv,
        params: &[Token],
        body: &[Stmt],
        arguments: Vec<Value>,
    ) -> IResult<Flow> {
        let mut env = Environment::with_enclosing(closure.clone());
        for (param, argument) in params.iter().zip(arguments) {
            debug!("Binding parameter '{}' to {}", param.lexeme, argument);
            env.define(&param.lexeme, argument);
        }

        self.execute_block(body, env.shared())
    }

    // ── expressions ─────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&depth) => {
                        self.environment
                            .borrow_mut()
                            .assign_at(depth, name, value.clone())?;
                    }
                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }
                debug!("Assigned value {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let Some(callable) = callee.as_callable() else {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::NotCallable,
                        paren,
                        "Can only call functions and classes.",
                    ));
                };

                if values.len() != callable.arity() {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ArityMismatch,
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                callable.call(self, values)
            }

            Expr::Lambda(decl) => Ok(Value::Lambda(Rc::new(Lambda::new(
                decl.clone(),
                self.environment.clone(),
            )))),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(RuntimeError::type_mismatch(
                    name,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::type_mismatch(
                        name,
                        "Only instances have fields.",
                    ));
                };

                let value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&depth) => self.environment.borrow().get_at(depth, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::type_mismatch(
                    operator,
                    "Operand must be a number.",
                )),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(RuntimeError::type_mismatch(
                operator,
                format!("Invalid unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(left != right)),
            TokenType::PLUS => {
                return match (left, right) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                    _ => Err(RuntimeError::type_mismatch(
                        operator,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }
            _ => {}
        }

        let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
            return Err(RuntimeError::type_mismatch(
                operator,
                "Operands must be numbers.",
            ));
        };
        let (a, b) = (*a, *b);

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(a - b)),
            TokenType::STAR => Ok(Value::Number(a * b)),
            TokenType::SLASH => {
                if b == 0.0 {
                    Err(RuntimeError::new(
                        RuntimeErrorKind::DivisionByZero,
                        operator,
                        "Division by zero.",
                    ))
                } else {
                    Ok(Value::Number(a / b))
                }
            }
            TokenType::GREATER => Ok(Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
            TokenType::LESS => Ok(Value::Bool(a < b)),
            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
            _ => Err(RuntimeError::type_mismatch(
                operator,
                format!("Invalid binary operator '{}'.", operator.lexeme),
            )),
        }
    }
}

fn output_error(token: &Token, error: io::Error) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::Io,
        token,
        format!("Failed to write output: {}", error),
    )
}

fn eof_token() -> Token {
    Token::new(TokenType::EOF, "", 0, 0)
}
