//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str, Binding>` tracking
//!    declared/defined/used).
//! 2. Collect static errors (redeclaration, forward‑read in initializer,
//!    invalid `return`/`break`/`this`) and advisory warnings.
//! 3. Tell the interpreter, for *each* variable occurrence, whether it’s a local
//!    (and at what depth) or a global, so the interpreter never falls back to
//!    dynamic lookup that would see a later shadowing local.
//!
//! Errors never stop the walk: every problem in the program is reported in one
//! pass, and the caller must not evaluate if any were found.

use crate::ast::{Expr, ExprId, Stmt};
use crate::error::{StaticError, StaticErrorKind, Warning, WarningKind};
use crate::interpreter::Interpreter;
use crate::object::{INITIALIZER, THIS};
use crate::token::Token;
use log::{debug, info, warn};
use std::collections::HashMap;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Lambda,
    Method,
    Initializer,
}

/// Are we inside a class body?  Used to validate `this`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

/// Per-name state in one scope.
#[derive(Copy, Clone, Debug)]
struct Binding<'a> {
    defined: bool,
    used: bool,
    /// Declaring token; `None` for the implicit `this`.
    token: Option<&'a Token>,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances (locals vs. globals) by calling back into the interpreter.
pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<&'a str, Binding<'a>>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
    errors: Vec<StaticError>,
    warnings: Vec<Warning>,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Walk all top‑level statements and return every static error found.
    /// An empty list means the program may be evaluated.
    pub fn resolve(&mut self, statements: &'a [Stmt]) -> Vec<StaticError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        self.warnings.sort_by_key(|w| (w.token.line, w.token.column));

        info!(
            "Resolve pass finished: {} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        );
        std::mem::take(&mut self.errors)
    }

    /// Resolve a lone expression, as the `evaluate` command runs it.  Lambdas
    /// inside it get their scopes exactly as they would in a program.
    pub fn resolve_expression(&mut self, expr: &'a Expr) -> Vec<StaticError> {
        info!("Beginning resolve pass over a single expression");

        self.resolve_expr(expr);
        self.warnings.sort_by_key(|w| (w.token.line, w.token.column));

        std::mem::take(&mut self.errors)
    }

    /// Warnings gathered so far, ordered by source position.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Class { name, methods } => {
                self.declare(name);
                self.define(name);

                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.begin_scope();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(
                        THIS,
                        Binding {
                            defined: true,
                            used: true,
                            token: None,
                        },
                    );
                }

                for method in methods {
                    let kind = if method.name.lexeme == INITIALIZER {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Method
                    };
                    self.resolve_function(&method.params, &method.body, kind);
                }

                self.end_scope();
                self.current_class = enclosing_class;
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // name is visible *inside* its own body
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(&decl.params, &decl.body, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print { value: expr, .. } => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.loop_depth += 1;
                self.resolve_expr(condition);
                self.resolve_stmt(body);
                self.loop_depth -= 1;
            }

            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.error(
                        StaticErrorKind::BreakOutsideLoop,
                        keyword,
                        "Can't use 'break' outside of a loop.",
                    );
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(
                        StaticErrorKind::ReturnOutsideFunction,
                        keyword,
                        "Can't return from top-level code.",
                    );
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(
                            StaticErrorKind::ValueFromInitializer,
                            keyword,
                            "Can't return a value from an initializer.",
                        );
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // Cannot read in own initializer
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(name.lexeme.as_str()))
                    .is_some_and(|binding| !binding.defined);

                if in_own_initializer {
                    self.error(
                        StaticErrorKind::SelfReferentialInitializer,
                        name,
                        "Can't read local variable in its own initializer.",
                    );
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Lambda(decl) => {
                self.resolve_function(&decl.params, &decl.body, FunctionType::Lambda);
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(
                        StaticErrorKind::ThisOutsideClass,
                        keyword,
                        "Can't use 'this' outside of a class.",
                    );
                    return;
                }
                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.  Loops outside
    /// the function do not count for `break` inside it.
    fn resolve_function(&mut self, params: &'a [Token], body: &'a [Stmt], kind: FunctionType) {
        let enclosing = self.current_function;
        let enclosing_loops = self.loop_depth;
        self.current_function = kind;
        self.loop_depth = 0;

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        for stmt in body {
            self.resolve_stmt(stmt);
        }
        self.check_unreachable(body);
        self.end_scope();

        self.current_function = enclosing;
        self.loop_depth = enclosing_loops;
    }

    fn check_unreachable(&mut self, body: &'a [Stmt]) {
        let last = body.len().saturating_sub(1);
        for (index, stmt) in body.iter().enumerate() {
            if let Stmt::Return { keyword, .. } = stmt {
                if index < last {
                    self.warn(
                        WarningKind::UnreachableCode,
                        keyword,
                        "Unreachable code after 'return'.".to_string(),
                    );
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };

        let mut unused: Vec<&'a Token> = scope
            .values()
            .filter(|binding| !binding.used)
            .filter_map(|binding| binding.token)
            .collect();
        unused.sort_by_key(|token| (token.line, token.column));

        for token in unused {
            self.warn(
                WarningKind::UnusedVariable,
                token,
                format!("Local variable '{}' is never used.", token.lexeme),
            );
        }
    }

    fn declare(&mut self, name: &'a Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        let duplicate = scope.contains_key(name.lexeme.as_str());
        scope.insert(
            name.lexeme.as_str(),
            Binding {
                defined: false,
                used: false,
                token: Some(name),
            },
        );

        if duplicate {
            self.error(
                StaticErrorKind::DuplicateDeclaration,
                name,
                "Already a variable with this name in this scope.",
            );
        }
    }

    fn define(&mut self, name: &'a Token) {
        if let Some(binding) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(name.lexeme.as_str()))
        {
            binding.defined = true;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this variable occurrence as either:
    ///  - a local at depth `d`, or
    ///  - a global if not found in *any* scope.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        // 1. check innermost → outermost
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(binding) = scope.get_mut(name.lexeme.as_str()) {
                binding.used = true;
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        // 2. not found in any local scope ⇒ global
        debug!("Resolved '{}' as global", name.lexeme);
        self.interpreter.note_global(id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    fn error(&mut self, kind: StaticErrorKind, token: &Token, message: &str) {
        self.errors.push(StaticError::new(kind, token, message));
    }

    fn warn(&mut self, kind: WarningKind, token: &Token, message: String) {
        warn!("[line {}] {}", token.line, message);
        self.warnings.push(Warning::new(kind, token, message));
    }
}
