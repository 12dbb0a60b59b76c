//! Runtime object model: everything a call expression can invoke, plus the
//! instances classes produce.
//!
//! Invocation protocol shared by functions and lambdas:
//!
//! 1. a fresh scope enclosed by the captured closure,
//! 2. parameters bound in declaration order,
//! 3. the body run as a block in that scope,
//! 4. a `return` signal becomes the call's value (initializers always yield
//!    their bound `this` instead),
//! 5. runtime errors pass through untouched.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::ast::{FunctionDecl, LambdaDecl};
use crate::environment::{Environment, SharedEnv};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Implicit receiver binding inside methods.  `this` is a keyword, so no user
/// declaration can collide with it.
pub const THIS: &str = "this";

/// Name of the constructor method.
pub const INITIALIZER: &str = "init";

/// Anything a call expression can invoke.
pub trait Callable {
    fn arity(&self) -> usize;

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Native functions
// ─────────────────────────────────────────────────────────────────────────────

/// A host function exposed to scripts.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Value,
}

impl NativeFunction {
    /// `clock()`: seconds since the Unix epoch, millisecond precision.
    pub fn clock() -> Self {
        NativeFunction {
            name: "clock",
            arity: 0,
            func: |_args| Value::Number(Utc::now().timestamp_millis() as f64 / 1000.0),
        }
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        self: Rc<Self>,
        _interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling native function '{}'", self.name);
        Ok((self.func)(&arguments))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User functions and methods
// ─────────────────────────────────────────────────────────────────────────────

/// A declared function or method together with the scope it closes over.
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: SharedEnv,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: SharedEnv, is_initializer: bool) -> Self {
        Function {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// A copy of this method whose closure is a new scope holding only
    /// `this → instance`, enclosed by the original closure.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        let mut env = Environment::with_enclosing(self.closure.clone());
        env.define(THIS, Value::Instance(instance));

        Function {
            declaration: self.declaration.clone(),
            closure: env.shared(),
            is_initializer: self.is_initializer,
        }
    }

    fn bound_this(&self) -> Value {
        self.closure.borrow().get_local(THIS).unwrap_or(Value::Nil)
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling function '{}'", self.name());

        let flow = interpreter.call_body(
            &self.closure,
            &self.declaration.params,
            &self.declaration.body,
            arguments,
        )?;

        if self.is_initializer {
            // Constructors always hand back the instance, even on `return;`.
            return Ok(self.bound_this());
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal | Flow::Break => Value::Nil,
        })
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// An anonymous function value.
pub struct Lambda {
    declaration: Rc<LambdaDecl>,
    closure: SharedEnv,
}

impl Lambda {
    pub fn new(declaration: Rc<LambdaDecl>, closure: SharedEnv) -> Self {
        Lambda {
            declaration,
            closure,
        }
    }
}

impl Callable for Lambda {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling lambda from line {}", self.declaration.keyword.line);

        let flow = interpreter.call_body(
            &self.closure,
            &self.declaration.params,
            &self.declaration.body,
            arguments,
        )?;

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal | Flow::Break => Value::Nil,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────────

pub struct Class {
    pub name: String,
    methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: impl Into<String>, methods: HashMap<String, Rc<Function>>) -> Self {
        Class {
            name: name.into(),
            methods,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<&Rc<Function>> {
        self.methods.get(name)
    }
}

impl Callable for Class {
    /// Arity of `init`, or zero without one.
    fn arity(&self) -> usize {
        self.find_method(INITIALIZER).map_or(0, |init| init.arity())
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Rc::new(Instance::new(self.clone()));

        if let Some(initializer) = self.find_method(INITIALIZER) {
            Rc::new(initializer.bind(instance.clone())).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// Fields shadow methods; a method comes back bound to this instance.
    pub fn get(self: &Rc<Self>, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(self.clone()))));
        }

        Err(RuntimeError::new(
            RuntimeErrorKind::UndefinedProperty,
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}
