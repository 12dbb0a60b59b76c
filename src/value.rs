use std::fmt;
use std::rc::Rc;

use crate::object::{Callable, Class, Function, Instance, Lambda, NativeFunction};

/// A runtime value.  Primitives are held inline; everything with identity
/// (callables, classes, instances) is shared by reference count.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Native(Rc<NativeFunction>),
    Function(Rc<Function>),
    Lambda(Rc<Lambda>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    /// Only `nil` and `false` are falsy; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The callable capability of this value, if it has one.
    pub fn as_callable(&self) -> Option<Rc<dyn Callable>> {
        match self {
            Value::Native(f) => Some(f.clone() as Rc<dyn Callable>),
            Value::Function(f) => Some(f.clone() as Rc<dyn Callable>),
            Value::Lambda(f) => Some(f.clone() as Rc<dyn Callable>),
            Value::Class(c) => Some(c.clone() as Rc<dyn Callable>),
            Value::Nil
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Instance(_) => None,
        }
    }
}

impl PartialEq for Value {
    /// Primitives compare by value, everything else by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Integral values print without a fraction (`2`, not `2.0`).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        if n == 0.0 && n.is_sign_negative() {
            return f.write_str("-0");
        }
        let mut buf = itoa::Buffer::new();
        f.write_str(buf.format(n as i64))
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::Native(_) => write!(f, "<native fn>"),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),

            Value::Lambda(_) => write!(f, "<lambda>"),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.class().name),
        }
    }
}

impl fmt::Debug for Value {
    // Closures can reach themselves through their environment, so Debug never
    // descends into them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            other => write!(f, "{}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_fraction() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
    }

    #[test]
    fn nil_and_false_are_the_only_falsy_values() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn equality_by_value_for_primitives() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_eq!(Value::String("a".into()), Value::String("a".into()));
        assert_ne!(Value::Number(1.0), Value::String("1".into()));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn primitives_are_not_callable() {
        assert!(Value::Number(1.0).as_callable().is_none());
        assert!(Value::Nil.as_callable().is_none());
    }
}
