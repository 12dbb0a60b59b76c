use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Blocks, calls and every closure created while a
/// scope is active hold one; the scope lives as long as the longest holder.
pub type SharedEnv = Rc<RefCell<Environment>>;

/// One lexical scope: its own bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: SharedEnv) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps a fresh scope in a shared handle.
    pub fn shared(self) -> SharedEnv {
        Rc::new(RefCell::new(self))
    }

    /// Inserts or overwrites `name` in this scope only.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup, innermost scope first.  Only used for globals.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Mutates the first scope that already binds `name`; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Reads `name` from the scope exactly `depth` links out, without falling
    /// back to outer scopes.
    pub fn get_at(&self, depth: usize, name: &Token) -> Result<Value, RuntimeError> {
        if depth == 0 {
            return self
                .values
                .get(&name.lexeme)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name));
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_at(depth - 1, name),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Writes `name` in the scope exactly `depth` links out.
    pub fn assign_at(
        &mut self,
        depth: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        if depth == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RuntimeError::undefined_variable(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign_at(depth - 1, name, value),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Local read by plain name; used for the implicit `this` binding.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeErrorKind;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1, 1)
    }

    #[test]
    fn define_overwrites_in_same_scope() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Number(2.0));

        assert_eq!(env.get(&ident("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn get_walks_enclosing_chain() {
        let globals = Environment::new().shared();
        globals.borrow_mut().define("g", Value::Bool(true));
        let inner = Environment::with_enclosing(globals.clone());

        assert_eq!(inner.get(&ident("g")).unwrap(), Value::Bool(true));

        let err = inner.get(&ident("missing")).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable);
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let mut env = Environment::new();
        let err = env.assign(&ident("x"), Value::Nil).unwrap_err();

        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable);
        assert!(env.get_local("x").is_none());
    }

    #[test]
    fn assign_updates_the_outer_slot_visible_to_all_holders() {
        let outer = Environment::new().shared();
        outer.borrow_mut().define("n", Value::Number(1.0));
        let first = Environment::with_enclosing(outer.clone()).shared();
        let second = Environment::with_enclosing(outer.clone()).shared();

        first
            .borrow_mut()
            .assign(&ident("n"), Value::Number(5.0))
            .unwrap();

        assert_eq!(second.borrow().get(&ident("n")).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn get_at_skips_shadowing_scopes() {
        let outer = Environment::new().shared();
        outer.borrow_mut().define("x", Value::Number(1.0));
        let middle = Environment::with_enclosing(outer.clone()).shared();
        middle.borrow_mut().define("x", Value::Number(2.0));
        let inner = Environment::with_enclosing(middle.clone());

        assert_eq!(inner.get_at(1, &ident("x")).unwrap(), Value::Number(2.0));
        assert_eq!(inner.get_at(2, &ident("x")).unwrap(), Value::Number(1.0));
        assert!(inner.get_at(0, &ident("x")).is_err());
    }

    #[test]
    fn assign_at_targets_exact_scope() {
        let outer = Environment::new().shared();
        outer.borrow_mut().define("x", Value::Number(1.0));
        let middle = Environment::with_enclosing(outer.clone()).shared();
        middle.borrow_mut().define("x", Value::Number(2.0));
        let mut inner = Environment::with_enclosing(middle.clone());

        inner
            .assign_at(2, &ident("x"), Value::Number(10.0))
            .unwrap();

        assert_eq!(outer.borrow().get_local("x"), Some(Value::Number(10.0)));
        assert_eq!(middle.borrow().get_local("x"), Some(Value::Number(2.0)));
    }
}
