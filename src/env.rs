//! Chained lexical environments.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interner::Symbol;
use crate::object::Value;

/// A scope frame: local bindings plus a handle on the enclosing scope.
///
/// Environments are shared via `Rc`: every function value keeps the
/// environment it was created in alive, so scopes routinely outlive the
/// call that created them. A function bound in the very environment it
/// captured forms a reference cycle that is never reclaimed; an interpreter
/// session is short-lived enough for that to be acceptable.
#[derive(Debug)]
pub struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    /// Creates a root environment.
    pub fn new() -> Rc<Env> {
        Self::with_parent(None)
    }

    /// Creates an environment enclosed by `parent`.
    pub fn with_parent(parent: Option<Rc<Env>>) -> Rc<Env> {
        Rc::new(Env {
            parent,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Looks `sym` up here and then in enclosing scopes.
    pub fn get(&self, sym: &Symbol) -> Option<Value> {
        match self.bindings.borrow().get(sym) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(sym)),
        }
    }

    /// Binds `sym` in this scope. Rebinding an existing name overwrites it;
    /// names in enclosing scopes are shadowed, never touched.
    pub fn set(&self, sym: &Symbol, val: Value) {
        self.bindings.borrow_mut().insert(sym.clone(), val);
    }
}
