//! Runtime values produced by the evaluator.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::builtins::Builtin;
use crate::env::Env;
use crate::interner::Symbol;

/// The value universe.
///
/// `Return` and `Error` never reach user code as first-class values: both
/// short-circuit statement evaluation, and `Return` is unwrapped at the
/// nearest function-call boundary while `Error` propagates to the top.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Boolean(bool),
    Str(Rc<str>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, Value>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

/// A user function: shared parameter list and body from the AST, plus the
/// environment captured when the `fn` literal was evaluated.
#[derive(Clone)]
pub struct Function {
    pub params: Rc<Vec<Symbol>>,
    pub body: Rc<Block>,
    pub env: Rc<Env>,
}

// The captured environment may hold this very function, so a derived
// formatter would chase that cycle forever; it is left out instead.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish()
    }
}

/// Key identity for hash values: the type tag keeps `1`, `"1"` and `true`
/// apart even if their content hashes collide.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    Str(Rc<str>),
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Integer(n) => write!(f, "{}", n),
            HashKey::Boolean(b) => write!(f, "{}", b),
            HashKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Value {
    /// Canonical type tag, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Str(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// `false` and `null` are falsy; everything else, including `0` and
    /// empty containers, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The key this value contributes to a hash, if it is a legal key kind.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(n) => Some(HashKey::Integer(*n)),
            Value::Boolean(b) => Some(HashKey::Boolean(*b)),
            Value::Str(s) => Some(HashKey::Str(s.clone())),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(l), Value::Integer(r)) => l == r,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Array(l), Value::Array(r)) => l == r,
            (Value::Hash(l), Value::Hash(r)) => l == r,
            // Functions have no structural equality; identity it is.
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => l == r,
            (Value::Return(l), Value::Return(r)) => l == r,
            (Value::Error(l), Value::Error(r)) => l == r,
            _ => false,
        }
    }
}

/// The inspect form shown to users. Strings render without quotes; the REPL
/// adds them when echoing a top-level string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(function) => {
                write!(f, "fn(")?;
                for (i, param) in function.params.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") {{ {} }}", function.body)
            }
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Return(value) => write!(f, "{}", value),
            Value::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Str(Rc::from("")).is_truthy());
        assert!(Value::Array(Rc::new(vec![])).is_truthy());
    }

    #[test]
    fn hash_keys_are_type_tagged() {
        let one = Value::Integer(1).hash_key().unwrap();
        let tru = Value::Boolean(true).hash_key().unwrap();
        let one_str = Value::Str(Rc::from("1")).hash_key().unwrap();
        assert_ne!(one, tru);
        assert_ne!(one, one_str);
        assert_ne!(tru, one_str);
    }

    #[test]
    fn same_content_keys_are_equal() {
        let a = Value::Str(Rc::from("name")).hash_key().unwrap();
        let b = Value::Str(Rc::from("name")).hash_key().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unhashable_values_have_no_key() {
        assert_eq!(Value::Null.hash_key(), None);
        assert_eq!(Value::Array(Rc::new(vec![])).hash_key(), None);
    }

    #[test]
    fn inspect_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Str(Rc::from("hi")).to_string(), "hi");
        assert_eq!(
            Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)])).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            Value::Error("division by zero".to_string()).to_string(),
            "ERROR: division by zero"
        );
    }
}
