//! Built-in functions.

use std::io::prelude::*;
use std::rc::Rc;

use crate::object::Value;

/// Functions baked into the interpreter.
///
/// Built-ins are looked up by name only after ordinary environment lookup
/// misses, so `let len = ...` shadows the built-in for the rest of that
/// scope.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    /// Applies the built-in to already-evaluated arguments. `output` is the
    /// evaluator's sink; only `puts` writes to it.
    pub fn apply<W: Write>(self, args: &[Value], output: &mut W) -> Value {
        match self {
            Builtin::Len => {
                if args.len() != 1 {
                    return wrong_arity(args.len(), 1);
                }
                match &args[0] {
                    Value::Str(s) => Value::Integer(s.len() as i64),
                    Value::Array(elements) => Value::Integer(elements.len() as i64),
                    other => self.unsupported(other),
                }
            }
            Builtin::First => {
                if args.len() != 1 {
                    return wrong_arity(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        elements.first().cloned().unwrap_or(Value::Null)
                    }
                    other => self.unsupported(other),
                }
            }
            Builtin::Last => {
                if args.len() != 1 {
                    return wrong_arity(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        elements.last().cloned().unwrap_or(Value::Null)
                    }
                    other => self.unsupported(other),
                }
            }
            Builtin::Rest => {
                if args.len() != 1 {
                    return wrong_arity(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        if elements.is_empty() {
                            Value::Null
                        } else {
                            Value::Array(Rc::new(elements[1..].to_vec()))
                        }
                    }
                    other => self.unsupported(other),
                }
            }
            Builtin::Push => {
                if args.len() != 2 {
                    return wrong_arity(args.len(), 2);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        let mut appended = elements.as_ref().clone();
                        appended.push(args[1].clone());
                        Value::Array(Rc::new(appended))
                    }
                    other => self.unsupported(other),
                }
            }
            Builtin::Puts => {
                for arg in args {
                    if let Err(e) = writeln!(output, "{}", arg) {
                        return Value::Error(format!("I/O error: {}", e));
                    }
                }
                Value::Null
            }
        }
    }

    fn unsupported(self, arg: &Value) -> Value {
        Value::Error(format!(
            "argument to '{}' not supported, got {}",
            self.name(),
            arg.type_name()
        ))
    }
}

fn wrong_arity(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(builtin: Builtin, args: &[Value]) -> Value {
        let mut out: Vec<u8> = Vec::new();
        let result = builtin.apply(args, &mut out);
        assert!(out.is_empty());
        result
    }

    fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(elements))
    }

    #[test]
    fn len_of_string_counts_bytes() {
        assert_eq!(
            apply(Builtin::Len, &[Value::Str(Rc::from("hello"))]),
            Value::Integer(5)
        );
        assert_eq!(
            apply(Builtin::Len, &[Value::Str(Rc::from(""))]),
            Value::Integer(0)
        );
    }

    #[test]
    fn len_of_array() {
        assert_eq!(
            apply(Builtin::Len, &[array(vec![Value::Integer(1), Value::Integer(2)])]),
            Value::Integer(2)
        );
    }

    #[test]
    fn len_rejects_integers() {
        assert_eq!(
            apply(Builtin::Len, &[Value::Integer(1)]),
            Value::Error("argument to 'len' not supported, got INTEGER".to_string())
        );
    }

    #[test]
    fn len_checks_arity() {
        assert_eq!(
            apply(Builtin::Len, &[]),
            Value::Error("wrong number of arguments. got=0, want=1".to_string())
        );
    }

    #[test]
    fn first_and_last() {
        let a = array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(apply(Builtin::First, &[a.clone()]), Value::Integer(1));
        assert_eq!(apply(Builtin::Last, &[a]), Value::Integer(3));
        assert_eq!(apply(Builtin::First, &[array(vec![])]), Value::Null);
        assert_eq!(apply(Builtin::Last, &[array(vec![])]), Value::Null);
    }

    #[test]
    fn rest_drops_the_head() {
        let a = array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(
            apply(Builtin::Rest, &[a]),
            array(vec![Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(
            apply(Builtin::Rest, &[array(vec![Value::Integer(1)])]),
            array(vec![])
        );
        assert_eq!(apply(Builtin::Rest, &[array(vec![])]), Value::Null);
    }

    #[test]
    fn push_leaves_the_original_alone() {
        let a = array(vec![Value::Integer(1)]);
        let b = apply(Builtin::Push, &[a.clone(), Value::Integer(2)]);
        assert_eq!(b, array(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(a, array(vec![Value::Integer(1)]));
    }

    #[test]
    fn push_rejects_non_arrays() {
        assert_eq!(
            apply(Builtin::Push, &[Value::Integer(1), Value::Integer(2)]),
            Value::Error("argument to 'push' not supported, got INTEGER".to_string())
        );
    }

    #[test]
    fn puts_writes_one_line_per_argument() {
        let mut out: Vec<u8> = Vec::new();
        let result = Builtin::Puts.apply(
            &[Value::Str(Rc::from("hello")), Value::Integer(42)],
            &mut out,
        );
        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8(out).unwrap(), "hello\n42\n");
    }

    #[test]
    fn lookup_knows_every_builtin() {
        for builtin in [
            Builtin::Len,
            Builtin::First,
            Builtin::Last,
            Builtin::Rest,
            Builtin::Push,
            Builtin::Puts,
        ] {
            assert_eq!(Builtin::lookup(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::lookup("map"), None);
    }
}
