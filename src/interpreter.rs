//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use log::debug;

use crate::ctx::Context;
use crate::diag::FullParseError;
use crate::env::Env;
use crate::eval::Evaluator;
use crate::object::Value;
use crate::parser::Parser;

/// Tree-walk interpreter for Maple.
///
/// Session state (the global environment and the interner) persists across
/// `eval` calls, so a REPL can define a function on one line and call it on
/// the next.
///
/// # Example
///
/// ```
/// # use maple::interpreter::{Interpreter, ParseErrors};
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.eval("let max = fn(x, y) { if (x > y) { x } else { y } };")?;
/// let value = interp.eval("max(10, 20);")?;
/// assert_eq!(value.to_string(), "20");
/// # Ok::<(), ParseErrors>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
}

/// Parse errors that stopped a source fragment from being evaluated.
#[derive(Debug)]
pub struct ParseErrors(Vec<FullParseError>);

impl ParseErrors {
    pub fn errors(&self) -> &[FullParseError] {
        &self.0
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl Error for ParseErrors {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            ctx: Context::new(),
            evaluator: Evaluator::new(output),
        }
    }

    /// The session's global environment, for inspecting bindings left
    /// behind by earlier `eval` calls.
    pub fn globals(&self) -> Rc<Env> {
        self.evaluator.globals()
    }

    /// Parse and evaluate `input`, returning the value of its last
    /// statement.
    ///
    /// Evaluation is refused when `input` has parse errors. Runtime
    /// failures are not `Err`: they come back as `Value::Error`.
    pub fn eval(&mut self, input: &str) -> Result<Value, ParseErrors> {
        let mut parser = Parser::new(input, self.ctx.clone());
        let program = parser.parse_program();
        let errors = parser.into_errors();
        if !errors.is_empty() {
            debug!("refusing to evaluate: {} parse errors", errors.len());
            return Err(ParseErrors(errors));
        }
        debug!("evaluating {} statements", program.stmts.len());
        Ok(self.evaluator.eval_program(&program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(input: &str) -> Result<Value, ParseErrors> {
        let mut out: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        interp.eval(input)
    }

    fn interpret_value(input: &str) -> Value {
        interpret(input).expect("unexpected parse errors")
    }

    #[test]
    fn conditional_on_computed_binding() {
        let input = "let a = 5; let b = a > 3; let c = a * 99; if (b) { 10 } else { 1 };";
        assert_eq!(interpret_value(input), Value::Integer(10));
    }

    #[test]
    fn function_call_with_computed_argument() {
        let input = "let add = fn(a, b) { a + b }; add(1, 2 * 3);";
        assert_eq!(interpret_value(input), Value::Integer(7));
    }

    #[test]
    fn recursive_counter() {
        let input = "let counter = fn(x) { if (x > 5) { return x; } counter(x + 1); }; counter(0);";
        assert_eq!(interpret_value(input), Value::Integer(6));
    }

    #[test]
    fn push_makes_a_new_array() {
        let input = "let a = [1, 2, 3]; let b = push(a, 4); len(a) + len(b);";
        assert_eq!(interpret_value(input), Value::Integer(7));
    }

    #[test]
    fn hash_lookup_by_string_key() {
        let input = "let h = {\"name\": \"x\", 1: true}; h[\"name\"];";
        let value = interpret_value(input);
        assert_eq!(value, Value::Str(Rc::from("x")));
        assert_eq!(value.to_string(), "x");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let input = "let divide = fn(a, b) { a / b }; divide(10, 0);";
        assert_eq!(
            interpret_value(input),
            Value::Error("division by zero".to_string())
        );
    }

    #[test]
    fn definitions_persist_across_eval_calls() {
        let mut out: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        interp
            .eval("let max = fn(x, y) { if (x > y) { x } else { y } };")
            .expect("unexpected parse errors");
        assert_eq!(
            interp.eval("max(10, 20);").expect("unexpected parse errors"),
            Value::Integer(20)
        );
        assert_eq!(
            interp.eval("max(5, 4);").expect("unexpected parse errors"),
            Value::Integer(5)
        );
    }

    #[test]
    fn globals_expose_session_bindings() {
        let mut out: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        interp
            .eval("let a = 5; let b = a * 2;")
            .expect("unexpected parse errors");
        let globals = interp.globals();
        assert_eq!(
            globals.get(&interp.ctx.symbol("a")),
            Some(Value::Integer(5))
        );
        assert_eq!(
            globals.get(&interp.ctx.symbol("b")),
            Some(Value::Integer(10))
        );
        assert_eq!(globals.get(&interp.ctx.symbol("c")), None);
    }

    #[test]
    fn parse_errors_refuse_evaluation() {
        match interpret("let x 5; puts(\"must not run\");") {
            Err(errors) => {
                assert_eq!(errors.errors().len(), 1);
                assert_eq!(
                    errors.to_string(),
                    "parse error: line 1: expected =, got 5"
                );
            }
            Ok(value) => panic!("expected parse errors, got {:?}", value),
        }
    }

    #[test]
    fn puts_reaches_the_output_sink() {
        let mut out: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        let value = interp
            .eval("puts(\"hello\"); puts(1 + 2);")
            .expect("unexpected parse errors");
        assert_eq!(value, Value::Null);
        assert_eq!(String::from_utf8(out).unwrap(), "hello\n3\n");
    }
}
