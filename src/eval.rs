//! Tree-walking evaluator.
//!
//! Runtime failures never surface as `Err`: they are `Value::Error` values
//! that ride up the tree the same way `Value::Return` does. After every
//! sub-evaluation the evaluator checks for these two sentinels and stops
//! the work at hand; only a function-call boundary unwraps `Return`, and
//! nothing unwraps `Error`.

use std::collections::HashMap;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::builtins::Builtin;
use crate::env::Env;
use crate::interner::Symbol;
use crate::object::{Function, Value};

/// Walks the AST and produces values.
///
/// The evaluator owns the global environment of a session and writes all
/// `puts` output to `output`, so tests can capture it.
#[derive(Debug)]
pub struct Evaluator<'a, W: Write> {
    output: &'a mut W,
    globals: Rc<Env>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator {
            output,
            globals: Env::new(),
        }
    }

    /// The session's global environment.
    pub fn globals(&self) -> Rc<Env> {
        self.globals.clone()
    }

    /// Evaluate `program` in the global environment. A top-level `return`
    /// unwraps to its value; an error aborts the remaining statements.
    pub fn eval_program(&mut self, program: &Program) -> Value {
        let env = self.globals.clone();
        let mut result = Value::Null;
        for stmt in &program.stmts {
            result = self.eval_stmt(stmt, &env);
            match result {
                Value::Return(value) => return *value,
                Value::Error(_) => return result,
                _ => (),
            }
        }
        result
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Rc<Env>) -> Value {
        match stmt {
            Stmt::Expr(expr) => self.eval_expr(expr, env),
            Stmt::Let(name, value) => {
                let value = self.eval_expr(value, env);
                if value.is_error() {
                    return value;
                }
                env.set(name, value);
                Value::Null
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env),
                    None => Value::Null,
                };
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
        }
    }

    /// Evaluate a block without unwrapping `Return`, so that a `return`
    /// nested in an `if` still unwinds the whole enclosing call.
    fn eval_block(&mut self, block: &Block, env: &Rc<Env>) -> Value {
        let mut result = Value::Null;
        for stmt in &block.stmts {
            result = self.eval_stmt(stmt, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }
        result
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Rc<Env>) -> Value {
        match expr {
            Expr::Int(n) => Value::Integer(*n),
            Expr::Bool(b) => Value::Boolean(*b),
            Expr::Str(s) => Value::Str(Rc::from(s.as_str())),
            Expr::Identifier(sym) => eval_identifier(sym, env),
            Expr::Prefix(op, right) => {
                let right = self.eval_expr(right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix(*op, right)
            }
            Expr::Infix(op, left, right) => {
                let left = self.eval_expr(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expr(right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix(*op, left, right)
            }
            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                let cond = self.eval_expr(cond, env);
                if cond.is_error() {
                    return cond;
                }
                if cond.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Value::Null
                }
            }
            Expr::Function { params, body } => Value::Function(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
                env: env.clone(),
            })),
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, env);
                if callee.is_error() {
                    return callee;
                }
                let args = match self.eval_expressions(args, env) {
                    Ok(args) => args,
                    Err(error) => return error,
                };
                self.apply_function(callee, args)
            }
            Expr::Array(elements) => match self.eval_expressions(elements, env) {
                Ok(elements) => Value::Array(Rc::new(elements)),
                Err(error) => error,
            },
            Expr::Hash(pairs) => self.eval_hash_literal(pairs, env),
            Expr::Index(left, index) => {
                let left = self.eval_expr(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expr(index, env);
                if index.is_error() {
                    return index;
                }
                eval_index(left, index)
            }
        }
    }

    /// Evaluate expressions left to right, stopping at the first error.
    fn eval_expressions(&mut self, exprs: &[Expr], env: &Rc<Env>) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval_expr(expr, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)], env: &Rc<Env>) -> Value {
        let mut map = HashMap::new();
        for (key_expr, value_expr) in pairs {
            let key = self.eval_expr(key_expr, env);
            if key.is_error() {
                return key;
            }
            let key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => {
                    return Value::Error(format!("unusable as hash key: {}", key.type_name()))
                }
            };
            let value = self.eval_expr(value_expr, env);
            if value.is_error() {
                return value;
            }
            map.insert(key, value);
        }
        Value::Hash(Rc::new(map))
    }

    fn apply_function(&mut self, callee: Value, args: Vec<Value>) -> Value {
        match callee {
            Value::Function(function) => {
                if args.len() != function.params.len() {
                    return Value::Error(format!(
                        "wrong number of arguments: want={} got={}",
                        function.params.len(),
                        args.len()
                    ));
                }
                let env = Env::with_parent(Some(function.env.clone()));
                for (param, arg) in function.params.iter().zip(args) {
                    env.set(param, arg);
                }
                match self.eval_block(&function.body, &env) {
                    Value::Return(value) => *value,
                    other => other,
                }
            }
            Value::Builtin(builtin) => builtin.apply(&args, self.output),
            other => Value::Error(format!("not a function: {}", other.type_name())),
        }
    }
}

/// Environment first, then the built-in table: a local binding shadows a
/// built-in of the same name.
fn eval_identifier(sym: &Symbol, env: &Rc<Env>) -> Value {
    if let Some(value) = env.get(sym) {
        return value;
    }
    if let Some(builtin) = Builtin::lookup(sym.as_str()) {
        return Value::Builtin(builtin);
    }
    Value::Error(format!("identifier not found: {}", sym))
}

fn eval_prefix(op: PrefixOp, right: Value) -> Value {
    match op {
        PrefixOp::Not => Value::Boolean(!right.is_truthy()),
        PrefixOp::Neg => match right {
            Value::Integer(n) => Value::Integer(-n),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, l, r),
        (Value::Str(l), Value::Str(r)) => match op {
            InfixOp::Add => Value::Str(Rc::from(format!("{}{}", l, r))),
            _ => Value::Error(format!("unknown operator: STRING {} STRING", op)),
        },
        (Value::Boolean(l), Value::Boolean(r)) => match op {
            InfixOp::Equal => Value::Boolean(l == r),
            InfixOp::NotEqual => Value::Boolean(l != r),
            _ => Value::Error(format!("unknown operator: BOOLEAN {} BOOLEAN", op)),
        },
        (left, right) => {
            if left.type_name() != right.type_name() {
                Value::Error(format!(
                    "type mismatch: {} {} {}",
                    left.type_name(),
                    op,
                    right.type_name()
                ))
            } else {
                Value::Error(format!(
                    "unknown operator: {} {} {}",
                    left.type_name(),
                    op,
                    right.type_name()
                ))
            }
        }
    }
}

fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> Value {
    match op {
        InfixOp::Add => Value::Integer(l + r),
        InfixOp::Sub => Value::Integer(l - r),
        InfixOp::Mul => Value::Integer(l * r),
        InfixOp::Div => {
            if r == 0 {
                Value::Error("division by zero".to_string())
            } else {
                Value::Integer(l / r)
            }
        }
        InfixOp::Less => Value::Boolean(l < r),
        InfixOp::Greater => Value::Boolean(l > r),
        InfixOp::Equal => Value::Boolean(l == r),
        InfixOp::NotEqual => Value::Boolean(l != r),
    }
}

fn eval_index(left: Value, index: Value) -> Value {
    match (left, index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if i < 0 || i as usize >= elements.len() {
                Value::Null
            } else {
                elements[i as usize].clone()
            }
        }
        (Value::Hash(pairs), key) => match key.hash_key() {
            Some(hash_key) => pairs.get(&hash_key).cloned().unwrap_or(Value::Null),
            None => Value::Error(format!("unusable as hash key: {}", key.type_name())),
        },
        (left, _) => Value::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}
