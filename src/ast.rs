//! Abstract syntax tree produced by `Parser`.
//!
//! The tree is owned top-down from `Program`, with one exception: a function
//! literal's parameter list and body sit behind `Rc` so that function values
//! created during evaluation can share them instead of deep-copying.
//!
//! `Display` renders every node back to source form; parsing that rendering
//! again yields a tree with the same rendering.

use std::fmt;
use std::rc::Rc;

use crate::interner::Symbol;

/// A parsed source file or REPL line.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Let(Symbol, Expr),
    Return(Option<Expr>),
    Expr(Expr),
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let(name, value) => write!(f, "let {} = {};", name, value),
            Stmt::Return(Some(value)) => write!(f, "return {};", value),
            Stmt::Return(None) => write!(f, "return;"),
            Stmt::Expr(expr) => write!(f, "{}", expr),
        }
    }
}

/// Brace-delimited statement list, as found in `if` arms and function
/// bodies.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Not => write!(f, "!"),
            PrefixOp::Neg => write!(f, "-"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Identifier(Symbol),
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Expr>),
    /// Key-value pairs in source order. Duplicate keys are a runtime
    /// concern, not a parse error.
    Hash(Vec<(Expr, Expr)>),
    Prefix(PrefixOp, Box<Expr>),
    Infix(InfixOp, Box<Expr>, Box<Expr>),
    If {
        cond: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        params: Rc<Vec<Symbol>>,
        body: Rc<Block>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index(Box<Expr>, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(sym) => write!(f, "{}", sym),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Str(s) => write!(f, "{}", s),
            Expr::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Expr::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "}}")
            }
            Expr::Prefix(op, right) => write!(f, "({}{})", op, right),
            Expr::Infix(op, left, right) => write!(f, "({} {} {})", left, op, right),
            Expr::If {
                cond,
                consequence,
                alternative,
            } => {
                write!(f, "if ({}) {{{}}}", cond, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{{}}}", alternative)?;
                }
                Ok(())
            }
            Expr::Function { params, body } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") {{ {} }}", body)
            }
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Index(left, index) => write!(f, "({}[{}])", left, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ctx::Context;

    #[test]
    fn let_statement_renders() {
        let ctx = Context::new();
        let program = Program {
            stmts: vec![Stmt::Let(
                ctx.symbol("myVar"),
                Expr::Identifier(ctx.symbol("anotherVar")),
            )],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn infix_renders_parenthesized() {
        let expr = Expr::Infix(
            InfixOp::Add,
            Box::new(Expr::Int(1)),
            Box::new(Expr::Infix(
                InfixOp::Mul,
                Box::new(Expr::Int(2)),
                Box::new(Expr::Int(3)),
            )),
        );
        assert_eq!(expr.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn if_else_renders() {
        let ctx = Context::new();
        let expr = Expr::If {
            cond: Box::new(Expr::Identifier(ctx.symbol("x"))),
            consequence: Block {
                stmts: vec![Stmt::Expr(Expr::Int(1))],
            },
            alternative: Some(Block {
                stmts: vec![Stmt::Expr(Expr::Int(2))],
            }),
        };
        assert_eq!(expr.to_string(), "if (x) {1} else {2}");
    }

    #[test]
    fn function_literal_renders() {
        let ctx = Context::new();
        let expr = Expr::Function {
            params: Rc::new(vec![ctx.symbol("a"), ctx.symbol("b")]),
            body: Rc::new(Block {
                stmts: vec![Stmt::Expr(Expr::Infix(
                    InfixOp::Add,
                    Box::new(Expr::Identifier(ctx.symbol("a"))),
                    Box::new(Expr::Identifier(ctx.symbol("b"))),
                ))],
            }),
        };
        assert_eq!(expr.to_string(), "fn(a, b) { (a + b) }");
    }

    #[test]
    fn containers_render() {
        let array = Expr::Array(vec![Expr::Int(1), Expr::Int(2)]);
        assert_eq!(array.to_string(), "[1, 2]");

        let hash = Expr::Hash(vec![(Expr::Str("one".to_string()), Expr::Int(1))]);
        assert_eq!(hash.to_string(), "{one:1}");

        let index = Expr::Index(Box::new(array), Box::new(Expr::Int(0)));
        assert_eq!(index.to_string(), "([1, 2][0])");
    }
}
