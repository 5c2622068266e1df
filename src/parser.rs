//! Pratt parser.
//!
//! Expressions are parsed by precedence climbing: every token kind may have
//! a prefix rule (it can start an expression) and an infix rule (it can
//! extend one), and `parse_expression` keeps folding infix rules in while
//! the next token binds tighter than its caller.
//!
//! The parser does not stop at the first problem: errors accumulate in a
//! list and the offending statement is dropped, so one bad line still
//! surfaces everything else that is wrong with the input.

use std::rc::Rc;

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::ctx::Context;
use crate::diag::{FullParseError, ParseError, Position};
use crate::interner::Symbol;
use crate::lexer::Lexer;
use crate::token::Token;

/// Binding powers, weakest first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::EqualEqual | Token::BangEqual => Precedence::Equals,
        Token::Less | Token::Greater => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Star | Token::Slash => Precedence::Product,
        Token::LeftParen => Precedence::Call,
        Token::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_op(token: &Token) -> Option<InfixOp> {
    match token {
        Token::Plus => Some(InfixOp::Add),
        Token::Minus => Some(InfixOp::Sub),
        Token::Star => Some(InfixOp::Mul),
        Token::Slash => Some(InfixOp::Div),
        Token::EqualEqual => Some(InfixOp::Equal),
        Token::BangEqual => Some(InfixOp::NotEqual),
        Token::Less => Some(InfixOp::Less),
        Token::Greater => Some(InfixOp::Greater),
        _ => None,
    }
}

/// Parse `input`, returning the program together with any parse errors.
///
/// Callers must refuse to evaluate the program when the error list is
/// non-empty; the tree only covers the statements that parsed.
pub fn parse(input: &str, ctx: Rc<Context>) -> (Program, Vec<FullParseError>) {
    let mut parser = Parser::new(input, ctx);
    let program = parser.parse_program();
    (program, parser.into_errors())
}

#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    current_pos: Position,
    peek: Token,
    peek_pos: Position,
    errors: Vec<FullParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, ctx: Rc<Context>) -> Parser<'a> {
        let mut lexer = Lexer::new(input, ctx);
        let (current_pos, current) = lexer.next_token();
        let (peek_pos, peek) = lexer.next_token();
        Parser {
            lexer,
            current,
            current_pos,
            peek,
            peek_pos,
            errors: vec![],
        }
    }

    /// Parse the whole input.
    pub fn parse_program(&mut self) -> Program {
        let mut stmts = vec![];
        while self.current != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
            self.advance();
        }
        Program { stmts }
    }

    pub fn errors(&self) -> &[FullParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FullParseError> {
        self.errors
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.current {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// Current token is `let`.
    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let name = match self.peek.clone() {
            Token::Identifier(sym) => {
                self.advance();
                sym
            }
            other => {
                self.error_at_peek("identifier", &other);
                return None;
            }
        };
        if !self.expect_peek(Token::Assign) {
            return None;
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek == Token::Semicolon {
            self.advance();
        }
        Some(Stmt::Let(name, value))
    }

    /// Current token is `return`.
    fn parse_return_statement(&mut self) -> Option<Stmt> {
        // A bare `return` may also end a block without a semicolon, as in
        // `if (x) { return }`; the `}` stays put for `parse_block`.
        if matches!(
            self.peek,
            Token::Semicolon | Token::RightCurly | Token::Eof
        ) {
            if self.peek == Token::Semicolon {
                self.advance();
            }
            return Some(Stmt::Return(None));
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek == Token::Semicolon {
            self.advance();
        }
        Some(Stmt::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek == Token::Semicolon {
            self.advance();
        }
        Some(Stmt::Expr(expr))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while self.peek != Token::Semicolon && precedence < precedence_of(&self.peek) {
            if let Some(op) = infix_op(&self.peek) {
                let op_precedence = precedence_of(&self.peek);
                self.advance();
                self.advance();
                let right = self.parse_expression(op_precedence)?;
                left = Expr::Infix(op, Box::new(left), Box::new(right));
            } else if self.peek == Token::LeftParen {
                self.advance();
                left = self.parse_call_expression(left)?;
            } else if self.peek == Token::LeftBracket {
                self.advance();
                left = self.parse_index_expression(left)?;
            } else {
                break;
            }
        }
        Some(left)
    }

    /// Start an expression from the current token.
    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.current.clone() {
            Token::Identifier(sym) => Some(Expr::Identifier(sym)),
            Token::Int(digits) => match digits.parse::<i64>() {
                Ok(n) => Some(Expr::Int(n)),
                Err(_) => {
                    self.error(ParseError::BadIntLiteral(digits));
                    None
                }
            },
            Token::Str(s) => Some(Expr::Str(s)),
            Token::True => Some(Expr::Bool(true)),
            Token::False => Some(Expr::Bool(false)),
            Token::Bang => self.parse_prefix_expression(PrefixOp::Not),
            Token::Minus => self.parse_prefix_expression(PrefixOp::Neg),
            Token::LeftParen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Fn => self.parse_function_literal(),
            Token::LeftBracket => {
                let elements = self.parse_expression_list(Token::RightBracket)?;
                Some(Expr::Array(elements))
            }
            Token::LeftCurly => self.parse_hash_literal(),
            other => {
                self.error(ParseError::NoPrefixParseFn(other.to_string()));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, op: PrefixOp) -> Option<Expr> {
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix(op, Box::new(right)))
    }

    /// Current token is `(`. A grouped expression has no node of its own;
    /// the parentheses only steer precedence.
    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Token::RightParen) {
            return None;
        }
        Some(expr)
    }

    /// Current token is `if`.
    fn parse_if_expression(&mut self) -> Option<Expr> {
        if !self.expect_peek(Token::LeftParen) {
            return None;
        }
        self.advance();
        let cond = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Token::RightParen) {
            return None;
        }
        if !self.expect_peek(Token::LeftCurly) {
            return None;
        }
        let consequence = self.parse_block();
        let alternative = if self.peek == Token::Else {
            self.advance();
            if !self.expect_peek(Token::LeftCurly) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };
        Some(Expr::If {
            cond: Box::new(cond),
            consequence,
            alternative,
        })
    }

    /// Current token is `{`. Consumes up to the matching `}` (or end of
    /// input).
    fn parse_block(&mut self) -> Block {
        let mut stmts = vec![];
        self.advance();
        while self.current != Token::RightCurly && self.current != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
            self.advance();
        }
        Block { stmts }
    }

    /// Current token is `fn`.
    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(Token::LeftParen) {
            return None;
        }
        let params = self.parse_parameters()?;
        if !self.expect_peek(Token::LeftCurly) {
            return None;
        }
        let body = self.parse_block();
        Some(Expr::Function {
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    /// Current token is `(`. Parses a comma-separated identifier list up to
    /// `)`.
    fn parse_parameters(&mut self) -> Option<Vec<Symbol>> {
        let mut params = vec![];
        if self.peek == Token::RightParen {
            self.advance();
            return Some(params);
        }
        self.advance();
        loop {
            match self.current.clone() {
                Token::Identifier(sym) => params.push(sym),
                other => {
                    self.error_at_current("identifier", &other);
                    return None;
                }
            }
            if self.peek != Token::Comma {
                break;
            }
            self.advance();
            self.advance();
        }
        if !self.expect_peek(Token::RightParen) {
            return None;
        }
        Some(params)
    }

    /// Current token is the opening delimiter. Parses a comma-separated
    /// expression list up to `end`.
    fn parse_expression_list(&mut self, end: Token) -> Option<Vec<Expr>> {
        let mut items = vec![];
        if self.peek == end {
            self.advance();
            return Some(items);
        }
        self.advance();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek == Token::Comma {
            self.advance();
            self.advance();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(items)
    }

    /// Current token is `{`.
    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = vec![];
        while self.peek != Token::RightCurly {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(Token::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if self.peek != Token::RightCurly && !self.expect_peek(Token::Comma) {
                return None;
            }
        }
        self.advance();
        Some(Expr::Hash(pairs))
    }

    /// Current token is `(`; `callee` has already been parsed.
    fn parse_call_expression(&mut self, callee: Expr) -> Option<Expr> {
        let args = self.parse_expression_list(Token::RightParen)?;
        Some(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// Current token is `[`; `left` has already been parsed.
    fn parse_index_expression(&mut self, left: Expr) -> Option<Expr> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Token::RightBracket) {
            return None;
        }
        Some(Expr::Index(Box::new(left), Box::new(index)))
    }

    fn advance(&mut self) {
        let (pos, token) = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, token);
        self.current_pos = self.peek_pos;
        self.peek_pos = pos;
    }

    /// If the next token is `expected`, consume it. Otherwise record an
    /// error and leave the token stream alone.
    fn expect_peek(&mut self, expected: Token) -> bool {
        if self.peek == expected {
            self.advance();
            true
        } else {
            let got = self.peek.to_string();
            self.errors.push(FullParseError {
                pos: self.peek_pos,
                error: ParseError::UnexpectedToken {
                    expected: expected.to_string(),
                    got,
                },
            });
            false
        }
    }

    fn error(&mut self, error: ParseError) {
        self.errors.push(FullParseError {
            pos: self.current_pos,
            error,
        });
    }

    fn error_at_peek(&mut self, expected: &str, got: &Token) {
        self.errors.push(FullParseError {
            pos: self.peek_pos,
            error: ParseError::UnexpectedToken {
                expected: expected.to_string(),
                got: got.to_string(),
            },
        });
    }

    fn error_at_current(&mut self, expected: &str, got: &Token) {
        self.errors.push(FullParseError {
            pos: self.current_pos,
            error: ParseError::UnexpectedToken {
                expected: expected.to_string(),
                got: got.to_string(),
            },
        });
    }
}
