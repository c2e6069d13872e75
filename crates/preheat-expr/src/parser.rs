//! Recursive descent parser for potential expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom ('**' unary)?
//! atom    := number | placeholder | function '(' expr ')' | '(' expr ')'
//! ```
//!
//! `**` is right-associative and binds tighter than a leading minus, so
//! `-f1**2` is `-(f1**2)` and `f1**-2` is `f1**(-2)`.
//!
//! Nesting is capped at [`MAX_DEPTH`]. Parentheses, signs, exponents and
//! operator chains all count, which also bounds the depth of the tree that
//! evaluation and display walk recursively.

use std::ops::Range;

use preheat_core::errors::{ErrorInfo, ModelError};

use crate::ast::{BinaryOp, Expr, Function};
use crate::lexer::{tokenize, SpannedToken, Token};

/// Deepest nesting accepted before parsing fails with `expr_depth`.
pub const MAX_DEPTH: usize = 256;

/// Parses a single potential expression such as `0.5*C1*f1**2`.
pub fn parse_expr(source: &str) -> Result<Expr, ModelError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    if let Some((_, span)) = parser.tokens.get(parser.pos) {
        return Err(parser.error_at("expr_trailing", "unexpected trailing input", span.clone()));
    }
    Ok(expr)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, code: &str, message: &str, span: Range<usize>) -> ModelError {
        let text = self.source.get(span.clone()).unwrap_or_default();
        ModelError::InvalidExpression(
            ErrorInfo::new(code, message)
                .with_context("expression", self.source)
                .with_context("offset", span.start.to_string())
                .with_context("text", text),
        )
    }

    fn error_at_end(&self, message: &str) -> ModelError {
        self.error_at("expr_eof", message, self.source.len()..self.source.len())
    }

    /// One level deeper. Errors abandon the parse, so only successful
    /// returns restore the counter.
    fn enter(&mut self) -> Result<(), ModelError> {
        if self.depth >= MAX_DEPTH {
            let span = match self.tokens.get(self.pos) {
                Some((_, span)) => span.clone(),
                None => self.source.len()..self.source.len(),
            };
            return Err(self.error_at("expr_depth", "expression nests too deeply", span));
        }
        self.depth += 1;
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ModelError> {
        let depth = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            // Each link of a chain deepens the left spine of the tree.
            self.enter()?;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ModelError> {
        let depth = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            self.enter()?;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ModelError> {
        self.enter()?;
        let expr = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Expr::neg(self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()?
            }
            _ => self.power()?,
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, ModelError> {
        let base = self.atom()?;
        if let Some(Token::Pow) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ModelError> {
        self.enter()?;
        let Some((token, span)) = self.advance() else {
            return Err(self.error_at_end("unexpected end of expression"));
        };
        let atom = match token {
            Token::Number(value) if value.is_finite() => Expr::literal(value),
            Token::Number(_) => {
                return Err(self.error_at("expr_literal", "literal overflows f64", span))
            }
            Token::Ident(name) => self.identifier(&name, span)?,
            Token::LParen => {
                let inner = self.expr()?;
                self.expect_rparen()?;
                inner
            }
            _ => return Err(self.error_at("expr_token", "unexpected token", span)),
        };
        self.depth -= 1;
        Ok(atom)
    }

    fn identifier(&mut self, name: &str, span: Range<usize>) -> Result<Expr, ModelError> {
        if let Some(function) = Function::from_name(name) {
            match self.advance() {
                Some((Token::LParen, _)) => {}
                Some((_, next)) => {
                    return Err(self.error_at("expr_call", "expected '(' after function name", next))
                }
                None => return Err(self.error_at_end("expected '(' after function name")),
            }
            let argument = self.expr()?;
            self.expect_rparen()?;
            return Ok(Expr::call(function, argument));
        }

        let (prefix, digits) = name.split_at(1);
        let index = digits
            .parse::<usize>()
            .ok()
            .filter(|index| *index > 0 && !digits.starts_with('0'));
        match (prefix, index) {
            ("f", Some(index)) => Ok(Expr::field(index)),
            ("C", Some(index)) => Ok(Expr::coeff(index)),
            ("D", Some(index)) => Ok(Expr::bare(index)),
            _ => Err(ModelError::InvalidExpression(
                ErrorInfo::new("expr_symbol", "unknown symbol in expression")
                    .with_context("expression", self.source)
                    .with_context("offset", span.start.to_string())
                    .with_context("text", name)
                    .with_hint(
                        "use f1, f2, ... for fields and C1, C2, ... / D1, D2, ... for coefficients",
                    ),
            )),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ModelError> {
        match self.advance() {
            Some((Token::RParen, _)) => Ok(()),
            Some((_, span)) => Err(self.error_at("expr_paren", "expected ')'", span)),
            None => Err(self.error_at_end("expected ')'")),
        }
    }
}
