//! Tokenizer for potential expressions.

use std::ops::Range;

use logos::Logos;
use preheat_core::errors::{ErrorInfo, ModelError};

/// Expression token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Numeric literal, including exponent notation.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    /// Placeholder or function name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    /// `**`
    #[token("**")]
    Pow,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
}

/// A token together with its byte range in the source.
pub type SpannedToken = (Token, Range<usize>);

/// Splits `source` into tokens, failing on the first unrecognised character.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ModelError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ModelError::InvalidExpression(
                    ErrorInfo::new("expr_lex", "unrecognised input in expression")
                        .with_context("expression", source)
                        .with_context("offset", span.start.to_string())
                        .with_context("text", &source[span]),
                ))
            }
        }
    }
    Ok(tokens)
}
