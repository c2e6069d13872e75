#![deny(missing_docs)]
#![doc = "Tagged expression trees for the symbolic potential terms of a scalar-field model."]

/// Expression tree types.
pub mod ast;
mod display;
/// Numeric evaluation against placeholder bindings.
pub mod eval;
/// Tokenizer for the textual expression form.
pub mod lexer;
/// Recursive descent parser.
pub mod parser;
/// Placeholder collection and arity checks.
pub mod placeholders;

pub use ast::{BinaryOp, Expr, Function};
pub use eval::Bindings;
pub use parser::parse_expr;
pub use placeholders::Placeholders;

use preheat_core::errors::ModelError;

/// Parses every expression in `sources`, preserving order.
pub fn parse_all<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Expr>, ModelError> {
    sources
        .iter()
        .map(|source| parse_expr(source.as_ref()))
        .collect()
}
