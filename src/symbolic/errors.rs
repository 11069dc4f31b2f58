//! Error taxonomy of the algebra engine.
//!
//! Parsing and configuration failures are fatal for the single call that raised them.
//! A missing derivative rule is not an error: the differentiator returns `None` instead.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    /// unterminated or extra bracket marker
    #[error("bracket mismatch: {0}")]
    BracketMismatch(String),

    /// the token stream could not be folded into exactly one tree
    #[error("structural parse error: {0}")]
    StructuralParse(String),

    #[error("empty expression")]
    EmptyExpression,

    #[error("expression depth {depth} exceeds the configured limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    /// `evaluate_text` left a symbolic residual
    #[error("expression does not evaluate to a number, unresolved residual: {0}")]
    UnresolvedSymbols(String),

    #[error("configuration error: {0}")]
    Config(String),
}
