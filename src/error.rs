//! Error types shared by the rewriter, the evaluation dispatcher and the solvers.
//!
//! Keystroke rejection is not an error: the validator reports it through
//! [`crate::input::Outcome::Reject`].

use thiserror::Error;

/// Errors raised by the calculator core.
///
/// Every variant renders as a short message that can be shown to the user as-is.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("Empty expression")]
    EmptyExpression,

    #[error("{0}")]
    MalformedExpression(String),

    #[error("Expression nested too deeply (limit {limit})")]
    NestingTooDeep { limit: usize },

    #[error("Coefficient a cannot be zero for a {equation} equation")]
    ZeroLeadingCoefficient { equation: &'static str },

    #[error("{0}")]
    DimensionMismatch(String),

    #[error("Missing inputs.")]
    MissingInputs,

    #[error("{0}")]
    InsufficientData(String),

    #[error("Normal equations are singular")]
    SingularSystem,

    #[error("Cannot {0} zero vector")]
    ZeroVector(&'static str),

    #[error("Integration error: {0}")]
    Integration(String),
}

pub type Result<T> = std::result::Result<T, CalcError>;
