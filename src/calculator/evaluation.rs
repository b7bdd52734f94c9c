//! Expression evaluation pipeline.
//!
//! Rewrites the keypad expression into canonical call syntax, applies the
//! angle mode, hands the result to an [`Evaluator`] and classifies the value.

use super::engine::Evaluator;
use super::format::{format_display, format_result};
use super::prepare::{apply_angle_mode, normalize_symbols, rewrite_percent_and_mod};
use crate::config::AngleMode;
use crate::error::{CalcError, Result};
use crate::input::rewrite_operators;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcResult {
    /// Successful calculation with a valid numeric result.
    Success {
        /// The original expression.
        expression: String,
        /// The numeric value.
        value: f64,
        /// Formatted for display (with thousand separators).
        display_result: String,
        /// Formatted without separators.
        plain_result: String,
    },
    /// Expression evaluated but result is not a finite number.
    Error {
        /// The original expression.
        expression: String,
        /// Error message to display.
        message: String,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Get the display string (result or error message).
    pub fn display(&self) -> &str {
        match self {
            Self::Success { display_result, .. } => display_result,
            Self::Error { message, .. } => message,
        }
    }

    /// Get the plain result string (only for successful results).
    pub fn plain(&self) -> Option<&str> {
        match self {
            Self::Success { plain_result, .. } => Some(plain_result),
            Self::Error { .. } => None,
        }
    }

    /// Get the numeric value (only for successful results).
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Success { value, .. } => Some(*value),
            Self::Error { .. } => None,
        }
    }
}

/// Turn a keypad expression into the canonical form handed to the evaluator.
pub fn prepare_expression(input: &str, angle_mode: AngleMode) -> Result<String> {
    let normalized = normalize_symbols(input.trim());
    let rewritten = rewrite_operators(&normalized)?;
    let percent = rewrite_percent_and_mod(&rewritten);
    let prepared = apply_angle_mode(&percent, angle_mode)?;

    tracing::debug!(input, %rewritten, %prepared, %angle_mode, "prepared expression");
    Ok(prepared)
}

/// Classify a raw numeric value.
fn classify(expression: String, value: f64) -> CalcResult {
    if value.is_nan() {
        CalcResult::Error {
            expression,
            message: "Not a Number".to_string(),
        }
    } else if value.is_infinite() {
        let msg = if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        CalcResult::Error {
            expression,
            message: msg.to_string(),
        }
    } else {
        CalcResult::Success {
            expression,
            display_result: format_display(value),
            plain_result: format_result(value),
            value,
        }
    }
}

/// Evaluate a keypad expression.
///
/// Fails with [`CalcError::EmptyExpression`] on blank input and with
/// [`CalcError::MalformedExpression`] when the evaluator cannot parse the
/// prepared expression.
pub fn evaluate_expression(
    input: &str,
    angle_mode: AngleMode,
    evaluator: &dyn Evaluator,
) -> Result<CalcResult> {
    let expression = input.trim().to_string();
    if expression.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let prepared = prepare_expression(&expression, angle_mode)?;
    let value = evaluator.evaluate(&prepared)?;
    tracing::debug!(%expression, value, "evaluated");

    Ok(classify(expression, value))
}
