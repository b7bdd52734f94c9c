//! Calculator module for evaluating keypad expressions.
//!
//! This module provides functionality to:
//! - Prepare expressions (operator rewriting, percent, angle mode)
//! - Evaluate them through a pluggable evaluator backed by meval
//! - Classify and format results

mod engine;
mod evaluation;
mod format;
mod prepare;

pub use engine::{Evaluator, MevalEvaluator};
pub use evaluation::{CalcResult, evaluate_expression, prepare_expression};
pub use format::{format_display, format_result, round_to, to_fraction, to_precision};
pub use prepare::{apply_angle_mode, normalize_symbols, rewrite_percent_and_mod};
