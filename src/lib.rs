//! Calculator core: keystroke validation, operator rewriting, expression
//! evaluation and a set of numerical solvers.

pub mod calculator;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod keypad;
pub mod solvers;

mod proptests;

pub use calculator::{CalcResult, Evaluator, MevalEvaluator, evaluate_expression};
pub use config::{AngleMode, Config};
pub use error::{CalcError, Result};
pub use history::{History, HistoryEntry};
pub use input::{Outcome, format_for_display, rewrite_operators, sanitize_input};
pub use keypad::Keypad;
