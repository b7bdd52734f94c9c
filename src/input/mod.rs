//! Expression input engine.
//!
//! This module provides functionality to:
//! - Validate each keystroke against the expression typed so far
//! - Rewrite root and factorial markers into function-call syntax
//! - Format the live expression for display

mod display;
pub mod registry;
mod rewrite;
mod validator;

pub use display::format_for_display;
pub use rewrite::{
    MAX_NESTING, TermSpan, rewrite_factorials, rewrite_operators, rewrite_roots, term_span_after,
    term_span_before,
};
pub use validator::{Outcome, Token, sanitize_input};
