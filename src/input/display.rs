//! Display formatting of the live expression.

/// Replace internal function names with their mathematical notation.
///
/// `√` and `∛` are already stored as glyphs, so only call syntax changes.
/// `log10(` is replaced before `log(` to avoid partial matches.
pub fn format_for_display(expr: &str) -> String {
    expr.replace("log10(", "log₁₀(")
        .replace("log(", "ln(")
        .replace("nthRoot(", "ⁿ√(")
}
