//! Token vocabulary shared by the keystroke validator and the operator rewriter.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Function names the keypad can insert and the evaluator understands.
pub const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "cot", "asin", "acos", "atan", "acot", "sinh", "cosh", "tanh", "asinh",
    "acosh", "atanh", "log", "log10", "sqrt", "cbrt", "abs", "factorial", "exp", "nthRoot",
    "permutations", "combinations", "gcd", "lcm", "ceil", "floor", "randomInt",
];

/// Named constants, longest first so `pi` is tried before `e`.
pub const CONSTANTS: &[&str] = &["pi", "e"];

/// Prefix marker for the square root.
pub const SQUARE_ROOT: char = '√';
/// Prefix marker for the cube root.
pub const CUBE_ROOT: char = '∛';
/// Postfix factorial marker.
pub const FACTORIAL: char = '!';

/// The remainder keyword as inserted by the keypad.
pub const MOD_KEYWORD: &str = " mod ";

lazy_static! {
    static ref FUNCTION_SET: HashSet<&'static str> = FUNCTION_NAMES.iter().copied().collect();
}

/// Check whether `name` is a registered function name.
pub fn is_function_name(name: &str) -> bool {
    FUNCTION_SET.contains(name)
}

/// Check whether `token` is a registered function opener such as `sin(`.
pub fn is_function_opener(token: &str) -> bool {
    token.strip_suffix('(').is_some_and(is_function_name)
}

/// Function name a prefix root marker rewrites to.
pub fn root_function(marker: char) -> Option<&'static str> {
    match marker {
        SQUARE_ROOT => Some("sqrt"),
        CUBE_ROOT => Some("cbrt"),
        _ => None,
    }
}

pub fn is_root_marker(c: char) -> bool {
    root_function(c).is_some()
}

/// Binary operators: `+ - * / ^ %`.
pub fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^' | '%')
}

/// Binary operators that have no unary form.
pub fn is_strict_binary_operator(c: char) -> bool {
    matches!(c, '*' | '/' | '^' | '%')
}

/// Characters that make up a numeric literal.
pub fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Return the constant the expression ends with, if any.
pub fn trailing_constant(expr: &str) -> Option<&'static str> {
    CONSTANTS.iter().copied().find(|c| expr.ends_with(c))
}
