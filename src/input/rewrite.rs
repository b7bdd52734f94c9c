//! Rewriting of display-only operators into function-call syntax.
//!
//! `√x` and `∛x` become `sqrt(x)` and `cbrt(x)`; `x!` becomes `factorial(x)`.
//! The operand of each marker is found with a small term grammar, tried in order:
//! parenthesized group, nested root marker, registered function call, named
//! constant, numeric literal. Input may be a partially typed expression with
//! unbalanced parentheses.

use super::registry::{FACTORIAL, is_function_name, is_number_char, is_root_marker, root_function};
use crate::error::{CalcError, Result};

/// Maximum depth of nested root operands or chained factorials.
pub const MAX_NESTING: usize = 256;

/// Half-open `[start, end)` character range of an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermSpan {
    pub start: usize,
    pub end: usize,
}

impl TermSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Index just past the parenthesized group opening at `open`.
///
/// An unterminated group extends to the end of the input.
fn matching_close(chars: &[char], open: usize) -> usize {
    let mut depth = 0usize;
    for (j, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
    }
    chars.len()
}

/// Index of the `(` matching the `)` at `close`, or 0 if unmatched.
fn matching_open(chars: &[char], close: usize) -> usize {
    let mut depth = 0usize;
    for j in (0..=close).rev() {
        match chars[j] {
            ')' => depth += 1,
            '(' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j;
                }
            }
            _ => {}
        }
    }
    0
}

/// Length of the identifier (`[A-Za-z][A-Za-z0-9]*`) starting at `start`.
fn identifier_len(chars: &[char], start: usize) -> usize {
    match chars.get(start) {
        Some(c) if c.is_ascii_alphabetic() => chars[start..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric())
            .count(),
        _ => 0,
    }
}

/// Find the operand that starts at `start`, for a prefix operator.
pub fn term_span_after(chars: &[char], start: usize) -> TermSpan {
    let mut i = start;

    // A nested root marker binds to the operand after it.
    while i < chars.len() && is_root_marker(chars[i]) {
        i += 1;
    }

    let end = if i >= chars.len() {
        i
    } else if chars[i] == '(' {
        matching_close(chars, i)
    } else {
        let ident = identifier_len(chars, i);
        let name: String = chars[i..i + ident].iter().collect();

        if ident > 0 && chars.get(i + ident) == Some(&'(') && is_function_name(&name) {
            matching_close(chars, i + ident)
        } else if chars[i..].starts_with(&['p', 'i']) {
            i + 2
        } else if chars[i] == 'e' && !chars.get(i + 1).is_some_and(|c| c.is_ascii_alphabetic()) {
            i + 1
        } else if is_number_char(chars[i]) {
            i + chars[i..].iter().take_while(|&&c| is_number_char(c)).count()
        } else {
            i + 1
        }
    };

    tracing::trace!(start, end, "prefix operand");
    TermSpan { start, end }
}

/// Find the operand that ends just before `end`, for a postfix operator.
pub fn term_span_before(chars: &[char], end: usize) -> TermSpan {
    if end == 0 {
        return TermSpan { start: 0, end };
    }

    let ch = chars[end - 1];
    let start = if ch == ')' {
        let open = matching_open(chars, end - 1);

        // Pull in the function name in front of the group, if it is registered.
        let mut name_start = open;
        while name_start > 0 && chars[name_start - 1].is_ascii_alphanumeric() {
            name_start -= 1;
        }
        while name_start < open && chars[name_start].is_ascii_digit() {
            name_start += 1;
        }
        let name: String = chars[name_start..open].iter().collect();
        if is_function_name(&name) { name_start } else { open }
    } else if end >= 2 && chars[end - 2..end] == ['p', 'i'] {
        end - 2
    } else if ch == 'e' && (end < 2 || !chars[end - 2].is_ascii_alphabetic()) {
        end - 1
    } else if is_number_char(ch) {
        end - chars[..end]
            .iter()
            .rev()
            .take_while(|&&c| is_number_char(c))
            .count()
    } else {
        end - 1
    };

    tracing::trace!(start, end, "postfix operand");
    TermSpan { start, end }
}

/// Rewrite `√` and `∛` prefix markers into `sqrt(...)` and `cbrt(...)` calls.
pub fn rewrite_roots(expr: &str) -> Result<String> {
    let chars: Vec<char> = expr.chars().collect();
    rewrite_roots_nested(&chars, 0)
}

fn rewrite_roots_nested(chars: &[char], depth: usize) -> Result<String> {
    if depth > MAX_NESTING {
        return Err(CalcError::NestingTooDeep { limit: MAX_NESTING });
    }

    let mut out = String::with_capacity(chars.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let Some(name) = root_function(chars[i]) else {
            out.push(chars[i]);
            i += 1;
            continue;
        };

        let span = term_span_after(chars, i + 1);
        let operand = rewrite_roots_nested(&chars[span.start..span.end], depth + 1)?;

        out.push_str(name);
        if operand.starts_with('(') {
            out.push_str(&operand);
        } else {
            out.push('(');
            out.push_str(&operand);
            out.push(')');
        }
        i = span.end;
    }

    Ok(out)
}

/// Rewrite postfix `!` markers into `factorial(...)` calls.
///
/// Chained markers wrap the call produced for the previous one, so `5!!`
/// becomes `factorial(factorial(5))`.
pub fn rewrite_factorials(expr: &str) -> Result<String> {
    let mut chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    let mut chain = 0usize;
    let mut last_end = None;

    while i < chars.len() {
        if chars[i] != FACTORIAL {
            i += 1;
            continue;
        }

        chain = if last_end == Some(i) { chain + 1 } else { 1 };
        if chain > MAX_NESTING {
            return Err(CalcError::NestingTooDeep { limit: MAX_NESTING });
        }

        let span = term_span_before(&chars, i);
        let replacement: Vec<char> = "factorial("
            .chars()
            .chain(chars[span.start..span.end].iter().copied())
            .chain(std::iter::once(')'))
            .collect();
        let next = span.start + replacement.len();
        chars.splice(span.start..=i, replacement);

        i = next;
        last_end = Some(next);
    }

    Ok(chars.into_iter().collect())
}

/// Rewrite all symbolic operators: roots first, then factorials.
pub fn rewrite_operators(expr: &str) -> Result<String> {
    let rooted = rewrite_roots(expr)?;
    rewrite_factorials(&rooted)
}
