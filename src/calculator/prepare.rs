//! Text-level preparation of a rewritten expression before evaluation.
//!
//! Handles display glyphs, percent and `mod`, and degree-mode trigonometry.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::AngleMode;
use crate::error::{CalcError, Result};
use crate::input::MAX_NESTING;

lazy_static! {
    /// A number followed by `%`, optionally followed by an operand.
    static ref PERCENT: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*%(\s*[\d.(a-zA-Z√∛])?").unwrap();

    /// The `mod` keyword between operands.
    static ref MOD_KEYWORD: Regex = Regex::new(r"\s*\bmod\b\s*").unwrap();

    /// A trigonometric call whose argument or result depends on the angle mode.
    static ref TRIG_CALL: Regex =
        Regex::new(r"\b(asin|acos|atan|acot|sin|cos|tan|cot)\(").unwrap();
}

/// Replace display glyphs with their ASCII operators.
pub fn normalize_symbols(expr: &str) -> String {
    expr.replace('×', "*").replace('÷', "/").replace('−', "-")
}

/// Turn percentages into divisions and the `mod` keyword into `%`.
///
/// `50%` becomes `(50/100)`. A `%` directly followed by an operand is a
/// remainder and is left alone.
pub fn rewrite_percent_and_mod(expr: &str) -> String {
    let percent = PERCENT.replace_all(expr, |caps: &Captures| {
        if caps.get(2).is_some() {
            caps[0].to_string()
        } else {
            format!("({}/100)", &caps[1])
        }
    });
    MOD_KEYWORD.replace_all(&percent, "%").into_owned()
}

/// Apply the angle mode to trigonometric calls.
///
/// In degree mode the argument of `sin cos tan cot` is converted to radians and
/// the result of `asin acos atan acot` is converted to degrees. Radian mode
/// leaves the expression unchanged.
pub fn apply_angle_mode(expr: &str, mode: AngleMode) -> Result<String> {
    match mode {
        AngleMode::Rad => Ok(expr.to_string()),
        AngleMode::Deg => degrees_to_radians(expr, 0),
    }
}

/// Byte index of the `)` closing the group whose contents start at `start`.
fn group_end(expr: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in expr.bytes().enumerate().skip(start) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn degrees_to_radians(expr: &str, depth: usize) -> Result<String> {
    if depth > MAX_NESTING {
        return Err(CalcError::NestingTooDeep { limit: MAX_NESTING });
    }

    let mut out = String::with_capacity(expr.len() + 32);
    let mut rest = expr;

    while let Some(caps) = TRIG_CALL.captures(rest) {
        let Some(call) = caps.get(0) else { break };
        let name = &caps[1];
        let arg_start = call.end();
        let (arg, after, closed) = match group_end(rest, arg_start) {
            Some(end) => (&rest[arg_start..end], &rest[end + 1..], true),
            None => (&rest[arg_start..], "", false),
        };
        let arg = degrees_to_radians(arg, depth + 1)?;

        out.push_str(&rest[..call.start()]);
        if name.starts_with('a') {
            out.push_str(&format!("((180/pi)*{}({}", name, arg));
            if closed {
                out.push_str("))");
            }
        } else {
            out.push_str(&format!("{}(pi/180*({})", name, arg));
            if closed {
                out.push(')');
            }
        }
        rest = after;
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbols() {
        assert_eq!(normalize_symbols("6×2÷3−1"), "6*2/3-1");
    }

    #[test]
    fn test_percent() {
        assert_eq!(rewrite_percent_and_mod("50%"), "(50/100)");
        assert_eq!(rewrite_percent_and_mod("200*15%"), "200*(15/100)");
        assert_eq!(rewrite_percent_and_mod("12.5%+1"), "(12.5/100)+1");
    }

    #[test]
    fn test_remainder_kept() {
        assert_eq!(rewrite_percent_and_mod("17%5"), "17%5");
        assert_eq!(rewrite_percent_and_mod("17%(2+3)"), "17%(2+3)");
    }

    #[test]
    fn test_mod_keyword() {
        assert_eq!(rewrite_percent_and_mod("17 mod 5"), "17%5");
    }

    #[test]
    fn test_radians_untouched() {
        assert_eq!(apply_angle_mode("sin(1)", AngleMode::Rad).unwrap(), "sin(1)");
    }

    #[test]
    fn test_degrees_forward_trig() {
        assert_eq!(
            apply_angle_mode("sin(30)", AngleMode::Deg).unwrap(),
            "sin(pi/180*(30))"
        );
        assert_eq!(
            apply_angle_mode("2*cos(30+30)+1", AngleMode::Deg).unwrap(),
            "2*cos(pi/180*(30+30))+1"
        );
    }

    #[test]
    fn test_degrees_inverse_trig() {
        assert_eq!(
            apply_angle_mode("asin(1)", AngleMode::Deg).unwrap(),
            "((180/pi)*asin(1))"
        );
        assert_eq!(
            apply_angle_mode("2^atan(1)", AngleMode::Deg).unwrap(),
            "2^((180/pi)*atan(1))"
        );
    }

    #[test]
    fn test_degrees_nested_and_hyperbolic() {
        assert_eq!(
            apply_angle_mode("sin(asin(0.5))", AngleMode::Deg).unwrap(),
            "sin(pi/180*(((180/pi)*asin(0.5))))"
        );
        assert_eq!(apply_angle_mode("sinh(1)", AngleMode::Deg).unwrap(), "sinh(1)");
    }

    #[test]
    fn test_degrees_unterminated() {
        assert_eq!(
            apply_angle_mode("sin(30", AngleMode::Deg).unwrap(),
            "sin(pi/180*(30)"
        );
    }
}
