//! Keystroke validation.
//!
//! Decides, for each candidate token typed on the keypad, whether it is appended
//! as-is, appended with an implicit `*`, replaces the trailing operator, or is
//! silently ignored.

use lazy_static::lazy_static;
use regex::Regex;

use super::registry::{
    self, FACTORIAL, MOD_KEYWORD, is_binary_operator, is_strict_binary_operator,
    trailing_constant,
};

lazy_static! {
    /// The numeric literal currently being typed at the end of the expression.
    static ref TRAILING_NUMBER: Regex = Regex::new(r"[\d.]+$").unwrap();
}

/// One insertion unit produced by a keypad button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Digit(char),
    Operator(char),
    OpenParen,
    CloseParen,
    Decimal,
    /// A function opener such as `sin(`.
    Function(&'a str),
    Constant(&'a str),
    Mod,
    RootPrefix(char),
    Factorial,
    /// Anything outside the vocabulary; appended literally.
    Other(&'a str),
}

impl<'a> Token<'a> {
    /// Classify a raw keypad token.
    pub fn classify(input: &'a str) -> Self {
        let mut chars = input.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                '0'..='9' => Self::Digit(c),
                '(' => Self::OpenParen,
                ')' => Self::CloseParen,
                '.' => Self::Decimal,
                FACTORIAL => Self::Factorial,
                c if is_binary_operator(c) => Self::Operator(c),
                c if registry::is_root_marker(c) => Self::RootPrefix(c),
                _ if registry::CONSTANTS.contains(&input) => Self::Constant(input),
                _ => Self::Other(input),
            };
        }

        if input == MOD_KEYWORD {
            Self::Mod
        } else if registry::is_function_opener(input) {
            Self::Function(input)
        } else if registry::CONSTANTS.contains(&input) {
            Self::Constant(input)
        } else {
            Self::Other(input)
        }
    }
}

/// Result of validating a keystroke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Append the text to the expression.
    Append(String),
    /// Remove `count` trailing characters, then append the text.
    ReplaceTrailing { count: usize, text: String },
    /// Ignore the keystroke.
    Reject,
}

impl Outcome {
    /// Apply the outcome to an expression.
    ///
    /// Returns `false` when the keystroke was rejected and the expression is unchanged.
    pub fn apply(&self, expr: &mut String) -> bool {
        match self {
            Self::Append(text) => {
                expr.push_str(text);
                true
            }
            Self::ReplaceTrailing { count, text } => {
                for _ in 0..*count {
                    expr.pop();
                }
                expr.push_str(text);
                true
            }
            Self::Reject => false,
        }
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject)
    }
}

fn implicit_mul(input: &str) -> Outcome {
    Outcome::Append(format!("*{}", input))
}

/// Validate `input` against the current expression.
///
/// Never fails: keystrokes that would produce an invalid expression yield
/// [`Outcome::Reject`].
pub fn sanitize_input(expr: &str, input: &str) -> Outcome {
    let token = Token::classify(input);
    let last = expr.chars().last();
    let ends_with_constant = trailing_constant(expr).is_some();

    let last_is_digit = last.is_some_and(|c| c.is_ascii_digit());
    let last_is_operator = last.is_some_and(is_binary_operator);

    // Postfix factorial: only after something it can bind to.
    if token == Token::Factorial {
        if expr.is_empty() {
            return Outcome::Reject;
        }
        if last_is_digit || last == Some(')') || last == Some(FACTORIAL) || ends_with_constant {
            return Outcome::Append(input.to_string());
        }
        return Outcome::Reject;
    }

    // Strict binary operators and `mod` cannot start an expression.
    if expr.is_empty() {
        match token {
            Token::Operator(op) if is_strict_binary_operator(op) => return Outcome::Reject,
            Token::Mod => return Outcome::Reject,
            _ => {}
        }
    }

    // One decimal point per number.
    if token == Token::Decimal
        && let Some(number) = TRAILING_NUMBER.find(expr)
        && number.as_str().contains('.')
    {
        return Outcome::Reject;
    }

    if token == Token::CloseParen {
        let open = expr.chars().filter(|&c| c == '(').count();
        let close = expr.chars().filter(|&c| c == ')').count();
        if close >= open {
            return Outcome::Reject;
        }
        // No empty parentheses.
        if last == Some('(') {
            return Outcome::Reject;
        }
        // No operator right before `)`.
        if last_is_operator {
            return Outcome::Reject;
        }
    }

    if let Token::Operator(op) = token {
        if let Some(prev) = last
            && is_binary_operator(prev)
        {
            // Unary minus after an operator without a unary form.
            if op == '-' && is_strict_binary_operator(prev) {
                return Outcome::Append(input.to_string());
            }

            // Operator followed by unary minus: the user has to backspace explicitly.
            let mut tail = expr.chars().rev();
            if let (Some('-'), Some(before)) = (tail.next(), tail.next())
                && is_strict_binary_operator(before)
            {
                return Outcome::Reject;
            }

            return Outcome::ReplaceTrailing {
                count: 1,
                text: input.to_string(),
            };
        }

        if is_strict_binary_operator(op) && last == Some('(') {
            return Outcome::Reject;
        }
    }

    if token == Token::OpenParen
        && (last_is_digit || last == Some(')') || last == Some(FACTORIAL) || ends_with_constant)
    {
        return implicit_mul(input);
    }

    let is_callable = matches!(token, Token::Function(_) | Token::RootPrefix(_));
    let is_constant = matches!(token, Token::Constant(_));

    if last == Some(')') || last == Some(FACTORIAL) {
        if matches!(token, Token::Digit(_)) || is_constant || is_callable {
            return implicit_mul(input);
        }
    }

    if is_callable && (last_is_digit || ends_with_constant) {
        return implicit_mul(input);
    }

    if is_constant && (last_is_digit || ends_with_constant) {
        return implicit_mul(input);
    }

    Outcome::Append(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(s: &str) -> Outcome {
        Outcome::Append(s.to_string())
    }

    #[test]
    fn test_classify() {
        assert_eq!(Token::classify("7"), Token::Digit('7'));
        assert_eq!(Token::classify("-"), Token::Operator('-'));
        assert_eq!(Token::classify(" mod "), Token::Mod);
        assert_eq!(Token::classify("log10("), Token::Function("log10("));
        assert_eq!(Token::classify("pi"), Token::Constant("pi"));
        assert_eq!(Token::classify("e"), Token::Constant("e"));
        assert_eq!(Token::classify("√"), Token::RootPrefix('√'));
        assert_eq!(Token::classify("!"), Token::Factorial);
        assert_eq!(Token::classify("foo("), Token::Other("foo("));
    }

    #[test]
    fn test_implicit_mul_before_paren() {
        assert_eq!(sanitize_input("7", "("), append("*("));
        assert_eq!(sanitize_input("(3+2)", "("), append("*("));
        assert_eq!(sanitize_input("pi", "("), append("*("));
        assert_eq!(sanitize_input("5!", "("), append("*("));
        assert_eq!(sanitize_input("3+", "("), append("("));
        assert_eq!(sanitize_input("", "("), append("("));
    }

    #[test]
    fn test_implicit_mul_after_close_paren() {
        assert_eq!(sanitize_input("(3+2)", "7"), append("*7"));
        assert_eq!(sanitize_input("(3+2)", "pi"), append("*pi"));
        assert_eq!(sanitize_input("(3+2)", "sin("), append("*sin("));
        assert_eq!(sanitize_input("(3+2)", "√"), append("*√"));
        assert_eq!(sanitize_input("4!", "2"), append("*2"));
    }

    #[test]
    fn test_consecutive_operators_replace() {
        let replace = |s: &str| Outcome::ReplaceTrailing {
            count: 1,
            text: s.to_string(),
        };
        assert_eq!(sanitize_input("3+", "*"), replace("*"));
        assert_eq!(sanitize_input("3*", "/"), replace("/"));
        assert_eq!(sanitize_input("3+", "+"), replace("+"));
        assert_eq!(sanitize_input("3-", "+"), replace("+"));
    }

    #[test]
    fn test_unary_minus_after_strict_operator() {
        assert_eq!(sanitize_input("3*", "-"), append("-"));
        assert_eq!(sanitize_input("3/", "-"), append("-"));
        assert_eq!(sanitize_input("3^", "-"), append("-"));
        assert_eq!(sanitize_input("3%", "-"), append("-"));
    }

    #[test]
    fn test_operator_after_unary_minus_rejected() {
        assert_eq!(sanitize_input("3*-", "*"), Outcome::Reject);
        assert_eq!(sanitize_input("3*-", "+"), Outcome::Reject);
        assert_eq!(sanitize_input("3*-", "-"), Outcome::Reject);
    }

    #[test]
    fn test_leading_operators() {
        assert_eq!(sanitize_input("", "*"), Outcome::Reject);
        assert_eq!(sanitize_input("", "/"), Outcome::Reject);
        assert_eq!(sanitize_input("", "^"), Outcome::Reject);
        assert_eq!(sanitize_input("", "%"), Outcome::Reject);
        assert_eq!(sanitize_input("", " mod "), Outcome::Reject);
        assert_eq!(sanitize_input("", "-"), append("-"));
        assert_eq!(sanitize_input("", "+"), append("+"));
        assert_eq!(sanitize_input("(", "*"), Outcome::Reject);
        assert_eq!(sanitize_input("(", "-"), append("-"));
        assert_eq!(sanitize_input("7", " mod "), append(" mod "));
    }

    #[test]
    fn test_close_paren_rules() {
        assert_eq!(sanitize_input("(3+2)", ")"), Outcome::Reject);
        assert_eq!(sanitize_input("3", ")"), Outcome::Reject);
        assert_eq!(sanitize_input("(3+", ")"), Outcome::Reject);
        assert_eq!(sanitize_input("(", ")"), Outcome::Reject);
        assert_eq!(sanitize_input("((3+2)", ")"), append(")"));
        assert_eq!(sanitize_input("sin(30", ")"), append(")"));
    }

    #[test]
    fn test_duplicate_decimal() {
        assert_eq!(sanitize_input("3.14", "."), Outcome::Reject);
        assert_eq!(sanitize_input("3.1+2", "."), append("."));
        assert_eq!(sanitize_input("3", "."), append("."));
        assert_eq!(sanitize_input("", "."), append("."));
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(sanitize_input("2", "sin("), append("*sin("));
        assert_eq!(sanitize_input("pi", "cos("), append("*cos("));
        assert_eq!(sanitize_input("2", "√"), append("*√"));
        assert_eq!(sanitize_input("3!", "∛"), append("*∛"));
        assert_eq!(sanitize_input("3+", "sin("), append("sin("));
        assert_eq!(sanitize_input("2", "pi"), append("*pi"));
        assert_eq!(sanitize_input("pi", "e"), append("*e"));
        assert_eq!(sanitize_input("e", "pi"), append("*pi"));
        assert_eq!(sanitize_input("3+", "pi"), append("pi"));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(sanitize_input("", "!"), Outcome::Reject);
        assert_eq!(sanitize_input("5", "!"), append("!"));
        assert_eq!(sanitize_input("(3+2)", "!"), append("!"));
        assert_eq!(sanitize_input("pi", "!"), append("!"));
        assert_eq!(sanitize_input("5!", "!"), append("!"));
        assert_eq!(sanitize_input("5+", "!"), Outcome::Reject);
        assert_eq!(sanitize_input("(", "!"), Outcome::Reject);
    }

    #[test]
    fn test_default_accepts() {
        assert_eq!(sanitize_input("12", "3"), append("3"));
        assert_eq!(sanitize_input("12", "+"), append("+"));
        assert_eq!(sanitize_input("", "sin("), append("sin("));
    }

    #[test]
    fn test_apply() {
        let mut expr = String::from("3+");
        assert!(sanitize_input(&expr, "*").apply(&mut expr));
        assert_eq!(expr, "3*");
        assert!(sanitize_input(&expr, "-").apply(&mut expr));
        assert_eq!(expr, "3*-");
        assert!(!sanitize_input(&expr, "/").apply(&mut expr));
        assert_eq!(expr, "3*-");
    }
}
