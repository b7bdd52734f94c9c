//! Keypad session state.
//!
//! Holds the expression being typed, the last result or error, the memory
//! register and the history, and applies keypad actions to them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::calculator::{CalcResult, Evaluator, MevalEvaluator, evaluate_expression, format_result};
use crate::config::AngleMode;
use crate::history::{History, HistoryEntry};
use crate::input::sanitize_input;

lazy_static! {
    /// The trailing number, or a single trailing operator or parenthesis.
    static ref LAST_ENTRY: Regex = Regex::new(r"[\d.]+$|[+\-*/^%()]$").unwrap();
}

pub struct Keypad {
    expression: String,
    result: String,
    error: Option<String>,
    memory: f64,
    angle_mode: AngleMode,
    history: History,
    evaluator: Box<dyn Evaluator>,
}

impl Keypad {
    pub fn new(angle_mode: AngleMode, history: History) -> Self {
        Self::with_evaluator(angle_mode, history, Box::new(MevalEvaluator))
    }

    pub fn with_evaluator(
        angle_mode: AngleMode,
        history: History,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        Self {
            expression: String::new(),
            result: String::new(),
            error: None,
            memory: 0.0,
            angle_mode,
            history,
            evaluator,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Formatted result of the last successful evaluation.
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    /// Type a token. Returns `false` if the keystroke was rejected.
    pub fn input(&mut self, token: &str) -> bool {
        let outcome = sanitize_input(&self.expression, token);
        if outcome.is_reject() {
            tracing::trace!(expression = %self.expression, token, "keystroke rejected");
            return false;
        }
        outcome.apply(&mut self.expression);
        self.error = None;
        true
    }

    pub fn backspace(&mut self) {
        self.expression.pop();
        self.error = None;
    }

    /// Clear the expression, result and error.
    pub fn clear(&mut self) {
        self.expression.clear();
        self.result.clear();
        self.error = None;
    }

    /// Remove the last number, or the last operator or parenthesis.
    pub fn clear_entry(&mut self) {
        let Some(start) = LAST_ENTRY.find(&self.expression).map(|m| m.start()) else {
            return;
        };
        self.expression.truncate(start);
        self.error = None;
    }

    /// Evaluate the expression.
    ///
    /// Blank expressions are ignored. A successful evaluation is recorded in the
    /// history; a failure replaces the result with an error message. Returns
    /// whether a result was produced.
    pub fn evaluate(&mut self) -> bool {
        if self.expression.trim().is_empty() {
            return false;
        }

        match evaluate_expression(&self.expression, self.angle_mode, self.evaluator.as_ref()) {
            Ok(CalcResult::Success { plain_result, .. }) => {
                self.history
                    .push(HistoryEntry::new(self.expression.clone(), plain_result.clone()));
                self.result = plain_result;
                self.error = None;
                return true;
            }
            Ok(CalcResult::Error { message, .. }) => {
                self.result.clear();
                self.error = Some(message);
            }
            Err(e) => {
                self.result.clear();
                self.error = Some(e.to_string());
            }
        }
        false
    }

    /// Current result as a number, zero when there is none.
    fn result_value(&self) -> f64 {
        self.result.parse().unwrap_or(0.0)
    }

    pub fn memory_add(&mut self) {
        self.memory += self.result_value();
    }

    pub fn memory_subtract(&mut self) {
        self.memory -= self.result_value();
    }

    /// Type the memory value into the expression.
    pub fn memory_recall(&mut self) -> bool {
        let value = format_result(self.memory);
        self.input(&value)
    }

    pub fn memory_clear(&mut self) {
        self.memory = 0.0;
    }

    pub fn toggle_angle_mode(&mut self) {
        self.angle_mode = self.angle_mode.toggled();
    }

    /// Load an entry from the history.
    pub fn restore(&mut self, entry: &HistoryEntry) {
        self.expression = entry.expression.clone();
        self.result = entry.result.clone();
        self.error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypad() -> Keypad {
        Keypad::new(AngleMode::Deg, History::new(10))
    }

    fn type_all(keypad: &mut Keypad, tokens: &[&str]) {
        for token in tokens {
            keypad.input(token);
        }
    }

    #[test]
    fn test_typing_and_evaluating() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["7", "(", "2", "+", "3", ")"]);
        assert_eq!(keypad.expression(), "7*(2+3)");

        assert!(keypad.evaluate());
        assert_eq!(keypad.result(), "35");
        assert_eq!(keypad.error(), None);
        assert_eq!(keypad.history().len(), 1);
        assert_eq!(keypad.history().latest().unwrap().expression, "7*(2+3)");
    }

    #[test]
    fn test_rejected_keystrokes_are_ignored() {
        let mut keypad = keypad();
        assert!(!keypad.input("*"));
        assert!(!keypad.input(")"));
        assert!(keypad.input("2"));
        assert!(keypad.input("."));
        assert!(!keypad.input("."));
        assert_eq!(keypad.expression(), "2.");
    }

    #[test]
    fn test_operator_replacement() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["5", "+", "*"]);
        assert_eq!(keypad.expression(), "5*");
    }

    #[test]
    fn test_backspace_and_clear_entry() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["1", "2", "+", "3", "4"]);
        keypad.backspace();
        assert_eq!(keypad.expression(), "12+3");

        keypad.clear_entry();
        assert_eq!(keypad.expression(), "12+");
        keypad.clear_entry();
        assert_eq!(keypad.expression(), "12");
        keypad.clear_entry();
        assert_eq!(keypad.expression(), "");
    }

    #[test]
    fn test_evaluation_errors() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["1", "/", "0"]);
        assert!(!keypad.evaluate());
        assert_eq!(keypad.error(), Some("Infinity"));
        assert_eq!(keypad.result(), "");
        assert!(keypad.history().is_empty());

        // Any new keystroke clears the error.
        keypad.input("1");
        assert_eq!(keypad.error(), None);
    }

    #[test]
    fn test_blank_evaluation_is_ignored() {
        let mut keypad = keypad();
        keypad.evaluate();
        assert_eq!(keypad.error(), None);
        assert!(keypad.history().is_empty());
    }

    #[test]
    fn test_memory() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["6", "*", "7"]);
        keypad.evaluate();
        keypad.memory_add();
        keypad.memory_add();
        assert_eq!(keypad.memory(), 84.0);

        keypad.memory_subtract();
        assert_eq!(keypad.memory(), 42.0);

        keypad.clear();
        assert!(keypad.memory_recall());
        assert_eq!(keypad.expression(), "42");

        keypad.memory_clear();
        assert_eq!(keypad.memory(), 0.0);
    }

    #[test]
    fn test_angle_mode_toggle() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["cos(", "pi", ")"]);
        keypad.toggle_angle_mode();
        assert_eq!(keypad.angle_mode(), AngleMode::Rad);
        keypad.evaluate();
        assert_eq!(keypad.result(), "-1");
    }

    #[test]
    fn test_restore_from_history() {
        let mut keypad = keypad();
        type_all(&mut keypad, &["2", "^", "1", "0"]);
        keypad.evaluate();
        keypad.clear();

        let entry = keypad.history().latest().cloned().unwrap();
        keypad.restore(&entry);
        assert_eq!(keypad.expression(), "2^10");
        assert_eq!(keypad.result(), "1024");
    }
}
