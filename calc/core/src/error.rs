//! Calculator Errors
//!
//! Arithmetic failures never escape the state machine. They are captured and
//! shown on the display as an error marker until the user clears it. The
//! `Display` text of [`CalculatorError`] is what follows the marker prefix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shown on the display while the calculator is in the error state
pub const ERROR_MARKER: &str = "Error";

/// Arithmetic errors captured by the state machine
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculatorError {
    /// Division with a zero right-hand operand
    #[error("Division by zero")]
    DivideByZero,

    /// Result is too large to represent
    #[error("Overflow")]
    Overflow,

    /// Result is not a number
    #[error("Invalid operation")]
    InvalidOperation,
}

impl CalculatorError {
    /// Classify a non-finite result, if it is one
    #[must_use]
    pub fn from_result(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(Self::InvalidOperation)
        } else if value.is_infinite() {
            Some(Self::Overflow)
        } else {
            None
        }
    }

    /// Text shown on the display for this error
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{ERROR_MARKER}: {self}")
    }
}
