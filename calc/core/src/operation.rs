//! Binary Operations
//!
//! The four operators a calculator chain can hold. Symbols and names follow
//! what the keypad labels and the LLM tool schema use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CalculatorError;

/// An arithmetic operator awaiting its right-hand operand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Addition
    Add,
    /// Subtraction
    Subtract,
    /// Multiplication
    Multiply,
    /// Division
    Divide,
}

/// Unknown operator symbol or name
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl Operation {
    /// All operations, in keypad order
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Apply the operation to two operands
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::DivideByZero`] for a zero divisor, and
    /// `Overflow`/`InvalidOperation` when the result is not finite.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, CalculatorError> {
        let result = match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide => {
                if rhs == 0.0 {
                    return Err(CalculatorError::DivideByZero);
                }
                lhs / rhs
            }
        };

        match CalculatorError::from_result(result) {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    /// Keypad symbol for this operation
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "/",
        }
    }

    /// Name used in the LLM tool schema
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Parse a keypad or chat symbol
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" | "−" => Some(Self::Subtract),
            "*" | "×" | "x" | "X" => Some(Self::Multiply),
            "/" | "÷" => Some(Self::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(op) = Self::from_symbol(s) {
            return Ok(op);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
