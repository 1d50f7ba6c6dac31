//! Keypad
//!
//! Maps key labels to [`Key`] values and dispatches them onto a
//! [`CalculatorState`]. Memory keys that read the display (`MS`, `M+`, `M-`)
//! do nothing while the calculator shows an error.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::operation::Operation;
use crate::state::CalculatorState;

/// A single keypad button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Digit 0-9
    Digit(u8),
    /// Decimal point
    Decimal,
    /// Binary operator
    Operator(Operation),
    /// Equals
    Equals,
    /// Clear everything except memory
    Clear,
    /// Clear the current entry
    ClearEntry,
    /// Toggle sign
    ToggleSign,
    /// Delete the last typed character
    Backspace,
    /// MC
    MemoryClear,
    /// MR
    MemoryRecall,
    /// MS
    MemoryStore,
    /// M+
    MemoryAdd,
    /// M-
    MemorySubtract,
}

/// A key label that does not name any key
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Unknown key: {0:?}")]
pub struct KeyParseError(pub String);

impl Key {
    /// Parse a key label
    ///
    /// Labels are case-sensitive except for the named keys (`Enter`,
    /// `Escape`, `Backspace`, `neg`), which also accept lowercase.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if let Some(op) = Operation::from_symbol(symbol) {
            return Some(Self::Operator(op));
        }

        let mut chars = symbol.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(d) = c.to_digit(10) {
                return u8::try_from(d).ok().map(Self::Digit);
            }
        }

        match symbol {
            "." | "," => Some(Self::Decimal),
            "=" | "Enter" | "enter" => Some(Self::Equals),
            "C" | "Escape" | "escape" | "Esc" => Some(Self::Clear),
            "CE" => Some(Self::ClearEntry),
            "±" | "+/-" | "neg" | "Neg" => Some(Self::ToggleSign),
            "⌫" | "<" | "Backspace" | "backspace" => Some(Self::Backspace),
            "MC" => Some(Self::MemoryClear),
            "MR" => Some(Self::MemoryRecall),
            "MS" => Some(Self::MemoryStore),
            "M+" => Some(Self::MemoryAdd),
            "M-" | "M−" => Some(Self::MemorySubtract),
            _ => None,
        }
    }

    /// Canonical label for this key
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Decimal => ".".to_string(),
            Self::Operator(op) => op.symbol().to_string(),
            Self::Equals => "=".to_string(),
            Self::Clear => "C".to_string(),
            Self::ClearEntry => "CE".to_string(),
            Self::ToggleSign => "±".to_string(),
            Self::Backspace => "⌫".to_string(),
            Self::MemoryClear => "MC".to_string(),
            Self::MemoryRecall => "MR".to_string(),
            Self::MemoryStore => "MS".to_string(),
            Self::MemoryAdd => "M+".to_string(),
            Self::MemorySubtract => "M-".to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s.trim()).ok_or_else(|| KeyParseError(s.to_string()))
    }
}

impl CalculatorState {
    /// Apply a keypad button
    pub fn press(&mut self, key: Key) {
        tracing::trace!(key = %key, "Key pressed");

        match key {
            Key::Digit(d) => self.input_digit(d),
            Key::Decimal => self.input_decimal(),
            Key::Operator(op) => self.set_operation(op),
            Key::Equals => self.calculate(),
            Key::Clear => self.clear(),
            Key::ClearEntry => self.clear_entry(),
            Key::ToggleSign => self.toggle_sign(),
            Key::Backspace => self.backspace(),
            Key::MemoryClear => self.memory_clear(),
            Key::MemoryRecall => {
                let value = self.memory_recall();
                self.load_value(value);
            }
            Key::MemoryStore => {
                if let Some(value) = self.current_value() {
                    self.memory_store(value);
                }
            }
            Key::MemoryAdd => {
                if let Some(value) = self.current_value() {
                    self.memory_add(value);
                }
            }
            Key::MemorySubtract => {
                if let Some(value) = self.current_value() {
                    self.memory_subtract(value);
                }
            }
        }
    }

    /// Apply a sequence of keys in order
    pub fn press_all<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = Key>,
    {
        for key in keys {
            self.press(key);
        }
    }
}

/// Split a line of key labels on whitespace and parse each one
///
/// # Errors
///
/// Returns the first label that is not a key.
pub fn parse_keys(line: &str) -> Result<Vec<Key>, KeyParseError> {
    line.split_whitespace().map(str::parse).collect()
}
