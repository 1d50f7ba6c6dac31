//! Calculator State Machine
//!
//! Accumulates keypad input into a display buffer and commits binary
//! operations left to right, with no operator precedence.
//!
//! # States
//!
//! ```text
//!              digit / "."                    digit / "."
//!   ┌────────┐ ─────────────► ┌──────────┐ ◄──────────┐
//!   │ Fresh  │                │ Entering │ ───────────┘
//!   └────────┘ ◄───────────── └──────────┘
//!       │  ▲    operator / "="      │
//!       │  │                        │
//!       │  └──── clear / CE ────┐   │ divide by zero,
//!       │                       │   │ non-finite result
//!       ▼                       │   ▼
//!   ┌────────────────────────────────────┐
//!   │               Error                │
//!   └────────────────────────────────────┘
//! ```
//!
//! In `Fresh` the display holds a result, a captured operand, or "0", and the
//! next digit replaces it. In `Entering` digits append. `Error` ignores all
//! numeric input until [`CalculatorState::clear`] or
//! [`CalculatorState::clear_entry`].

use serde::{Deserialize, Serialize};

use crate::error::CalculatorError;
use crate::memory::MemoryRegister;
use crate::number::{digit_count, format_number, parse_display, DEFAULT_MAX_DIGITS, MAX_DIGITS_LIMIT};
use crate::operation::Operation;

/// Whether the next digit starts a new number or extends the current one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMode {
    /// Next digit replaces the display
    Fresh,
    /// Next digit appends to the display
    Entering,
    /// Input is blocked until cleared
    Error(CalculatorError),
}

/// The calculator: display buffer, pending operation and memory register
#[derive(Clone, Debug)]
pub struct CalculatorState {
    /// What the user sees; a numeric literal or an error marker
    display: String,
    /// Left-hand operand captured when an operator was selected
    pending_operand: Option<f64>,
    /// Operator waiting for its right-hand operand
    pending_operation: Option<Operation>,
    /// Fresh / Entering / Error
    mode: EntryMode,
    /// An operator was selected and nothing has been entered since
    awaiting_operand: bool,
    /// Independent memory slot
    memory: MemoryRegister,
    /// Cap on typed significant digits
    max_digits: usize,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorState {
    /// Create a calculator showing "0" with an empty memory register
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_digits(DEFAULT_MAX_DIGITS)
    }

    /// Create a calculator with a custom typed-digit cap
    ///
    /// The cap is clamped to `1..=17`.
    #[must_use]
    pub fn with_max_digits(max_digits: usize) -> Self {
        Self {
            display: "0".to_string(),
            pending_operand: None,
            pending_operation: None,
            mode: EntryMode::Fresh,
            awaiting_operand: false,
            memory: MemoryRegister::new(),
            max_digits: max_digits.clamp(1, MAX_DIGITS_LIMIT),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current display string
    #[must_use]
    pub fn display_value(&self) -> &str {
        &self.display
    }

    /// Numeric value of the display, `None` in the error state
    #[must_use]
    pub fn current_value(&self) -> Option<f64> {
        if self.is_error() {
            return None;
        }
        parse_display(&self.display)
    }

    /// Left-hand operand of the pending operation
    #[must_use]
    pub fn pending_operand(&self) -> Option<f64> {
        self.pending_operand
    }

    /// Operator waiting for a right-hand operand
    #[must_use]
    pub fn pending_operation(&self) -> Option<Operation> {
        self.pending_operation
    }

    /// Current entry mode
    #[must_use]
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// The captured error, if the calculator is in the error state
    #[must_use]
    pub fn error(&self) -> Option<CalculatorError> {
        match self.mode {
            EntryMode::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether input is blocked by an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.mode, EntryMode::Error(_))
    }

    /// Cap on typed significant digits
    #[must_use]
    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    /// The memory register
    #[must_use]
    pub fn memory(&self) -> &MemoryRegister {
        &self.memory
    }

    // =========================================================================
    // Entry
    // =========================================================================

    /// Enter a digit (0-9); larger values are ignored
    pub fn input_digit(&mut self, digit: u8) {
        if self.is_error() || digit > 9 {
            return;
        }
        let digit = char::from(b'0' + digit);

        match self.mode {
            EntryMode::Fresh => {
                self.display = digit.to_string();
            }
            EntryMode::Entering => {
                if self.display == "0" {
                    self.display = digit.to_string();
                } else if digit_count(&self.display) >= self.max_digits {
                    tracing::trace!(max_digits = self.max_digits, "Digit cap reached");
                    return;
                } else {
                    self.display.push(digit);
                }
            }
            EntryMode::Error(_) => return,
        }

        self.mode = EntryMode::Entering;
        self.awaiting_operand = false;
    }

    /// Enter a decimal point; ignored if the number already has one
    pub fn input_decimal(&mut self) {
        match self.mode {
            EntryMode::Error(_) => return,
            EntryMode::Fresh => self.display = "0.".to_string(),
            EntryMode::Entering => {
                if !self.display.contains('.') {
                    self.display.push('.');
                }
            }
        }

        self.mode = EntryMode::Entering;
        self.awaiting_operand = false;
    }

    /// Put a value on the display as the operand being entered
    ///
    /// Used for memory recall and by the chat bridge. The next digit starts a
    /// new number, but an operator after this chains like typed input.
    pub fn load_value(&mut self, value: f64) {
        if self.is_error() {
            return;
        }
        if let Some(err) = CalculatorError::from_result(value) {
            self.enter_error(err);
            return;
        }

        self.display = format_number(value);
        self.mode = EntryMode::Fresh;
        self.awaiting_operand = false;
    }

    /// Flip the sign of the displayed number
    ///
    /// A minus sign is always removable; zero never gains one.
    pub fn toggle_sign(&mut self) {
        if self.is_error() {
            return;
        }

        if let Some(rest) = self.display.strip_prefix('-') {
            self.display = rest.to_string();
        } else if matches!(parse_display(&self.display), Some(value) if value != 0.0) {
            self.display.insert(0, '-');
        }
    }

    /// Remove the last typed character
    ///
    /// A result or captured operand is cleared to "0" instead of edited.
    pub fn backspace(&mut self) {
        match self.mode {
            EntryMode::Error(_) => return,
            EntryMode::Fresh => {
                self.clear_entry();
                return;
            }
            EntryMode::Entering => {}
        }

        self.display.pop();
        if self.display.starts_with('-')
            && !matches!(parse_display(&self.display), Some(value) if value != 0.0)
        {
            self.display.remove(0);
        }
        if self.display.is_empty() {
            self.display = "0".to_string();
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Select an operator
    ///
    /// If an operator is already pending and a number was entered since, the
    /// pending computation is committed first. Pressing operators back to back
    /// only replaces the operator.
    pub fn set_operation(&mut self, operation: Operation) {
        if self.is_error() {
            return;
        }

        if self.pending_operation.is_some() && !self.awaiting_operand {
            tracing::debug!(next = %operation, "Chained operation, committing pending result");
            self.commit();
            if self.is_error() {
                return;
            }
        }

        let Some(value) = parse_display(&self.display) else {
            self.enter_error(CalculatorError::InvalidOperation);
            return;
        };

        self.pending_operand = Some(value);
        self.pending_operation = Some(operation);
        self.mode = EntryMode::Fresh;
        self.awaiting_operand = true;
    }

    /// Apply the pending operation to the captured operand and the display
    ///
    /// Without a pending operation this does nothing.
    pub fn calculate(&mut self) {
        if self.is_error() || self.pending_operation.is_none() {
            return;
        }
        self.commit();
    }

    fn commit(&mut self) {
        let (Some(operation), Some(lhs)) = (self.pending_operation.take(), self.pending_operand.take())
        else {
            return;
        };
        let Some(rhs) = parse_display(&self.display) else {
            self.enter_error(CalculatorError::InvalidOperation);
            return;
        };

        match operation.apply(lhs, rhs) {
            Ok(result) => {
                tracing::debug!(lhs, rhs, operation = %operation, result, "Committed operation");
                self.display = format_number(result);
                self.mode = EntryMode::Fresh;
                self.awaiting_operand = false;
            }
            Err(err) => self.enter_error(err),
        }
    }

    fn enter_error(&mut self, err: CalculatorError) {
        tracing::warn!(error = %err, "Calculator entered error state");
        self.display = err.display_text();
        self.mode = EntryMode::Error(err);
        self.pending_operand = None;
        self.pending_operation = None;
        self.awaiting_operand = false;
    }

    // =========================================================================
    // Clearing
    // =========================================================================

    /// Reset everything except the memory register
    pub fn clear(&mut self) {
        self.display = "0".to_string();
        self.pending_operand = None;
        self.pending_operation = None;
        self.mode = EntryMode::Fresh;
        self.awaiting_operand = false;
    }

    /// Reset only the display, keeping any pending operation
    pub fn clear_entry(&mut self) {
        self.display = "0".to_string();
        self.mode = EntryMode::Fresh;
    }

    // =========================================================================
    // Memory
    // =========================================================================

    /// Overwrite the memory register
    pub fn memory_store(&mut self, value: f64) {
        self.memory.store(value);
    }

    /// Read the memory register
    #[must_use]
    pub fn memory_recall(&self) -> f64 {
        self.memory.recall()
    }

    /// Reset the memory register to zero
    pub fn memory_clear(&mut self) {
        self.memory.clear();
    }

    /// Add to the memory register
    pub fn memory_add(&mut self, value: f64) {
        self.memory.add(value);
    }

    /// Subtract from the memory register
    pub fn memory_subtract(&mut self, value: f64) {
        self.memory.subtract(value);
    }
}
