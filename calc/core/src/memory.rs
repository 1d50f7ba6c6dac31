//! Memory Register
//!
//! A single scalar slot owned by the calculator state. Arithmetic entry never
//! touches it, and clearing the calculator leaves it alone.

use serde::{Deserialize, Serialize};

/// Independent memory slot, initialized to zero
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRegister {
    value: f64,
}

impl MemoryRegister {
    /// Create an empty register
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored value
    pub fn store(&mut self, value: f64) {
        self.value = value;
    }

    /// Read the stored value
    #[must_use]
    pub fn recall(&self) -> f64 {
        self.value
    }

    /// Reset to zero
    pub fn clear(&mut self) {
        self.value = 0.0;
    }

    /// Add to the stored value
    pub fn add(&mut self, value: f64) {
        self.value += value;
    }

    /// Subtract from the stored value
    pub fn subtract(&mut self, value: f64) {
        self.value -= value;
    }

    /// Whether the register holds something other than zero
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value != 0.0
    }
}
