//! Shared calculator handle
//!
//! One coarse lock around the whole state: every operation reads and writes
//! the display, the pending operation and memory together.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::keypad::Key;
use crate::state::CalculatorState;

/// Cloneable, thread-safe handle to a single [`CalculatorState`]
#[derive(Clone, Debug, Default)]
pub struct SharedCalculator {
    inner: Arc<Mutex<CalculatorState>>,
}

impl SharedCalculator {
    /// Wrap a calculator
    #[must_use]
    pub fn new(state: CalculatorState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Run `f` with exclusive access to the calculator
    pub fn with<R>(&self, f: impl FnOnce(&mut CalculatorState) -> R) -> R {
        let mut state = self.inner.lock();
        f(&mut state)
    }

    /// Press a key
    pub fn press(&self, key: Key) {
        self.inner.lock().press(key);
    }

    /// Copy of the current display
    #[must_use]
    pub fn display_value(&self) -> String {
        self.inner.lock().display_value().to_string()
    }

    /// Copy of the whole state
    #[must_use]
    pub fn snapshot(&self) -> CalculatorState {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let calc = SharedCalculator::default();
        let other = calc.clone();
        other.press(Key::Digit(7));
        assert_eq!(calc.display_value(), "7");
    }

    #[test]
    fn test_concurrent_memory_adds() {
        let calc = SharedCalculator::default();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let calc = calc.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        calc.with(|state| state.memory_add(1.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(calc.with(|state| state.memory_recall()), 800.0);
    }

    #[test]
    fn test_with_sequence_is_atomic() {
        let calc = SharedCalculator::default();
        let result = calc.with(|state| {
            state.load_value(6.0);
            state.set_operation(Operation::Multiply);
            state.load_value(7.0);
            state.calculate();
            state.display_value().to_string()
        });
        assert_eq!(result, "42");
        assert_eq!(calc.snapshot().display_value(), "42");
    }
}
