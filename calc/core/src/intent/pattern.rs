//! Local phrase matching
//!
//! Recognizes a fixed set of English phrases, checked in order:
//!
//! | Phrase                                   | Command        |
//! |------------------------------------------|----------------|
//! | `calculate 125 × 37`                     | `Calculate`    |
//! | `store 42 in memory`                     | `MemoryStore`  |
//! | `recall memory`, `what's in memory`      | `MemoryRecall` |
//! | `clear memory`                           | `MemoryClear`  |
//! | `help`, `what can you do`                | `Help`         |
//!
//! Matching is case-insensitive and may occur anywhere in the message.

use regex::Regex;

use super::{Command, IntentError, IntentExtractor};
use crate::operation::Operation;

const NUMBER: &str = r"-?\d+\.?\d*";

/// Regex-based extractor for typed chat messages
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    calculate: Regex,
    store: Regex,
    recall: Regex,
    clear: Regex,
    help: Regex,
}

impl PatternExtractor {
    /// Compile the phrase patterns
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::Pattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, IntentError> {
        Ok(Self {
            calculate: Regex::new(&format!(
                r"(?i)calculate\s+({NUMBER})\s*([+\-*/×÷])\s*({NUMBER})"
            ))?,
            store: Regex::new(&format!(r"(?i)store\s+({NUMBER})\s+in\s+memory"))?,
            recall: Regex::new(r"(?i)recall\s+memory|what'?s\s+in\s+memory")?,
            clear: Regex::new(r"(?i)clear\s+memory")?,
            help: Regex::new(r"(?i)\bhelp\b|what\s+can\s+you\s+do")?,
        })
    }

    fn match_calculate(&self, input: &str) -> Option<Command> {
        let caps = self.calculate.captures(input)?;
        let parsed = (
            caps[1].parse::<f64>(),
            Operation::from_symbol(&caps[2]),
            caps[3].parse::<f64>(),
        );

        Some(match parsed {
            (Ok(lhs), Some(operation), Ok(rhs)) => Command::Calculate {
                lhs,
                rhs,
                operation,
            },
            _ => Command::unknown(format!("could not read calculation {:?}", &caps[0])),
        })
    }

    fn match_store(&self, input: &str) -> Option<Command> {
        let caps = self.store.captures(input)?;
        Some(match caps[1].parse::<f64>() {
            Ok(value) => Command::MemoryStore { value },
            Err(_) => Command::unknown(format!("could not read number {:?}", &caps[1])),
        })
    }
}

impl IntentExtractor for PatternExtractor {
    fn name(&self) -> &str {
        "pattern"
    }

    fn extract(&self, input: &str) -> Result<Vec<Command>, IntentError> {
        let command = if let Some(command) = self.match_calculate(input) {
            command
        } else if let Some(command) = self.match_store(input) {
            command
        } else if self.recall.is_match(input) {
            Command::MemoryRecall
        } else if self.clear.is_match(input) {
            Command::MemoryClear
        } else if self.help.is_match(input) {
            Command::Help
        } else {
            Command::unknown("no known phrase")
        };

        tracing::debug!(extractor = "pattern", command = command.kind(), "Extracted intent");
        Ok(vec![command])
    }
}
