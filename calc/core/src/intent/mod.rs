//! Intent Extraction
//!
//! Turns what a user (or a language model acting for them) said into
//! calculator [`Command`]s. Two extractors share the [`IntentExtractor`]
//! trait:
//!
//! - [`PatternExtractor`] matches a handful of fixed phrases locally
//! - [`ToolCallExtractor`] reads tool calls out of an LLM response body
//!
//! Both feed the same dispatcher in [`crate::chat`], so the calculator never
//! knows where a command came from.

mod pattern;
mod tool_call;

pub use pattern::PatternExtractor;
pub use tool_call::{
    calculator_tools, ApiErrorBody, ContentBlock, LlmResponse, MessagesRequest, ToolCallExtractor,
    ToolDefinition,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::Operation;

/// Something the assistant was asked to do
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Compute `lhs <operation> rhs`
    Calculate {
        /// Left-hand operand
        lhs: f64,
        /// Right-hand operand
        rhs: f64,
        /// Operator
        operation: Operation,
    },
    /// Overwrite the memory register
    MemoryStore {
        /// Value to store
        value: f64,
    },
    /// Report the memory register
    MemoryRecall,
    /// Reset the memory register
    MemoryClear,
    /// Explain what the assistant understands
    Help,
    /// Free text the model answered with instead of calling a tool
    Reply {
        /// Text to show as-is
        text: String,
    },
    /// Nothing recognizable
    Unknown {
        /// Why the input was not understood
        reason: String,
    },
}

impl Command {
    /// Short name for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Calculate { .. } => "calculate",
            Self::MemoryStore { .. } => "memory_store",
            Self::MemoryRecall => "memory_recall",
            Self::MemoryClear => "memory_clear",
            Self::Help => "help",
            Self::Reply { .. } => "reply",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Build an `Unknown` command
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::Unknown {
            reason: reason.into(),
        }
    }
}

/// Failures that stop extraction entirely
///
/// Unrecognized but well-formed input is not an error; it becomes
/// [`Command::Unknown`].
#[derive(Debug, Error)]
pub enum IntentError {
    /// Response body is not valid JSON or has the wrong shape
    #[error("Invalid LLM response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Response body has no `content` array
    #[error("LLM response has no content")]
    MissingContent,

    /// The LLM API reported an error
    #[error("LLM API error: {0}")]
    Api(String),

    /// A built-in phrase pattern failed to compile
    #[error("Invalid phrase pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Converts raw input into commands
pub trait IntentExtractor: Send + Sync {
    /// Extractor name, for logging and configuration
    fn name(&self) -> &str;

    /// Extract the commands contained in `input`
    ///
    /// # Errors
    ///
    /// Returns an error only when the input cannot be read at all, such as a
    /// malformed LLM response body.
    fn extract(&self, input: &str) -> Result<Vec<Command>, IntentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind() {
        assert_eq!(Command::Help.kind(), "help");
        assert_eq!(Command::unknown("nope").kind(), "unknown");
        assert_eq!(
            Command::Calculate {
                lhs: 1.0,
                rhs: 2.0,
                operation: Operation::Add,
            }
            .kind(),
            "calculate"
        );
    }

    #[test]
    fn test_command_serializes_tagged() {
        let json = serde_json::to_value(Command::MemoryStore { value: 4.0 }).unwrap();
        assert_eq!(json["command"], "memory_store");
        assert_eq!(json["value"], 4.0);
    }
}
