//! Chat Bridge
//!
//! The [`Assistant`] sits between a conversation and the calculator. It keeps
//! a short rolling history, hands each message to its [`IntentExtractor`],
//! and dispatches every resulting [`Command`] onto a [`CalculatorState`].
//!
//! # Flow
//!
//! ```text
//! user text ──► ChatHistory ──► IntentExtractor ──► Vec<Command>
//!                   ▲                                   │
//!                   │                                   ▼
//!                 reply ◄──────────────── dispatch(&mut CalculatorState)
//! ```
//!
//! Calculations go through the state machine rather than computing on the
//! side, so the display afterwards shows what the assistant answered.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{CalculatorConfig, ExtractorKind, LlmConfig};
use crate::intent::{
    Command, IntentError, IntentExtractor, MessagesRequest, PatternExtractor, ToolCallExtractor,
};
use crate::number::{format_for_reply, format_number};
use crate::operation::Operation;
use crate::state::CalculatorState;

/// Default number of messages kept in the history
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const DIVIDE_BY_ZERO_REPLY: &str = "I can't divide by zero!";

const FALLBACK_REPLY: &str = "I'm not sure how to help with that yet. \
Try asking me to calculate something, like 'Calculate 125 × 37'.";

const HELP_REPLY: &str = "I can help with calculations. Try asking me things like:\n\
- Calculate 125 × 37\n\
- Store 42 in memory\n\
- Recall memory\n\
- Clear memory";

// ============================================================================
// History
// ============================================================================

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person typing
    User,
    /// The calculator assistant
    Assistant,
}

/// A single chat message, in the shape the Messages API expects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Rolling message history; the oldest message is dropped past the limit
#[derive(Clone, Debug)]
pub struct ChatHistory {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChatHistory {
    /// Create an empty history holding at most `limit` messages (minimum 1)
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            messages: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append a message, evicting the oldest if full
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.limit {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Messages, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Number of messages held
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of messages held
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    /// Copy of the messages, oldest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }
}

// ============================================================================
// Assistant
// ============================================================================

/// Conversational front end to a calculator
pub struct Assistant {
    extractor: Box<dyn IntentExtractor>,
    history: ChatHistory,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("extractor", &self.extractor.name())
            .field("history", &self.history)
            .finish()
    }
}

impl Assistant {
    /// Create an assistant around an extractor
    #[must_use]
    pub fn new(extractor: Box<dyn IntentExtractor>) -> Self {
        Self {
            extractor,
            history: ChatHistory::default(),
        }
    }

    /// Assistant that understands typed phrases
    ///
    /// # Errors
    ///
    /// Returns an error if the phrase patterns fail to compile.
    pub fn pattern() -> Result<Self, IntentError> {
        Ok(Self::new(Box::new(PatternExtractor::new()?)))
    }

    /// Assistant that reads LLM tool calls
    #[must_use]
    pub fn tool_call() -> Self {
        Self::new(Box::new(ToolCallExtractor::new()))
    }

    /// Assistant using the configured extractor and history limit
    ///
    /// # Errors
    ///
    /// Returns an error if the phrase patterns fail to compile.
    pub fn from_config(config: &CalculatorConfig) -> Result<Self, IntentError> {
        let assistant = match config.extractor {
            ExtractorKind::Pattern => Self::pattern()?,
            ExtractorKind::ToolCall => Self::tool_call(),
        };
        Ok(assistant.with_history_limit(config.history_limit))
    }

    /// Replace the history with an empty one of the given limit
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = ChatHistory::new(limit);
        self
    }

    /// Name of the extractor in use
    #[must_use]
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Conversation so far
    #[must_use]
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Build the request body that would ask the LLM about the conversation
    #[must_use]
    pub fn request(&self, llm: &LlmConfig) -> MessagesRequest {
        MessagesRequest::new(llm.model.clone(), llm.max_tokens, self.history.to_vec())
    }

    /// Handle a user message and return the reply
    ///
    /// # Errors
    ///
    /// Returns an error if the extractor cannot read the input. The user
    /// message stays in the history; no reply is recorded.
    pub fn respond(
        &mut self,
        calc: &mut CalculatorState,
        input: &str,
    ) -> Result<String, IntentError> {
        self.respond_with(calc, input, input)
    }

    /// Record `user_message`, then extract commands from `extractor_input`
    ///
    /// For the LLM path the extractor input is the response body the model
    /// produced for `user_message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the extractor cannot read `extractor_input`.
    pub fn respond_with(
        &mut self,
        calc: &mut CalculatorState,
        user_message: &str,
        extractor_input: &str,
    ) -> Result<String, IntentError> {
        self.history
            .push(ChatMessage::new(MessageRole::User, user_message));

        let commands = self.extractor.extract(extractor_input)?;
        let reply = if commands.is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            commands
                .iter()
                .map(|command| self.dispatch(calc, command))
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.history
            .push(ChatMessage::new(MessageRole::Assistant, reply.clone()));
        Ok(reply)
    }

    /// Carry out one command and describe the outcome
    ///
    /// `Calculate` clears the calculator first, discarding any half-typed
    /// operand and pending operation. Memory is kept.
    pub fn dispatch(&self, calc: &mut CalculatorState, command: &Command) -> String {
        tracing::debug!(
            extractor = self.extractor.name(),
            command = command.kind(),
            "Dispatching command"
        );

        match command {
            Command::Calculate {
                lhs,
                rhs,
                operation,
            } => Self::calculate(calc, *lhs, *rhs, *operation),
            Command::MemoryStore { value } => {
                calc.memory_store(*value);
                format!("I've stored {} in memory.", format_number(*value))
            }
            Command::MemoryRecall => {
                format!("The value in memory is {}.", format_number(calc.memory_recall()))
            }
            Command::MemoryClear => {
                calc.memory_clear();
                "I've cleared the memory.".to_string()
            }
            Command::Help => HELP_REPLY.to_string(),
            Command::Reply { text } => text.clone(),
            Command::Unknown { reason } => {
                tracing::debug!(reason = %reason, "Unrecognized request");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    fn calculate(calc: &mut CalculatorState, lhs: f64, rhs: f64, operation: Operation) -> String {
        if operation == Operation::Divide && rhs == 0.0 {
            return DIVIDE_BY_ZERO_REPLY.to_string();
        }

        calc.clear();
        calc.load_value(lhs);
        calc.set_operation(operation);
        calc.load_value(rhs);
        calc.calculate();

        match calc.current_value() {
            Some(result) => format!(
                "The result of {} {} {} is {}",
                format_number(lhs),
                operation.symbol(),
                format_number(rhs),
                format_for_reply(result)
            ),
            None => {
                let shown = calc.display_value().to_string();
                calc.clear();
                format!("I couldn't finish that calculation ({shown}).")
            }
        }
    }
}
