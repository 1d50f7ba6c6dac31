//! Calc Core - Calculator State Machine and Chat Bridge
//!
//! This crate holds all calculator logic, independent of any front end. A
//! terminal REPL, a web page or a test harness drives it the same way: by
//! pressing keys or by handing chat messages to an [`Assistant`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Front Ends                            │
//! │   ┌──────────┐        ┌──────────┐        ┌──────────────┐   │
//! │   │  Keypad  │        │   Chat   │        │  LLM proxy   │   │
//! │   │  (Key)   │        │  (text)  │        │ (tool calls) │   │
//! │   └────┬─────┘        └────┬─────┘        └──────┬───────┘   │
//! │        │                   │                     │           │
//! │        │          PatternExtractor      ToolCallExtractor    │
//! │        │                   └──────────┬──────────┘           │
//! │        │                          Command                    │
//! │        │                              │                      │
//! │        │                         Assistant                   │
//! └────────┼──────────────────────────────┼──────────────────────┘
//!          │                              │
//! ┌────────┴──────────────────────────────┴──────────────────────┐
//! │                      CalculatorState                         │
//! │   display buffer │ pending operation │ MemoryRegister        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use calc_core::{Assistant, CalculatorState, Key};
//!
//! let mut calc = CalculatorState::new();
//! calc.press_all(calc_core::parse_keys("1 2 + 3 0 =").unwrap());
//! assert_eq!(calc.display_value(), "42");
//!
//! let mut assistant = Assistant::pattern().unwrap();
//! let reply = assistant.respond(&mut calc, "calculate 6 × 7").unwrap();
//! assert_eq!(reply, "The result of 6 × 7 is 42");
//!
//! calc.press(Key::MemoryStore);
//! assert_eq!(calc.memory_recall(), 42.0);
//! ```
//!
//! # Module Overview
//!
//! - [`state`]: The calculator state machine
//! - [`memory`]: The memory register
//! - [`operation`]: Binary operators
//! - [`number`]: Display formatting and parsing
//! - [`keypad`]: Key labels and dispatch
//! - [`intent`]: Turning text or LLM responses into commands
//! - [`chat`]: Chat history and the command dispatcher
//! - [`shared`]: Thread-safe handle for multiple callers
//! - [`config`]: TOML / environment configuration
//! - [`error`]: Arithmetic errors
//!
//! # No I/O
//!
//! Apart from [`config`] reading its file, nothing here touches the
//! filesystem, network or terminal.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chat;
pub mod config;
pub mod error;
pub mod intent;
pub mod keypad;
pub mod memory;
pub mod number;
pub mod operation;
pub mod shared;
pub mod state;

// Re-exports for convenience
pub use chat::{Assistant, ChatHistory, ChatMessage, MessageRole, DEFAULT_HISTORY_LIMIT};
pub use error::CalculatorError;
pub use intent::{
    calculator_tools, Command, IntentError, IntentExtractor, LlmResponse, MessagesRequest,
    PatternExtractor, ToolCallExtractor, ToolDefinition,
};
pub use keypad::{parse_keys, Key, KeyParseError};
pub use memory::MemoryRegister;
pub use number::{format_for_reply, format_number, parse_display};
pub use operation::{Operation, UnknownOperation};
pub use shared::SharedCalculator;
pub use state::{CalculatorState, EntryMode};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, CalculatorConfig, CalculatorToml,
    ConfigError, ConfigOverrides, ConfigSource, ExtractorKind, LlmConfig,
};
