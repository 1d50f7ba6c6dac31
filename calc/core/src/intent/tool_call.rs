//! LLM tool calls
//!
//! Wire types for the Messages API exchange and the extractor that turns
//! `tool_use` content blocks into [`Command`]s.
//!
//! ```text
//! MessagesRequest ──► LLM proxy ──► LlmResponse { content: [ContentBlock] }
//!  (history + tools)                       │
//!                                          ▼
//!                              ToolCallExtractor::extract
//!                                          │
//!                                          ▼
//!                                    Vec<Command>
//! ```
//!
//! Transport is the caller's business; this module only builds and reads
//! JSON bodies.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{Command, IntentError, IntentExtractor};
use crate::chat::ChatMessage;
use crate::operation::Operation;

// ============================================================================
// Tool definitions
// ============================================================================

/// A tool offered to the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name the model calls
    pub name: String,
    /// What the tool does
    pub description: String,
    /// JSON schema of the tool input
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// The four calculator tools
#[must_use]
pub fn calculator_tools() -> Vec<ToolDefinition> {
    let operations: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();

    vec![
        ToolDefinition::new(
            "calculate",
            "Perform a calculation with two numbers",
            json!({
                "type": "object",
                "properties": {
                    "num1": {
                        "type": "number",
                        "description": "The first number in the calculation"
                    },
                    "num2": {
                        "type": "number",
                        "description": "The second number in the calculation"
                    },
                    "operation": {
                        "type": "string",
                        "enum": operations,
                        "description": "The operation to perform"
                    }
                },
                "required": ["num1", "num2", "operation"]
            }),
        ),
        ToolDefinition::new(
            "memory_store",
            "Store a value in calculator memory",
            json!({
                "type": "object",
                "properties": {
                    "value": {
                        "type": "number",
                        "description": "The value to store in memory"
                    }
                },
                "required": ["value"]
            }),
        ),
        ToolDefinition::new(
            "memory_recall",
            "Recall the value from calculator memory",
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::new(
            "memory_clear",
            "Clear the calculator memory",
            json!({ "type": "object", "properties": {} }),
        ),
    ]
}

// ============================================================================
// Request / response bodies
// ============================================================================

/// Request body sent to the LLM proxy
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessagesRequest {
    /// Model identifier
    pub model: String,
    /// Output token limit
    pub max_tokens: u32,
    /// Conversation so far, oldest first
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,
}

impl MessagesRequest {
    /// Build a request offering the calculator tools
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages,
            tools: calculator_tools(),
        }
    }
}

/// Response body returned by the LLM proxy
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LlmResponse {
    /// Content blocks; absent on error responses
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    /// Why the model stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Error details, if the API rejected the request
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error object of an API error response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Error category
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// One block of a response's `content` array
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// A tool call
    ToolUse {
        /// Call identifier
        #[serde(default)]
        id: Option<String>,
        /// Tool name
        name: String,
        /// Tool arguments
        #[serde(default)]
        input: Value,
    },
    /// Any block type this crate does not handle
    #[serde(other)]
    Other,
}

// ============================================================================
// Extractor
// ============================================================================

/// Reads commands from an LLM response body
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolCallExtractor;

impl ToolCallExtractor {
    /// Create the extractor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map one tool call to a command
    #[must_use]
    pub fn command_for(name: &str, input: &Value) -> Command {
        match name {
            "calculate" => {
                let lhs = input.get("num1").and_then(Value::as_f64);
                let rhs = input.get("num2").and_then(Value::as_f64);
                let operation = input
                    .get("operation")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<Operation>().ok());

                match (lhs, rhs, operation) {
                    (Some(lhs), Some(rhs), Some(operation)) => Command::Calculate {
                        lhs,
                        rhs,
                        operation,
                    },
                    _ => Command::unknown(format!("invalid calculate arguments: {input}")),
                }
            }
            "memory_store" => match input.get("value").and_then(Value::as_f64) {
                Some(value) => Command::MemoryStore { value },
                None => Command::unknown(format!("invalid memory_store arguments: {input}")),
            },
            "memory_recall" => Command::MemoryRecall,
            "memory_clear" => Command::MemoryClear,
            other => Command::unknown(format!("unknown tool {other:?}")),
        }
    }
}

impl IntentExtractor for ToolCallExtractor {
    fn name(&self) -> &str {
        "tool-call"
    }

    fn extract(&self, input: &str) -> Result<Vec<Command>, IntentError> {
        let response: LlmResponse = serde_json::from_str(input)?;

        if let Some(error) = response.error {
            return Err(IntentError::Api(format!("{}: {}", error.kind, error.message)));
        }
        let blocks = response.content.ok_or(IntentError::MissingContent)?;

        let mut commands = Vec::new();
        let mut text = Vec::new();
        for block in &blocks {
            match block {
                ContentBlock::ToolUse { name, input, .. } => {
                    commands.push(Self::command_for(name, input));
                }
                ContentBlock::Text { text: t } => text.push(t.as_str()),
                ContentBlock::Other => {}
            }
        }

        if commands.is_empty() && !text.is_empty() {
            commands.push(Command::Reply {
                text: text.join("\n"),
            });
        }

        tracing::debug!(
            extractor = "tool-call",
            blocks = blocks.len(),
            commands = commands.len(),
            stop_reason = response.stop_reason.as_deref().unwrap_or(""),
            "Extracted intent"
        );
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MessageRole;
    use pretty_assertions::assert_eq;

    fn extract(body: &str) -> Vec<Command> {
        ToolCallExtractor::new().extract(body).unwrap()
    }

    #[test]
    fn test_calculator_tools() {
        let tools = calculator_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["calculate", "memory_store", "memory_recall", "memory_clear"]
        );
        assert_eq!(
            tools[0].input_schema["properties"]["operation"]["enum"],
            json!(["add", "subtract", "multiply", "divide"])
        );
        assert_eq!(tools[1].input_schema["required"], json!(["value"]));
    }

    #[test]
    fn test_messages_request_body() {
        let request = MessagesRequest::new(
            "claude-3-haiku-20240307",
            1024,
            vec![ChatMessage::new(MessageRole::User, "calculate 2 + 2")],
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "calculate 2 + 2");
        assert_eq!(body["tools"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_extract_calculate() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "Let me work that out."},
                {"type": "tool_use", "id": "toolu_1", "name": "calculate",
                 "input": {"num1": 125, "num2": 37, "operation": "multiply"}}
            ],
            "stop_reason": "tool_use"
        }"#;
        assert_eq!(
            extract(body),
            vec![Command::Calculate {
                lhs: 125.0,
                rhs: 37.0,
                operation: Operation::Multiply,
            }]
        );
    }

    #[test]
    fn test_extract_memory_tools() {
        let body = r#"{"content": [
            {"type": "tool_use", "name": "memory_store", "input": {"value": 42}},
            {"type": "tool_use", "name": "memory_recall", "input": {}},
            {"type": "tool_use", "name": "memory_clear"}
        ]}"#;
        assert_eq!(
            extract(body),
            vec![
                Command::MemoryStore { value: 42.0 },
                Command::MemoryRecall,
                Command::MemoryClear,
            ]
        );
    }

    #[test]
    fn test_bad_arguments_become_unknown() {
        let body = r#"{"content": [
            {"type": "tool_use", "name": "calculate", "input": {"num1": "ten", "num2": 2, "operation": "add"}},
            {"type": "tool_use", "name": "calculate", "input": {"num1": 1, "num2": 2, "operation": "power"}},
            {"type": "tool_use", "name": "memory_store", "input": {}},
            {"type": "tool_use", "name": "launch_rockets", "input": {}}
        ]}"#;
        let commands = extract(body);
        assert_eq!(commands.len(), 4);
        assert!(commands
            .iter()
            .all(|c| matches!(c, Command::Unknown { .. })));
    }

    #[test]
    fn test_text_only_becomes_reply() {
        let body = r#"{"content": [
            {"type": "text", "text": "Hello!"},
            {"type": "text", "text": "Ask me to calculate something."}
        ]}"#;
        assert_eq!(
            extract(body),
            vec![Command::Reply {
                text: "Hello!\nAsk me to calculate something.".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_block_types_ignored() {
        let body = r#"{"content": [{"type": "thinking", "thinking": "hmm"}]}"#;
        assert_eq!(extract(body), vec![]);
    }

    #[test]
    fn test_malformed_json() {
        let err = ToolCallExtractor::new().extract("{not json").unwrap_err();
        assert!(matches!(err, IntentError::InvalidJson(_)));
    }

    #[test]
    fn test_missing_content() {
        let err = ToolCallExtractor::new().extract("{}").unwrap_err();
        assert!(matches!(err, IntentError::MissingContent));
    }

    #[test]
    fn test_api_error() {
        let body = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let err = ToolCallExtractor::new().extract(body).unwrap_err();
        assert_eq!(err.to_string(), "LLM API error: overloaded_error: Overloaded");
    }
}
