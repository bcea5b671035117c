//! LLM conversation and tool-call types
//!
//! Shared between the chat backend, the tool layer, and the orchestrator so
//! that none of them depend on each other for plain data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in the tool result
    pub id: String,
    /// Declared tool name
    pub name: String,
    /// Raw argument map as produced by the model
    pub arguments: Map<String, Value>,
}

/// A declared tool schema submitted with every model turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the argument object
    pub input_schema: Value,
}

/// Structured result for one tool call, fed back into the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultPayload {
    /// Id of the call this result answers
    pub call_id: String,
    /// Serialized JSON result (or error payload)
    pub content: String,
    /// True when `content` is an error the model should correct for
    pub is_error: bool,
}

/// One message in the ordered conversation history.
///
/// The system prompt is carried separately by the backend request, so it is
/// not a message variant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatMessage {
    User {
        content: String,
    },
    Assistant {
        /// Text portion of the turn, may be empty when only tools were called
        text: String,
        tool_calls: Vec<ToolCall>,
    },
    /// Tool results for the immediately preceding assistant turn
    ToolResults {
        results: Vec<ToolResultPayload>,
    },
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_calls,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// Token accounting for one model turn.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Parsed response from one model turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Text content, may be empty on pure tool-use turns
    pub text: String,
    /// Zero or more tool invocations requested this turn
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ChatTurn {
    /// Whether the model requested any tool use this turn.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
