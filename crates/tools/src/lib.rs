//! Tool layer
//!
//! The declared tool set is a closed union: every tool the model may call
//! is one variant of [`ToolInvocation`], carrying its own strongly-typed
//! argument struct and dispatched by exhaustive pattern matching. An
//! unknown tool name is a parse error fed back to the model, not a
//! runtime default branch.

pub mod invocation;
pub mod schema;

pub use invocation::{
    call_signature, BrandArgs, CompareArgs, FeaturedArgs, ItemDetailArgs, SearchArgs,
    ToolInvocation,
};
pub use schema::tool_definitions;

use serde_json::json;
use thiserror::Error;

/// Tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Structured error payload reported back to the model so it can retry
    /// with corrected arguments. Never surfaced to the end user.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            ToolError::UnknownTool(name) => json!({
                "error": { "kind": "unknown_tool", "message": format!("no tool named '{name}'") }
            }),
            ToolError::InvalidArguments { tool, message } => json!({
                "error": { "kind": "invalid_arguments", "tool": tool, "message": message }
            }),
            ToolError::Execution(message) => json!({
                "error": { "kind": "execution_failed", "message": message }
            }),
        }
    }
}

impl From<ToolError> for shop_assist_core::Error {
    fn from(err: ToolError) -> Self {
        shop_assist_core::Error::Tool(err.to_string())
    }
}
