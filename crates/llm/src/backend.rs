//! Chat backend trait

use async_trait::async_trait;

use shop_assist_core::{ChatMessage, ChatTurn, ToolDefinition};

use crate::LlmError;

/// The chat/completion collaborator contract.
///
/// Accepts a system prompt, the ordered message history, and the declared
/// tool schema set; returns either a text answer or one or more structured
/// tool-invocation requests. Multi-turn continuation works by resubmitting
/// history plus new tool-response messages.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn, LlmError>;

    fn model_name(&self) -> &str;
}
