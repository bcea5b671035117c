//! Canned fallback backend
//!
//! When the hosted LLM is unavailable or misconfigured, the orchestrator
//! still owes the caller an answer. This backend produces a canned,
//! keyword-triggered reply built from the user's message and never
//! requests tool use.

use async_trait::async_trait;

use shop_assist_core::{ChatMessage, ChatTurn, StopReason, TokenUsage, ToolDefinition};

use crate::backend::ChatBackend;
use crate::LlmError;

/// Keyword-triggered canned reply for a user message.
pub fn canned_reply(message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("hello") || lower.contains("hi ") || lower.starts_with("hi") {
        return "Hi! I can help you find products: tell me what you're looking for, \
                and feel free to mention a brand, category, or budget."
            .to_string();
    }
    if lower.contains("price") || lower.contains("cheap") || lower.contains("budget") {
        return "I can filter by price: tell me the product you want and your budget, \
                for example \"wireless earbuds under 2000\"."
            .to_string();
    }
    if lower.contains("deliver") || lower.contains("shipping") {
        return "Delivery options are shown at checkout for each item. \
                I can help you find the products themselves: what are you shopping for?"
            .to_string();
    }
    if lower.contains("return") || lower.contains("refund") {
        return "Returns are handled from your orders page. \
                If you're still choosing, tell me what you're looking for and I'll find options."
            .to_string();
    }

    "I'm having trouble reaching the assistant right now. \
     Try asking for a product with a brand, category, or price range, \
     for example \"Samsung phones under 30000\"."
        .to_string()
}

/// Backend that always answers with a canned reply.
pub struct CannedBackend;

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn complete(
        &self,
        _system: &str,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<ChatTurn, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find_map(|m| match m {
                ChatMessage::User { content } => Some(content.as_str()),
                _ => None,
            })
            .unwrap_or("");

        Ok(ChatTurn {
            text: canned_reply(last_user),
            tool_calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn model_name(&self) -> &str {
        "canned-fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_reply_greeting() {
        assert!(canned_reply("Hello there").contains("help you find"));
    }

    #[test]
    fn test_canned_reply_price() {
        assert!(canned_reply("what's the price of this").contains("budget"));
    }

    #[test]
    fn test_canned_reply_default_is_not_blank() {
        let reply = canned_reply("qwerty");
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_backend_never_calls_tools() {
        let backend = CannedBackend;
        let turn = backend
            .complete("", &[ChatMessage::user("hello")], &[])
            .await
            .unwrap();
        assert!(!turn.has_tool_calls());
        assert!(!turn.text.is_empty());
    }
}
