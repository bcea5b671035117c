//! Per-session conversation state
//!
//! Owned exclusively by one in-flight tool-calling session, mutated turn
//! by turn, discarded at session end. Never persisted.

use std::collections::HashMap;

use serde_json::Value;

use shop_assist_core::{ChatMessage, ToolCall, ToolResultPayload};

/// Accumulating state for one tool-calling session.
pub struct ConversationState {
    session_id: String,
    messages: Vec<ChatMessage>,
    /// canonical call signature -> serialized result, for replay
    executed: HashMap<String, Value>,
    rounds: u32,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            executed: HashMap::new(),
            rounds: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>, tool_calls: Vec<ToolCall>) {
        self.messages.push(ChatMessage::assistant(text, tool_calls));
    }

    pub fn push_tool_results(&mut self, results: Vec<ToolResultPayload>) {
        self.messages.push(ChatMessage::ToolResults { results });
    }

    /// Count a dispatched tool round. The counter only ever grows.
    pub fn begin_round(&mut self) -> u32 {
        self.rounds += 1;
        self.rounds
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Result of a previously executed call with this signature, if any.
    pub fn replay(&self, signature: &str) -> Option<&Value> {
        self.executed.get(signature)
    }

    pub fn record_execution(&mut self, signature: String, result: Value) {
        self.executed.insert(signature, result);
    }

    pub fn executed_count(&self) -> usize {
        self.executed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_counter_is_monotone() {
        let mut state = ConversationState::new("s1");
        assert_eq!(state.rounds(), 0);
        assert_eq!(state.begin_round(), 1);
        assert_eq!(state.begin_round(), 2);
        assert_eq!(state.rounds(), 2);
    }

    #[test]
    fn test_replay_returns_recorded_result() {
        let mut state = ConversationState::new("s1");
        assert!(state.replay("search:{}").is_none());
        state.record_execution("search:{}".to_string(), json!({"items": []}));
        assert_eq!(state.replay("search:{}").unwrap()["items"], json!([]));
        assert_eq!(state.executed_count(), 1);
    }

    #[test]
    fn test_message_history_accumulates_in_order() {
        let mut state = ConversationState::new("s1");
        state.push_user("hi");
        state.push_assistant("hello", vec![]);
        assert_eq!(state.messages().len(), 2);
        assert!(matches!(state.messages()[0], ChatMessage::User { .. }));
    }
}
