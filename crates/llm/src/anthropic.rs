//! Anthropic Messages API backend
//!
//! Implements the chat collaborator over the Messages API with native
//! tool_use content blocks. Tool results are sent back as tool_result
//! blocks inside a user message, which is what multi-turn tool calling
//! requires.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shop_assist_config::LlmSettings;
use shop_assist_core::{
    ChatMessage, ChatTurn, StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResultPayload,
};

use crate::backend::ChatBackend;
use crate::LlmError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
    pub endpoint: String,
}

impl AnthropicConfig {
    /// Build from settings; the key falls back to ANTHROPIC_API_KEY.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .unwrap_or_default();
        Self {
            api_key,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            endpoint: settings.endpoint.clone(),
        }
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicBackend {
    /// Fails at construction when no API key is available, so dependents
    /// can switch to their degraded path up front.
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "no API key configured (set llm.api_key or ANTHROPIC_API_KEY)".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn convert_messages(messages: &[ChatMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|message| match message {
                ChatMessage::User { content } => ApiMessage {
                    role: "user".to_string(),
                    content: vec![ApiContentBlock::Text {
                        text: content.clone(),
                    }],
                },
                ChatMessage::Assistant { text, tool_calls } => {
                    let mut blocks = Vec::new();
                    if !text.is_empty() {
                        blocks.push(ApiContentBlock::Text { text: text.clone() });
                    }
                    for call in tool_calls {
                        blocks.push(ApiContentBlock::ToolUse {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            input: Value::Object(call.arguments.clone()),
                        });
                    }
                    ApiMessage {
                        role: "assistant".to_string(),
                        content: blocks,
                    }
                }
                ChatMessage::ToolResults { results } => ApiMessage {
                    role: "user".to_string(),
                    content: results.iter().map(tool_result_block).collect(),
                },
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolDefinition]) -> Vec<ApiTool> {
        tools
            .iter()
            .map(|t| ApiTool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect()
    }

    fn parse_response(response: ApiResponse) -> ChatTurn {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ApiContentBlock::Text { text: t } => text.push_str(&t),
                ApiContentBlock::ToolUse { id, name, input } => {
                    let arguments = match input {
                        Value::Object(map) => map,
                        _ => serde_json::Map::new(),
                    };
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments,
                    });
                }
                ApiContentBlock::ToolResult { .. } => {}
            }
        }

        ChatTurn {
            text,
            tool_calls,
            stop_reason: match response.stop_reason {
                ApiStopReason::EndTurn | ApiStopReason::StopSequence => StopReason::EndTurn,
                ApiStopReason::MaxTokens => StopReason::MaxTokens,
                ApiStopReason::ToolUse => StopReason::ToolUse,
            },
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        }
    }
}

fn tool_result_block(result: &ToolResultPayload) -> ApiContentBlock {
    ApiContentBlock::ToolResult {
        tool_use_id: result.call_id.clone(),
        content: result.content.clone(),
        is_error: result.is_error,
    }
}

#[async_trait]
impl ChatBackend for AnthropicBackend {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn, LlmError> {
        let api_tools = Self::convert_tools(tools);
        let request = ApiRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: if system.is_empty() {
                None
            } else {
                Some(system.to_string())
            },
            messages: Self::convert_messages(messages),
            tools: if api_tools.is_empty() {
                None
            } else {
                Some(api_tools)
            },
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.endpoint))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {status}: {body}")));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(Self::parse_response(parsed))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// =============================================================================
// Messages API types
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: Vec<ApiContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
    stop_reason: ApiStopReason,
    usage: ApiUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
enum ApiStopReason {
    #[default]
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: usize,
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnthropicConfig {
        AnthropicConfig {
            api_key: "test-key".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            temperature: 0.4,
            timeout: Duration::from_secs(5),
            endpoint: "https://api.anthropic.com".to_string(),
        }
    }

    #[test]
    fn test_missing_key_fails_at_construction() {
        let mut config = config();
        config.api_key = String::new();
        assert!(matches!(
            AnthropicBackend::new(config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_tool_results_become_user_tool_result_blocks() {
        let messages = vec![ChatMessage::ToolResults {
            results: vec![ToolResultPayload {
                call_id: "toolu_1".to_string(),
                content: "{\"items\":[]}".to_string(),
                is_error: false,
            }],
        }];
        let converted = AnthropicBackend::convert_messages(&messages);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "user");
        let json = serde_json::to_string(&converted[0]).unwrap();
        assert!(json.contains("tool_result"));
        assert!(json.contains("toolu_1"));
        assert!(!json.contains("is_error"));
    }

    #[test]
    fn test_assistant_turn_renders_tool_use_blocks() {
        let mut args = serde_json::Map::new();
        args.insert("query".to_string(), serde_json::json!("shoes"));
        let messages = vec![ChatMessage::assistant(
            "Looking that up.",
            vec![ToolCall {
                id: "toolu_2".to_string(),
                name: "search".to_string(),
                arguments: args,
            }],
        )];
        let json = serde_json::to_string(&AnthropicBackend::convert_messages(&messages)).unwrap();
        assert!(json.contains("tool_use"));
        assert!(json.contains("\"name\":\"search\""));
    }

    #[test]
    fn test_tool_use_response_parsing() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "Let me search."},
                {"type": "tool_use", "id": "toolu_3", "name": "search", "input": {"query": "puma shoes"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 100, "output_tokens": 40}
        }"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let turn = AnthropicBackend::parse_response(response);
        assert_eq!(turn.stop_reason, StopReason::ToolUse);
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "search");
        assert_eq!(turn.text, "Let me search.");
        assert_eq!(turn.usage.output_tokens, 40);
    }

    #[test]
    fn test_plain_text_response_parsing() {
        let json = r#"{
            "content": [{"type": "text", "text": "Here are your options."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 8}
        }"#;
        let response: ApiResponse = serde_json::from_str(json).unwrap();
        let turn = AnthropicBackend::parse_response(response);
        assert!(!turn.has_tool_calls());
        assert_eq!(turn.stop_reason, StopReason::EndTurn);
    }
}
