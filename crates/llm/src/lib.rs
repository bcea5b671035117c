//! Hosted LLM integration
//!
//! Features:
//! - `ChatBackend` trait for the chat/completion collaborator
//! - Anthropic Messages API backend with native tool use
//! - Canned keyword-triggered backend used as the degraded path
//! - System prompt builder (persona, usage examples, caller context)

pub mod anthropic;
pub mod backend;
pub mod factory;
pub mod mock;
pub mod prompt;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use backend::ChatBackend;
pub use factory::create_backend;
pub use mock::{canned_reply, CannedBackend};
pub use prompt::{CallerContext, PromptBuilder};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for shop_assist_core::Error {
    fn from(err: LlmError) -> Self {
        shop_assist_core::Error::Llm(err.to_string())
    }
}
