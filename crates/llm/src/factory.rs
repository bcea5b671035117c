//! Backend factory
//!
//! Selects the hosted backend when it can be constructed, and the canned
//! fallback otherwise. Construction failure (no credentials, bad client
//! config) is the "collaborator unavailable" case: dependents keep
//! working through the degraded path.

use std::sync::Arc;

use shop_assist_config::LlmSettings;

use crate::anthropic::{AnthropicBackend, AnthropicConfig};
use crate::backend::ChatBackend;
use crate::mock::CannedBackend;

/// Create the best available chat backend for the given settings.
pub fn create_backend(settings: &LlmSettings) -> Arc<dyn ChatBackend> {
    match AnthropicBackend::new(AnthropicConfig::from_settings(settings)) {
        Ok(backend) => {
            tracing::info!(model = settings.model.as_str(), "Using Anthropic chat backend");
            Arc::new(backend)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Chat backend unavailable, using canned fallback");
            Arc::new(CannedBackend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_falls_back_without_key() {
        // settings with no key and no env fallback in test environment
        let settings = LlmSettings {
            api_key: Some(String::new()),
            ..Default::default()
        };
        // explicit empty key bypasses the env var
        let backend = match AnthropicBackend::new(AnthropicConfig {
            api_key: String::new(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: std::time::Duration::from_secs(settings.timeout_secs),
            endpoint: settings.endpoint.clone(),
        }) {
            Ok(b) => Arc::new(b) as Arc<dyn ChatBackend>,
            Err(_) => Arc::new(CannedBackend),
        };
        assert_eq!(backend.model_name(), "canned-fallback");
    }
}
