//! Main settings module

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, llm, orchestrator, retrieval, retry};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub vector_index: VectorIndexSettings,

    #[serde(default)]
    pub rerank: RerankSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    /// Path to the category-domain groups YAML (optional; built-in groups
    /// are used when absent)
    #[serde(default)]
    pub category_domains_path: Option<String>,

    /// Path to the brand lexicon YAML (optional)
    #[serde(default)]
    pub brand_lexicon_path: Option<String>,
}

/// Retrieval pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Top-K when only one source applies
    pub single_source_top_k: usize,
    /// Per-source top-K inside hybrid calls
    pub hybrid_source_top_k: usize,
    /// Result page size; sets at or below it skip reranking
    pub page_size: usize,
    /// Per-adapter timeout in milliseconds
    pub adapter_timeout_ms: u64,
    /// Description characters kept in rerank documents
    pub snippet_chars: usize,
    /// Category-expansion cache capacity
    pub expansion_cache_capacity: u64,
    /// Category-expansion cache TTL in seconds
    pub expansion_cache_ttl_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            single_source_top_k: retrieval::SINGLE_SOURCE_TOP_K,
            hybrid_source_top_k: retrieval::HYBRID_SOURCE_TOP_K,
            page_size: retrieval::PAGE_SIZE,
            adapter_timeout_ms: retrieval::ADAPTER_TIMEOUT_MS,
            snippet_chars: retrieval::SNIPPET_CHARS,
            expansion_cache_capacity: retrieval::EXPANSION_CACHE_CAPACITY,
            expansion_cache_ttl_secs: retrieval::EXPANSION_CACHE_TTL_SECS,
        }
    }
}

impl RetrievalConfig {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }
}

/// Tool-calling orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum tool-calling rounds per session
    pub max_tool_rounds: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: orchestrator::MAX_TOOL_ROUNDS,
        }
    }
}

/// Explicit retry policy for rate-limited collaborator calls.
///
/// Passed to the adapter as configuration rather than hand-rolled per call
/// site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay_ms: retry::BASE_DELAY_MS,
            max_delay_ms: retry::MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Exponential delay for a zero-based attempt index, capped at the
    /// configured maximum.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_ms.saturating_mul(1u64 << attempt.min(16));
        Duration::from_millis(exp.min(self.max_delay_ms))
    }
}

/// Embedding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub endpoint: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: endpoints::EMBEDDING_DEFAULT.to_string(),
            model: "qwen3-embedding:0.6b".to_string(),
            dimension: 1024,
            timeout_ms: 2_000,
            retry: RetryPolicy::default(),
        }
    }
}

/// Vector index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexSettings {
    pub endpoint: String,
    pub collection: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for VectorIndexSettings {
    fn default() -> Self {
        Self {
            endpoint: endpoints::QDRANT_DEFAULT.to_string(),
            collection: "catalog_items".to_string(),
            api_key: None,
        }
    }
}

/// Reranking service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self {
            endpoint: endpoints::RERANK_DEFAULT.to_string(),
            model: "bge-reranker-v2-m3".to_string(),
            timeout_ms: 3_000,
        }
    }
}

/// Hosted LLM settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key; falls back to ANTHROPIC_API_KEY when unset
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub endpoint: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_MODEL.to_string(),
            max_tokens: llm::MAX_TOKENS,
            temperature: llm::TEMPERATURE,
            timeout_secs: llm::REQUEST_TIMEOUT_SECS,
            endpoint: endpoints::ANTHROPIC_DEFAULT.to_string(),
        }
    }
}

/// Load settings from an optional file plus SHOP_ASSIST_ environment
/// overrides (double underscore separates nesting levels, e.g.
/// `SHOP_ASSIST_RETRIEVAL__PAGE_SIZE=20`).
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(Environment::with_prefix("SHOP_ASSIST").separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Cross-field sanity checks applied on load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.orchestrator.max_tool_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orchestrator.max_tool_rounds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.retrieval.hybrid_source_top_k > self.retrieval.single_source_top_k {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.hybrid_source_top_k".to_string(),
                message: "must not exceed single_source_top_k".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.retrieval.page_size, 10);
        assert_eq!(settings.orchestrator.max_tool_rounds, 5);
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(2_000));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut settings = Settings::default();
        settings.retrieval.page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = load_settings(Some(Path::new("/nonexistent/settings.yaml")));
        assert!(matches!(err, Err(ConfigError::FileNotFound(_))));
    }
}
