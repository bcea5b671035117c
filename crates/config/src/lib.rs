//! Configuration management for the shopping assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files
//! - Environment variables (SHOP_ASSIST_ prefix)
//!
//! Reference data (category-domain groups, the brand lexicon) is versioned
//! YAML owned by configuration, validated against the live catalog at
//! startup rather than trusted blindly.

pub mod constants;
pub mod reference;
pub mod settings;

pub use reference::{BrandLexicon, CategoryDomains, DomainGroup};
pub use settings::{
    load_settings, EmbeddingSettings, LlmSettings, OrchestratorConfig, RerankSettings,
    RetrievalConfig, RetryPolicy, RuntimeEnvironment, Settings, VectorIndexSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for shop_assist_core::Error {
    fn from(err: ConfigError) -> Self {
        shop_assist_core::Error::Config(err.to_string())
    }
}
