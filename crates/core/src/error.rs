//! Unified error type shared across crates

use thiserror::Error;

/// Top-level error for the shopping assistant core.
///
/// Each crate defines its own narrower error enum and converts into this
/// type at the crate boundary. Collaborator traits use it directly so that
/// trait objects can be implemented outside this workspace.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Rate limiting is distinct from other embedding failures so callers
    /// can apply their configured retry policy to it alone.
    #[error("Embedding service rate limited")]
    RateLimited,

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Keyword index error: {0}")]
    KeywordIndex(String),

    #[error("Rerank error: {0}")]
    Rerank(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
