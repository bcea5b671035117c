//! Centralized constants
//!
//! Single source of truth for default values shared across crates. Settings
//! defaults reference these so a tuned value changes in exactly one place.

/// Retrieval pipeline defaults
pub mod retrieval {
    /// Top-K for a single-source retrieval call
    pub const SINGLE_SOURCE_TOP_K: usize = 50;

    /// Per-source top-K inside a hybrid (multi-source) call
    pub const HYBRID_SOURCE_TOP_K: usize = 30;

    /// Default result page size; also the rerank short-circuit threshold
    pub const PAGE_SIZE: usize = 10;

    /// Per-adapter call timeout
    pub const ADAPTER_TIMEOUT_MS: u64 = 2_000;

    /// Characters of description kept when rendering rerank documents
    pub const SNIPPET_CHARS: usize = 160;

    /// Bounded size of the category-expansion cache
    pub const EXPANSION_CACHE_CAPACITY: u64 = 1_024;

    /// Time-to-live for expansion cache entries
    pub const EXPANSION_CACHE_TTL_SECS: u64 = 300;
}

/// Tool-calling orchestrator defaults
pub mod orchestrator {
    /// Hard ceiling on tool-calling rounds per session
    pub const MAX_TOOL_ROUNDS: u32 = 5;
}

/// Retry policy defaults for rate-limited collaborator calls
pub mod retry {
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const BASE_DELAY_MS: u64 = 200;
    pub const MAX_DELAY_MS: u64 = 2_000;
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// Embedding service endpoint
    pub const EMBEDDING_DEFAULT: &str = "http://localhost:11434";

    /// Qdrant vector index endpoint (REST API port)
    pub const QDRANT_DEFAULT: &str = "http://127.0.0.1:6334";

    /// Reranking service endpoint
    pub const RERANK_DEFAULT: &str = "http://localhost:8787";

    /// Anthropic API endpoint
    pub const ANTHROPIC_DEFAULT: &str = "https://api.anthropic.com";
}

/// LLM defaults
pub mod llm {
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
    pub const MAX_TOKENS: usize = 1_024;
    pub const TEMPERATURE: f32 = 0.4;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
}
