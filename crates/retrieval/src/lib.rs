//! Hybrid multi-source retrieval
//!
//! Features:
//! - Four candidate source adapters (semantic, keyword, category browse,
//!   brand browse), each fail-soft
//! - Priority-ordered consolidation with first-writer-wins dedup
//! - Authoritative safety filter with category-domain relaxation for
//!   brand-anchored queries
//! - Cross-encoder reranking with graceful degradation
//! - Qdrant vector index and Tantivy keyword index collaborators
//! - HTTP embedding client with an explicit retry policy for rate limits

pub mod consolidate;
pub mod embeddings;
pub mod filter;
pub mod keyword_index;
pub mod memory;
pub mod pipeline;
pub mod rerank;
pub mod sources;
pub mod vector_index;

pub use consolidate::{consolidate, keyword_query, semantic_query, CandidateSet};
pub use embeddings::HttpEmbeddingClient;
pub use filter::{ExpansionCache, SafetyFilter};
pub use keyword_index::TantivyKeywordIndex;
pub use memory::{CategoryNode, InMemoryCatalog};
pub use pipeline::RetrievalPipeline;
pub use rerank::{HttpRerankClient, RerankAdapter};
pub use sources::CandidateSources;
pub use vector_index::QdrantVectorIndex;

use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Keyword index error: {0}")]
    KeywordIndex(String),

    #[error("Rerank error: {0}")]
    Rerank(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<RetrievalError> for shop_assist_core::Error {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Embedding(e) => shop_assist_core::Error::Embedding(e),
            RetrievalError::RateLimited => shop_assist_core::Error::RateLimited,
            RetrievalError::VectorIndex(e) => shop_assist_core::Error::VectorIndex(e),
            RetrievalError::KeywordIndex(e) => shop_assist_core::Error::KeywordIndex(e),
            RetrievalError::Rerank(e) => shop_assist_core::Error::Rerank(e),
            RetrievalError::Connection(e) => shop_assist_core::Error::VectorIndex(e),
        }
    }
}
