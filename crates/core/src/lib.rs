//! Core types and traits for the shopping assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Catalog snapshot types (items, categories)
//! - Normalized search constraints
//! - LLM message and tool-call types
//! - Collaborator traits for pluggable backends (catalog store, embedding
//!   service, vector index, keyword index, reranking service)
//! - Error types

pub mod catalog;
pub mod constraints;
pub mod error;
pub mod llm_types;
pub mod traits;

pub use catalog::{CatalogItem, CategoryRef};
pub use constraints::SearchConstraints;
pub use error::{Error, Result};
pub use llm_types::{
    ChatMessage, ChatTurn, StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResultPayload,
};
pub use traits::{
    CatalogStore, EmbeddingService, KeywordIndex, NumericBounds, RerankDocument, RerankService,
    VectorHit, VectorIndex, VectorRestricts,
};
