//! Collaborator traits
//!
//! The retrieval pipeline only talks to external systems through these
//! traits: the catalog store, the embedding service, the vector similarity
//! index, the keyword index, and the reranking service. Production
//! implementations live in the retrieval crate; tests use scripted fakes.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::catalog::{CatalogItem, CategoryRef};
use crate::constraints::SearchConstraints;
use crate::error::Result;

/// Numeric filter bounds pushed into browse and keyword queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericBounds {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f32>,
}

impl NumericBounds {
    pub fn from_constraints(constraints: &SearchConstraints) -> Self {
        Self {
            min_price: constraints.min_price,
            max_price: constraints.max_price,
            min_rating: constraints.min_rating,
        }
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(min) = self.min_price {
            if item.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if item.price > max {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            match item.rating {
                Some(r) if r >= min_rating => {}
                _ => return false,
            }
        }
        true
    }
}

/// Catalog store: taxonomy resolution, browse queries, batch fetch.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolve a human-readable category name to its canonical reference.
    ///
    /// Case-insensitive exact match first, then case-insensitive substring
    /// match. `None` when the name resolves to nothing.
    async fn resolve_category(&self, name: &str) -> Result<Option<CategoryRef>>;

    /// All descendant categories of a canonical category, including itself.
    async fn category_descendants(&self, id: &str) -> Result<Vec<CategoryRef>>;

    /// Full category listing.
    async fn list_categories(&self) -> Result<Vec<CategoryRef>>;

    /// Items in a category, ordered rating-descending then price-ascending.
    async fn browse_category(
        &self,
        category_id: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>>;

    /// Items for an exact (case-insensitive) brand match, price ascending.
    ///
    /// Bounds are applied inside the query so budget items surface before
    /// the brand's most expensive defaults.
    async fn browse_brand(
        &self,
        brand: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>>;

    /// Highest-rated in-stock items, used by the featured tool.
    async fn featured(&self, limit: usize) -> Result<Vec<CatalogItem>>;

    /// Batch fetch by identifier; unknown ids are skipped.
    async fn get_items(&self, ids: &[String]) -> Result<Vec<CatalogItem>>;
}

/// Embedding service: text to fixed-length vector.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a retrieval query. May fail with `Error::RateLimited`, which
    /// is retried by the caller's configured policy.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// One hit from the vector index.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
}

/// Restricts understood natively by the vector index.
#[derive(Debug, Clone, Default)]
pub struct VectorRestricts {
    pub bounds: NumericBounds,
    /// Canonical category ids; empty means unrestricted
    pub category_ids: Vec<String>,
    pub brand: Option<String>,
}

/// Vector similarity index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest neighbors of `vector`, ordered by descending similarity.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        restricts: Option<&VectorRestricts>,
    ) -> Result<Vec<VectorHit>>;
}

/// Keyword/full-text index.
#[async_trait]
pub trait KeywordIndex: Send + Sync {
    /// Text-match query constrained by numeric bounds, ordered by the
    /// index's own relevance.
    async fn search(
        &self,
        query: &str,
        bounds: &NumericBounds,
        limit: usize,
    ) -> Result<Vec<CatalogItem>>;
}

/// A candidate rendered for the reranking service.
#[derive(Debug, Clone)]
pub struct RerankDocument {
    pub id: String,
    pub text: String,
}

/// Cross-encoder reranking service.
#[async_trait]
pub trait RerankService: Send + Sync {
    /// Top-`limit` document ids in relevance order for `query`.
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        limit: usize,
    ) -> Result<Vec<String>>;
}
