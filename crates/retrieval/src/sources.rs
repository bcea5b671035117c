//! Candidate source adapters
//!
//! Four independent query functions: semantic search, keyword search,
//! category browse, and brand browse. Each accepts a subset of the search
//! constraints and a result-count budget, and each fails soft: on any
//! internal error or timeout it returns an empty list, because the
//! consolidator tolerates partial source failure.

use std::sync::Arc;
use std::time::Duration;

use shop_assist_core::{
    CatalogItem, CatalogStore, EmbeddingService, KeywordIndex, NumericBounds, Result,
    SearchConstraints, VectorIndex, VectorRestricts,
};

/// The four retrieval sources behind one facade.
pub struct CandidateSources {
    catalog: Arc<dyn CatalogStore>,
    embedder: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorIndex>,
    keywords: Arc<dyn KeywordIndex>,
    timeout: Duration,
}

impl CandidateSources {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        embedder: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorIndex>,
        keywords: Arc<dyn KeywordIndex>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            embedder,
            vectors,
            keywords,
            timeout,
        }
    }

    /// Embed the query and ask the vector index for nearest neighbors,
    /// passing price/rating/category/brand restricts natively.
    pub async fn semantic(
        &self,
        constraints: &SearchConstraints,
        query: &str,
        top_k: usize,
    ) -> Vec<CatalogItem> {
        match tokio::time::timeout(self.timeout, self.semantic_inner(constraints, query, top_k))
            .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Semantic source degraded to empty");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Semantic source timed out");
                Vec::new()
            }
        }
    }

    async fn semantic_inner(
        &self,
        constraints: &SearchConstraints,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<CatalogItem>> {
        let vector = self.embedder.embed_query(query).await?;

        let category_ids = match constraints.category.as_deref() {
            Some(name) => self.resolve_category_ids(name).await,
            None => Vec::new(),
        };

        let restricts = VectorRestricts {
            bounds: NumericBounds::from_constraints(constraints),
            category_ids,
            brand: constraints.brand.clone(),
        };

        let hits = self.vectors.search(&vector, top_k, Some(&restricts)).await?;
        let ids: Vec<String> = hits.into_iter().map(|h| h.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.catalog.get_items(&ids).await
    }

    /// Requested category id plus all descendants; empty when unresolved
    /// (no restrict for that dimension).
    async fn resolve_category_ids(&self, name: &str) -> Vec<String> {
        match self.catalog.resolve_category(name).await {
            Ok(Some(resolved)) => match self.catalog.category_descendants(&resolved.id).await {
                Ok(descendants) => descendants.into_iter().map(|c| c.id).collect(),
                Err(_) => vec![resolved.id],
            },
            _ => Vec::new(),
        }
    }

    /// Text-match query against the keyword index, constrained by the
    /// numeric bounds. An unresolvable category name degrades to an extra
    /// keyword token.
    pub async fn keyword(
        &self,
        constraints: &SearchConstraints,
        query: &str,
        top_k: usize,
    ) -> Vec<CatalogItem> {
        match tokio::time::timeout(self.timeout, self.keyword_inner(constraints, query, top_k))
            .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Keyword source degraded to empty");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Keyword source timed out");
                Vec::new()
            }
        }
    }

    async fn keyword_inner(
        &self,
        constraints: &SearchConstraints,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<CatalogItem>> {
        let mut effective = query.to_string();
        if let Some(category) = constraints.category.as_deref() {
            let resolved = self.catalog.resolve_category(category).await.ok().flatten();
            if resolved.is_none() {
                effective = format!("{effective} {category}");
            }
        }

        let bounds = NumericBounds::from_constraints(constraints);
        self.keywords.search(&effective, &bounds, top_k).await
    }

    /// Resolve the category name and browse it; unresolved names yield
    /// nothing from this source.
    pub async fn by_category(
        &self,
        name: &str,
        bounds: &NumericBounds,
        top_k: usize,
    ) -> Vec<CatalogItem> {
        let browse = async {
            match self.catalog.resolve_category(name).await? {
                Some(resolved) => {
                    self.catalog
                        .browse_category(&resolved.id, bounds, top_k)
                        .await
                }
                None => Ok(Vec::new()),
            }
        };

        match tokio::time::timeout(self.timeout, browse).await {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, category = name, "Category source degraded to empty");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(category = name, "Category source timed out");
                Vec::new()
            }
        }
    }

    /// Exact brand browse, price ascending, bounds pushed into the query.
    pub async fn by_brand(
        &self,
        brand: &str,
        bounds: &NumericBounds,
        top_k: usize,
    ) -> Vec<CatalogItem> {
        match tokio::time::timeout(self.timeout, self.catalog.browse_brand(brand, bounds, top_k))
            .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, brand, "Brand source degraded to empty");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(brand, "Brand source timed out");
                Vec::new()
            }
        }
    }
}
