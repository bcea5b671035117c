//! Retrieval pipeline
//!
//! One retrieval invocation end to end: decide which sources apply, run
//! them concurrently with per-call timeouts, consolidate in priority
//! order, enforce constraints with the safety filter, then rerank.

use std::sync::Arc;
use std::time::Duration;

use shop_assist_config::{BrandLexicon, CategoryDomains, RetrievalConfig};
use shop_assist_core::{
    CatalogItem, CatalogStore, EmbeddingService, KeywordIndex, NumericBounds, RerankService,
    SearchConstraints, VectorIndex,
};

use crate::consolidate::{consolidate, keyword_query, semantic_query};
use crate::filter::{ExpansionCache, SafetyFilter};
use crate::rerank::RerankAdapter;
use crate::sources::CandidateSources;

/// The hybrid retrieval pipeline.
pub struct RetrievalPipeline {
    catalog: Arc<dyn CatalogStore>,
    embedder: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorIndex>,
    keywords: Arc<dyn KeywordIndex>,
    reranker: Option<Arc<dyn RerankService>>,
    domains: Arc<CategoryDomains>,
    lexicon: Arc<BrandLexicon>,
    cache: ExpansionCache,
    config: RetrievalConfig,
}

impl RetrievalPipeline {
    /// Build with built-in reference data, no reranker, and a cache sized
    /// from the config. Use the `with_*` methods to override.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        embedder: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorIndex>,
        keywords: Arc<dyn KeywordIndex>,
        config: RetrievalConfig,
    ) -> Self {
        let cache = ExpansionCache::new(
            config.expansion_cache_capacity,
            Duration::from_secs(config.expansion_cache_ttl_secs),
        );
        Self {
            catalog,
            embedder,
            vectors,
            keywords,
            reranker: None,
            domains: Arc::new(CategoryDomains::builtin()),
            lexicon: Arc::new(BrandLexicon::builtin()),
            cache,
            config,
        }
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn RerankService>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_reference_data(
        mut self,
        domains: Arc<CategoryDomains>,
        lexicon: Arc<BrandLexicon>,
    ) -> Self {
        self.domains = domains;
        self.lexicon = lexicon;
        self
    }

    pub fn with_expansion_cache(mut self, cache: ExpansionCache) -> Self {
        self.cache = cache;
        self
    }

    fn sources(&self) -> CandidateSources {
        CandidateSources::new(
            self.catalog.clone(),
            self.embedder.clone(),
            self.vectors.clone(),
            self.keywords.clone(),
            self.config.adapter_timeout(),
        )
    }

    fn filter(&self) -> SafetyFilter {
        SafetyFilter::new(
            self.catalog.clone(),
            self.domains.clone(),
            self.lexicon.clone(),
            self.cache.clone(),
        )
    }

    fn rerank_adapter(&self) -> RerankAdapter {
        RerankAdapter::new(
            self.reranker.clone(),
            self.config.page_size,
            self.config.snippet_chars,
            self.config.adapter_timeout(),
        )
    }

    /// Execute one retrieval invocation. Never errors: every failure mode
    /// inside degrades to fewer (possibly zero) results.
    pub async fn search(&self, constraints: &SearchConstraints) -> Vec<CatalogItem> {
        let sem_q = semantic_query(constraints);
        let kw_q = keyword_query(constraints);
        let bounds = NumericBounds::from_constraints(constraints);

        let active = [
            constraints.brand.is_some(),
            sem_q.is_some(),
            kw_q.is_some(),
            constraints.category.is_some(),
        ]
        .iter()
        .filter(|a| **a)
        .count();

        if active == 0 {
            return Vec::new();
        }

        // reduced per-source budget when more than one source contributes
        let top_k = if active > 1 {
            self.config.hybrid_source_top_k
        } else {
            self.config.single_source_top_k
        };

        let sources = self.sources();

        let brand_results = async {
            match constraints.brand.as_deref() {
                Some(brand) => sources.by_brand(brand, &bounds, top_k).await,
                None => Vec::new(),
            }
        };
        let semantic_results = async {
            match sem_q.as_deref() {
                Some(query) => sources.semantic(constraints, query, top_k).await,
                None => Vec::new(),
            }
        };
        let keyword_results = async {
            match kw_q.as_deref() {
                Some(query) => sources.keyword(constraints, query, top_k).await,
                None => Vec::new(),
            }
        };
        let category_results = async {
            match constraints.category.as_deref() {
                Some(category) => sources.by_category(category, &bounds, top_k).await,
                None => Vec::new(),
            }
        };

        let (brand, semantic, keyword, category) = tokio::join!(
            brand_results,
            semantic_results,
            keyword_results,
            category_results
        );

        tracing::debug!(
            brand = brand.len(),
            semantic = semantic.len(),
            keyword = keyword.len(),
            category = category.len(),
            "Candidate sources returned"
        );

        let consolidated = consolidate(brand, semantic, keyword, category);
        let filtered = self.filter().apply(constraints, consolidated.into_items()).await;
        self.rerank_adapter().rerank(sem_q.as_deref(), filtered).await
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalog;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shop_assist_core::{Error, Result, VectorHit, VectorRestricts};

    fn item(id: &str, name: &str, brand: &str, category: &str, price: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            category: category.to_string(),
            price: Decimal::from(price),
            rating: Some(4.0),
            description: format!("{name} from {brand}"),
            thumbnail: None,
            in_stock: true,
        }
    }

    struct StaticEmbedder;

    #[async_trait]
    impl EmbeddingService for StaticEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; 8])
        }
    }

    /// Returns the configured ids regardless of vector, ignoring restricts -
    /// deliberately sloppier than a real index, which the safety filter
    /// must compensate for.
    struct StaticVectors(Vec<String>);

    #[async_trait]
    impl VectorIndex for StaticVectors {
        async fn search(
            &self,
            _vector: &[f32],
            limit: usize,
            _restricts: Option<&VectorRestricts>,
        ) -> Result<Vec<VectorHit>> {
            Ok(self
                .0
                .iter()
                .take(limit)
                .map(|id| VectorHit {
                    id: id.clone(),
                    score: 0.8,
                })
                .collect())
        }
    }

    struct BrokenVectors;

    #[async_trait]
    impl VectorIndex for BrokenVectors {
        async fn search(
            &self,
            _vector: &[f32],
            _limit: usize,
            _restricts: Option<&VectorRestricts>,
        ) -> Result<Vec<VectorHit>> {
            Err(Error::VectorIndex("index offline".to_string()))
        }
    }

    struct EmptyKeywords;

    #[async_trait]
    impl KeywordIndex for EmptyKeywords {
        async fn search(
            &self,
            _query: &str,
            _bounds: &NumericBounds,
            _limit: usize,
        ) -> Result<Vec<CatalogItem>> {
            Ok(Vec::new())
        }
    }

    fn catalog_items() -> Vec<CatalogItem> {
        vec![
            item("puma-runner", "Velocity Nitro", "Puma", "Running Shoes", 4_000),
            item("puma-sneaker", "Court Classic", "Puma", "Sneakers", 3_000),
            item("nike-runner", "Pegasus", "Nike", "Running Shoes", 5_000),
            item("samsung-a15", "Galaxy A15", "Samsung", "Smartphones", 25_000),
        ]
    }

    fn pipeline(vector_ids: Vec<&str>) -> RetrievalPipeline {
        let catalog = Arc::new(InMemoryCatalog::from_items(catalog_items()));
        RetrievalPipeline::new(
            catalog,
            Arc::new(StaticEmbedder),
            Arc::new(StaticVectors(
                vector_ids.iter().map(|s| s.to_string()).collect(),
            )),
            Arc::new(EmptyKeywords),
            RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_constraints_yield_empty_result() {
        let pipeline = pipeline(vec![]);
        let results = pipeline.search(&SearchConstraints::default()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_brand_results_lead_the_merge() {
        let pipeline = pipeline(vec!["nike-runner", "puma-runner"]);
        let constraints = SearchConstraints::new(
            Some("running shoes".to_string()),
            None,
            Some("Puma".to_string()),
            None,
            None,
            None,
        );
        let results = pipeline.search(&constraints).await;
        // nike-runner came only from semantic search and fails the brand
        // filter; brand-browse items survive, cheapest first
        let ids: Vec<&str> = results.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["puma-sneaker", "puma-runner"]);
    }

    #[tokio::test]
    async fn test_broken_vector_index_degrades_gracefully() {
        let catalog = Arc::new(InMemoryCatalog::from_items(catalog_items()));
        let pipeline = RetrievalPipeline::new(
            catalog,
            Arc::new(StaticEmbedder),
            Arc::new(BrokenVectors),
            Arc::new(EmptyKeywords),
            RetrievalConfig::default(),
        );
        let constraints = SearchConstraints::new(
            Some("shoes".to_string()),
            None,
            Some("Puma".to_string()),
            None,
            None,
            None,
        );
        let results = pipeline.search(&constraints).await;
        // brand browse still contributes
        assert!(!results.is_empty());
        assert!(results.iter().all(|i| i.brand_matches("Puma")));
    }

    #[tokio::test]
    async fn test_category_only_search_browses_catalog() {
        let pipeline = pipeline(vec![]);
        let constraints = SearchConstraints::new(
            None,
            Some("Sneakers".to_string()),
            None,
            None,
            None,
            None,
        );
        let results = pipeline.search(&constraints).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "puma-sneaker");
    }
}
