//! Safety filter
//!
//! The authoritative final pass over the consolidated candidate set. None
//! of the four sources enforces every constraint simultaneously, so every
//! candidate is re-validated here against brand, price, rating, and
//! category before anything reaches the reranker.
//!
//! Category matching admits the requested category's catalog descendants,
//! and is widened to the whole category-domain group only when a brand
//! constraint is active: a brand+category query for running shoes also
//! admits that brand's sneakers, while a category-only query stays strict.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use shop_assist_config::{BrandLexicon, CategoryDomains};
use shop_assist_core::{CatalogItem, CatalogStore, SearchConstraints};

/// Bounded, time-evicting cache for category-descendant expansion, keyed
/// by the normalized category name. Injected as a dependency so tests can
/// size or disable it.
#[derive(Clone)]
pub struct ExpansionCache {
    inner: Cache<String, Arc<HashSet<String>>>,
}

impl ExpansionCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    fn get(&self, key: &str) -> Option<Arc<HashSet<String>>> {
        self.inner.get(key)
    }

    fn insert(&self, key: String, value: Arc<HashSet<String>>) {
        self.inner.insert(key, value);
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

/// Deterministic constraint enforcement over consolidated candidates.
pub struct SafetyFilter {
    catalog: Arc<dyn CatalogStore>,
    domains: Arc<CategoryDomains>,
    lexicon: Arc<BrandLexicon>,
    cache: ExpansionCache,
}

impl SafetyFilter {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        domains: Arc<CategoryDomains>,
        lexicon: Arc<BrandLexicon>,
        cache: ExpansionCache,
    ) -> Self {
        Self {
            catalog,
            domains,
            lexicon,
            cache,
        }
    }

    /// The brand constraint in effect: the explicit brand, or one inferred
    /// from the free text via the configured lexicon.
    fn effective_brand(&self, constraints: &SearchConstraints) -> Option<String> {
        if constraints.brand.is_some() {
            return constraints.brand.clone();
        }
        constraints
            .query
            .as_deref()
            .and_then(|q| self.lexicon.infer(q))
            .map(|b| b.to_string())
    }

    /// Lowercased names admitted for the requested category.
    ///
    /// Always contains the literal requested name, so an unresolvable
    /// category still constrains results; resolvable names add their
    /// catalog descendants. Expansion is cached; the domain-group widening
    /// is a cheap config lookup applied after the cache.
    async fn admissible_categories(&self, category: &str, relax: bool) -> HashSet<String> {
        let key = category.trim().to_lowercase();

        let base = if let Some(cached) = self.cache.get(&key) {
            cached
        } else {
            let mut names = HashSet::new();
            names.insert(key.clone());
            match self.catalog.resolve_category(category).await {
                Ok(Some(resolved)) => match self.catalog.category_descendants(&resolved.id).await {
                    Ok(descendants) => {
                        names.extend(descendants.into_iter().map(|c| c.name.to_lowercase()));
                    }
                    Err(err) => {
                        tracing::warn!(category, error = %err, "Descendant expansion failed, using literal name");
                    }
                },
                Ok(None) => {
                    tracing::debug!(category, "Category not in taxonomy, using literal name");
                }
                Err(err) => {
                    tracing::warn!(category, error = %err, "Category resolution failed, using literal name");
                }
            }
            let names = Arc::new(names);
            self.cache.insert(key, names.clone());
            names
        };

        let mut admitted: HashSet<String> = base.as_ref().clone();
        if relax {
            if let Some(group) = self.domains.group_for(category) {
                admitted.extend(group.iter().map(|c| c.to_lowercase()));
            }
        }
        admitted
    }

    /// Retain only candidates satisfying every explicit constraint.
    /// Preserves input order. An empty result stays empty; earlier
    /// adapters already provide the unfiltered fallbacks.
    pub async fn apply(
        &self,
        constraints: &SearchConstraints,
        candidates: Vec<CatalogItem>,
    ) -> Vec<CatalogItem> {
        if candidates.is_empty() {
            return candidates;
        }

        let brand = self.effective_brand(constraints);
        let admitted = if let Some(ref category) = constraints.category {
            Some(
                self.admissible_categories(category, brand.is_some())
                    .await,
            )
        } else {
            None
        };

        let before = candidates.len();
        let retained: Vec<CatalogItem> = candidates
            .into_iter()
            .filter(|item| {
                if let Some(ref brand) = brand {
                    if !item.brand_matches(brand) {
                        return false;
                    }
                }
                if !constraints.price_in_bounds(item.price) {
                    return false;
                }
                if let Some(min_rating) = constraints.min_rating {
                    match item.rating {
                        Some(r) if r >= min_rating => {}
                        _ => return false,
                    }
                }
                if let Some(ref admitted) = admitted {
                    if !admitted.contains(&item.category.to_lowercase()) {
                        return false;
                    }
                }
                true
            })
            .collect();

        tracing::debug!(
            before,
            after = retained.len(),
            brand = brand.as_deref().unwrap_or(""),
            "Safety filter applied"
        );
        retained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CategoryNode, InMemoryCatalog};
    use rust_decimal::Decimal;

    fn item(id: &str, brand: &str, category: &str, price: i64, rating: f32) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("{brand} {id}"),
            brand: Some(brand.to_string()),
            category: category.to_string(),
            price: Decimal::from(price),
            rating: Some(rating),
            description: String::new(),
            thumbnail: None,
            in_stock: true,
        }
    }

    fn filter() -> SafetyFilter {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![],
            vec![
                CategoryNode::new("footwear", "Footwear", None),
                CategoryNode::new("running-shoes", "Running Shoes", Some("footwear")),
                CategoryNode::new("sneakers", "Sneakers", Some("footwear")),
                CategoryNode::new("televisions", "Televisions", None),
                CategoryNode::new("smartphones", "Smartphones", None),
            ],
        ));
        SafetyFilter::new(
            catalog,
            Arc::new(CategoryDomains::builtin()),
            Arc::new(BrandLexicon::builtin()),
            ExpansionCache::new(16, Duration::from_secs(60)),
        )
    }

    #[tokio::test]
    async fn test_price_bound_enforced() {
        let filter = filter();
        let constraints = SearchConstraints::new(
            Some("Samsung mobile phones".to_string()),
            None,
            Some("Samsung".to_string()),
            None,
            Some(Decimal::from(30_000)),
            None,
        );
        let candidates = vec![
            item("phone-cheap", "Samsung", "Smartphones", 25_000, 4.2),
            item("phone-pricey", "Samsung", "Smartphones", 45_000, 4.6),
            item("tv-1", "Samsung", "Televisions", 30_000, 4.1),
        ];
        let result = filter.apply(&constraints, candidates).await;
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        // no category constraint: TV passes price, phone-pricey fails
        assert_eq!(ids, vec!["phone-cheap", "tv-1"]);
    }

    #[tokio::test]
    async fn test_brand_relaxes_category_to_domain_group() {
        let filter = filter();
        let constraints = SearchConstraints::new(
            None,
            Some("Running Shoes".to_string()),
            Some("Puma".to_string()),
            None,
            None,
            None,
        );
        let candidates = vec![
            item("sneaker", "Puma", "Sneakers", 3_000, 4.5),
            item("tv", "Puma", "Televisions", 50_000, 4.0),
            item("nike-runner", "Nike", "Running Shoes", 4_000, 4.4),
        ];
        let result = filter.apply(&constraints, candidates).await;
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        // sneaker admitted via domain group; tv rejected despite brand match;
        // nike rejected on brand
        assert_eq!(ids, vec!["sneaker"]);
    }

    #[tokio::test]
    async fn test_no_brand_keeps_category_strict() {
        let filter = filter();
        let constraints = SearchConstraints::new(
            None,
            Some("Running Shoes".to_string()),
            None,
            None,
            None,
            None,
        );
        let candidates = vec![
            item("runner", "Puma", "Running Shoes", 4_000, 4.2),
            item("sneaker", "Puma", "Sneakers", 3_000, 4.5),
        ];
        let result = filter.apply(&constraints, candidates).await;
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        // without a brand constraint the domain group does not widen matching
        assert_eq!(ids, vec!["runner"]);
    }

    #[tokio::test]
    async fn test_brand_inferred_from_free_text() {
        let filter = filter();
        let constraints = SearchConstraints::from_query("cheap samsung phones");
        let candidates = vec![
            item("s", "Samsung", "Smartphones", 20_000, 4.0),
            item("x", "Xiaomi", "Smartphones", 15_000, 4.1),
        ];
        let result = filter.apply(&constraints, candidates).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "s");
    }

    #[tokio::test]
    async fn test_min_rating_rejects_unrated() {
        let filter = filter();
        let constraints = SearchConstraints::new(
            None,
            None,
            Some("Samsung".to_string()),
            None,
            None,
            Some(4.0),
        );
        let mut unrated = item("u", "Samsung", "Smartphones", 10_000, 0.0);
        unrated.rating = None;
        let candidates = vec![unrated, item("r", "Samsung", "Smartphones", 10_000, 4.5)];
        let result = filter.apply(&constraints, candidates).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "r");
    }

    #[tokio::test]
    async fn test_expansion_is_cached() {
        let filter = filter();
        let constraints = SearchConstraints::new(
            None,
            Some("Footwear".to_string()),
            None,
            None,
            None,
            None,
        );
        let candidates = vec![item("a", "Puma", "Sneakers", 3_000, 4.0)];
        filter.apply(&constraints, candidates.clone()).await;
        filter.apply(&constraints, candidates).await;
        assert_eq!(filter.cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let filter = filter();
        let constraints = SearchConstraints::from_brand("Puma");
        let candidates = vec![
            item("c", "Puma", "Sneakers", 3, 4.0),
            item("a", "Puma", "Sneakers", 1, 4.0),
            item("b", "Puma", "Sneakers", 2, 4.0),
        ];
        let result = filter.apply(&constraints, candidates).await;
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
