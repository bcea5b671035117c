//! Candidate consolidation
//!
//! Merges the per-source candidate lists into one deduplicated list in a
//! fixed priority order: brand browse, then semantic search, then keyword
//! search, then category browse. Brand-matched items are the strongest
//! signal for brand-anchored queries and must not be pushed out of the
//! eventual top-N by generically-similar items from other brands.

use std::collections::HashSet;

use shop_assist_core::{CatalogItem, SearchConstraints};

/// Ordered, deduplicated candidate collection.
///
/// Insertion order encodes source priority and is preserved through
/// filtering; only reranking may reorder. First writer wins: a duplicate
/// id is discarded without merging fields.
#[derive(Debug, Default)]
pub struct CandidateSet {
    items: Vec<CatalogItem>,
    seen: HashSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one candidate. Returns false when the id was already present.
    pub fn insert(&mut self, item: CatalogItem) -> bool {
        if self.seen.insert(item.id.clone()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = CatalogItem>) {
        for item in items {
            self.insert(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CatalogItem> {
        self.items
    }
}

/// Merge per-source lists in priority order.
pub fn consolidate(
    brand: Vec<CatalogItem>,
    semantic: Vec<CatalogItem>,
    keyword: Vec<CatalogItem>,
    category: Vec<CatalogItem>,
) -> CandidateSet {
    let mut set = CandidateSet::new();
    set.extend(brand);
    set.extend(semantic);
    set.extend(keyword);
    set.extend(category);
    set
}

/// Query for the semantic source: the full natural-language text, or the
/// brand name when no free text was given.
pub fn semantic_query(constraints: &SearchConstraints) -> Option<String> {
    constraints
        .query
        .clone()
        .or_else(|| constraints.brand.clone())
}

/// Query for the keyword source: the brand name when present, else the
/// free text. Token matching fails on multi-word phrases that do not
/// literally appear in item text; a single brand token matches reliably.
pub fn keyword_query(constraints: &SearchConstraints) -> Option<String> {
    constraints
        .brand
        .clone()
        .or_else(|| constraints.query.clone())
}
