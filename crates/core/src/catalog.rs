//! Catalog snapshot types
//!
//! Items and categories are read-only snapshots produced by the catalog
//! store. Retrieval never mutates them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable catalog item snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Opaque unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Brand, absent for unbranded items
    #[serde(default)]
    pub brand: Option<String>,
    /// Leaf-level category name
    pub category: String,
    /// Non-negative price
    pub price: Decimal,
    /// Average rating in [0.0, 5.0], absent when unrated
    #[serde(default)]
    pub rating: Option<f32>,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Thumbnail reference
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Stock flag
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl CatalogItem {
    /// Case-insensitive brand comparison.
    pub fn brand_matches(&self, brand: &str) -> bool {
        self.brand
            .as_deref()
            .map(|b| b.eq_ignore_ascii_case(brand))
            .unwrap_or(false)
    }

    /// Case-insensitive category comparison.
    pub fn category_matches(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category)
    }
}

/// Canonical category reference resolved from a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Canonical identifier in the catalog taxonomy
    pub id: String,
    /// Display name (leaf level)
    pub name: String,
}

impl CategoryRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
