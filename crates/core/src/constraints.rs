//! Normalized search constraints
//!
//! One `SearchConstraints` value is constructed per tool invocation and is
//! immutable for the duration of that invocation. All string fields are
//! trimmed on construction; empty strings become `None`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The normalized retrieval request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConstraints {
    /// Free-text intent
    pub query: Option<String>,
    /// Human-readable category name, matched case-insensitively
    pub category: Option<String>,
    /// Brand name, matched case-insensitively
    pub brand: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    pub max_price: Option<Decimal>,
    /// Minimum rating
    pub min_rating: Option<f32>,
}

impl SearchConstraints {
    /// Normalize raw inputs: trim strings, drop empties.
    pub fn new(
        query: Option<String>,
        category: Option<String>,
        brand: Option<String>,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        min_rating: Option<f32>,
    ) -> Self {
        Self {
            query: normalize(query),
            category: normalize(category),
            brand: normalize(brand),
            min_price,
            max_price,
            min_rating,
        }
    }

    /// Free-text only constraints.
    pub fn from_query(query: impl Into<String>) -> Self {
        Self::new(Some(query.into()), None, None, None, None, None)
    }

    /// Brand-anchored constraints.
    pub fn from_brand(brand: impl Into<String>) -> Self {
        Self::new(None, None, Some(brand.into()), None, None, None)
    }

    /// Whether any retrieval source can be driven from these constraints.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.category.is_none() && self.brand.is_none()
    }

    /// True when the price lies inside the configured bounds.
    pub fn price_in_bounds(&self, price: Decimal) -> bool {
        if let Some(min) = self.min_price {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if price > max {
                return false;
            }
        }
        true
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_blank_strings() {
        let c = SearchConstraints::new(
            Some("  ".to_string()),
            Some(" Shoes ".to_string()),
            Some(String::new()),
            None,
            None,
            None,
        );
        assert_eq!(c.query, None);
        assert_eq!(c.category.as_deref(), Some("Shoes"));
        assert_eq!(c.brand, None);
    }

    #[test]
    fn test_price_in_bounds() {
        let c = SearchConstraints {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert!(c.price_in_bounds(Decimal::from(100)));
        assert!(c.price_in_bounds(Decimal::from(500)));
        assert!(!c.price_in_bounds(Decimal::from(99)));
        assert!(!c.price_in_bounds(Decimal::from(501)));
    }

    #[test]
    fn test_is_empty() {
        assert!(SearchConstraints::default().is_empty());
        assert!(!SearchConstraints::from_brand("Puma").is_empty());
    }
}
