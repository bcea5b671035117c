//! Typed tool invocations
//!
//! Parses a raw model tool call into the closed [`ToolInvocation`] union,
//! and computes the canonical call signature used for within-session
//! dedup of repeated calls.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use shop_assist_core::{SearchConstraints, ToolCall};

use crate::ToolError;

/// Default and maximum result counts for the browse-style tools.
const DEFAULT_FEATURED_LIMIT: usize = 10;
const MAX_FEATURED_LIMIT: usize = 20;
const MAX_BRAND_LIMIT: usize = 50;

/// Arguments for `search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchArgs {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f32>,
}

impl SearchArgs {
    pub fn to_constraints(&self) -> SearchConstraints {
        SearchConstraints::new(
            self.query.clone(),
            self.category.clone(),
            self.brand.clone(),
            self.min_price.and_then(Decimal::from_f64),
            self.max_price.and_then(Decimal::from_f64),
            self.min_rating,
        )
    }
}

/// Arguments for `get_item_detail`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDetailArgs {
    pub item_id: String,
}

/// Arguments for `get_featured`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedArgs {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FeaturedArgs {
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_FEATURED_LIMIT)
    }
}

/// Arguments for `compare_items`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareArgs {
    pub item_ids: Vec<String>,
}

/// Arguments for `get_items_by_brand`.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandArgs {
    pub brand: String,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f32>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl BrandArgs {
    pub fn to_constraints(&self) -> SearchConstraints {
        SearchConstraints::new(
            None,
            None,
            Some(self.brand.clone()),
            self.min_price.and_then(Decimal::from_f64),
            self.max_price.and_then(Decimal::from_f64),
            self.min_rating,
        )
    }

    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .clamp(1, MAX_BRAND_LIMIT)
    }
}

/// The closed set of tools the model may invoke.
#[derive(Debug, Clone)]
pub enum ToolInvocation {
    Search(SearchArgs),
    GetItemDetail(ItemDetailArgs),
    ListCategories,
    GetFeatured(FeaturedArgs),
    CompareItems(CompareArgs),
    GetItemsByBrand(BrandArgs),
}

impl ToolInvocation {
    /// Parse a raw model call. Unknown names and malformed arguments are
    /// errors the orchestrator reports back to the model.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let args = Value::Object(call.arguments.clone());
        match call.name.as_str() {
            "search" => {
                let args: SearchArgs = parse_args(&call.name, args)?;
                Ok(Self::Search(args))
            }
            "get_item_detail" => {
                let args: ItemDetailArgs = parse_args(&call.name, args)?;
                if args.item_id.trim().is_empty() {
                    return Err(ToolError::invalid(&call.name, "item_id must not be empty"));
                }
                Ok(Self::GetItemDetail(args))
            }
            "list_categories" => Ok(Self::ListCategories),
            "get_featured" => {
                let args: FeaturedArgs = parse_args(&call.name, args)?;
                Ok(Self::GetFeatured(args))
            }
            "compare_items" => {
                let args: CompareArgs = parse_args(&call.name, args)?;
                if args.item_ids.len() < 2 || args.item_ids.len() > 5 {
                    return Err(ToolError::invalid(
                        &call.name,
                        format!("item_ids must have 2 to 5 entries, got {}", args.item_ids.len()),
                    ));
                }
                Ok(Self::CompareItems(args))
            }
            "get_items_by_brand" => {
                let args: BrandArgs = parse_args(&call.name, args)?;
                if args.brand.trim().is_empty() {
                    return Err(ToolError::invalid(&call.name, "brand must not be empty"));
                }
                Ok(Self::GetItemsByBrand(args))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::GetItemDetail(_) => "get_item_detail",
            Self::ListCategories => "list_categories",
            Self::GetFeatured(_) => "get_featured",
            Self::CompareItems(_) => "compare_items",
            Self::GetItemsByBrand(_) => "get_items_by_brand",
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::invalid(tool, e.to_string()))
}

/// Canonical signature for a tool call: the tool name plus the normalized
/// argument map. Two calls with the same signature are the same call and
/// the second reuses the first's result.
pub fn call_signature(call: &ToolCall) -> String {
    format!("{}:{}", call.name, canonical_json(&normalize_map(&call.arguments)))
}

fn normalize_map(map: &Map<String, Value>) -> Value {
    let normalized: BTreeMap<String, Value> = map
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), normalize_value(v)))
        .collect();
    Value::Object(normalized.into_iter().collect())
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_lowercase()),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(map) => normalize_map(map),
        other => other.clone(),
    }
}

fn canonical_json(value: &Value) -> String {
    // serde_json object iteration preserves insertion order; the BTreeMap
    // pass above already sorted the keys
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: Value) -> ToolCall {
        let arguments = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_parse_search_to_constraints() {
        let parsed = ToolInvocation::parse(&call(
            "search",
            json!({"query": "Samsung mobile phones", "brand": "Samsung", "max_price": 30000.0}),
        ))
        .unwrap();
        let ToolInvocation::Search(args) = parsed else {
            panic!("expected search");
        };
        let constraints = args.to_constraints();
        assert_eq!(constraints.brand.as_deref(), Some("Samsung"));
        assert_eq!(constraints.max_price, Some(Decimal::from(30_000)));
    }

    #[test]
    fn test_unknown_tool_is_parse_error() {
        let err = ToolInvocation::parse(&call("order_pizza", json!({}))).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[test]
    fn test_malformed_arguments_reported() {
        let err =
            ToolInvocation::parse(&call("get_item_detail", json!({"wrong": true}))).unwrap_err();
        let payload = err.to_payload();
        assert_eq!(payload["error"]["kind"], "invalid_arguments");
    }

    #[test]
    fn test_compare_requires_two_to_five_ids() {
        let err =
            ToolInvocation::parse(&call("compare_items", json!({"item_ids": ["only-one"]})))
                .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let ok = ToolInvocation::parse(&call(
            "compare_items",
            json!({"item_ids": ["a", "b", "c"]}),
        ));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_signature_normalizes_case_whitespace_and_key_order() {
        let a = call(
            "search",
            json!({"brand": " Samsung ", "query": "Phones"}),
        );
        let b = call(
            "search",
            json!({"query": "phones", "brand": "samsung"}),
        );
        assert_eq!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_signature_distinguishes_different_arguments() {
        let a = call("search", json!({"query": "phones"}));
        let b = call("search", json!({"query": "laptops"}));
        assert_ne!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_signature_ignores_explicit_nulls() {
        let a = call("search", json!({"query": "phones", "brand": null}));
        let b = call("search", json!({"query": "phones"}));
        assert_eq!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_featured_limit_clamped() {
        let args = FeaturedArgs { limit: Some(500) };
        assert_eq!(args.effective_limit(), 20);
        let args = FeaturedArgs { limit: None };
        assert_eq!(args.effective_limit(), 10);
    }
}
