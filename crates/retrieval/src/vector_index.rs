//! Vector index using Qdrant
//!
//! Dense similarity search over the catalog embedding collection. The
//! index is write-owned by the ingestion pipeline; this client only
//! queries. Payload fields used for restricts: `price` (f64), `rating`
//! (f64), `category_id` (keyword), `brand` (lowercased keyword).

use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        condition::ConditionOneOf, r#match::MatchValue, Condition, FieldCondition, Filter, Match,
        Range, RepeatedStrings, SearchPointsBuilder,
    },
    Qdrant,
};
use rust_decimal::prelude::ToPrimitive;

use shop_assist_config::VectorIndexSettings;
use shop_assist_core::{Error, Result, VectorHit, VectorIndex, VectorRestricts};

use crate::RetrievalError;

/// Qdrant-backed vector index client.
pub struct QdrantVectorIndex {
    client: Qdrant,
    config: VectorIndexSettings,
}

impl QdrantVectorIndex {
    pub fn new(config: VectorIndexSettings) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.endpoint);
        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| Error::from(RetrievalError::Connection(e.to_string())))?;
        Ok(Self { client, config })
    }

    fn build_filter(restricts: &VectorRestricts) -> Option<Filter> {
        let mut conditions = Vec::new();

        if let Some(ref brand) = restricts.brand {
            conditions.push(keyword_condition("brand", brand.to_lowercase()));
        }

        if !restricts.category_ids.is_empty() {
            conditions.push(Condition {
                condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                    key: "category_id".to_string(),
                    r#match: Some(Match {
                        match_value: Some(MatchValue::Keywords(RepeatedStrings {
                            strings: restricts.category_ids.clone(),
                        })),
                    }),
                    ..Default::default()
                })),
            });
        }

        let gte = restricts.bounds.min_price.and_then(|p| p.to_f64());
        let lte = restricts.bounds.max_price.and_then(|p| p.to_f64());
        if gte.is_some() || lte.is_some() {
            conditions.push(range_condition("price", gte, lte));
        }

        if let Some(min_rating) = restricts.bounds.min_rating {
            conditions.push(range_condition("rating", Some(min_rating as f64), None));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(Filter {
                must: conditions,
                ..Default::default()
            })
        }
    }
}

fn keyword_condition(key: &str, value: String) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value)),
            }),
            ..Default::default()
        })),
    }
}

fn range_condition(key: &str, gte: Option<f64>, lte: Option<f64>) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            range: Some(Range {
                gte,
                lte,
                ..Default::default()
            }),
            ..Default::default()
        })),
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        restricts: Option<&VectorRestricts>,
    ) -> Result<Vec<VectorHit>> {
        let mut builder = SearchPointsBuilder::new(
            &self.config.collection,
            vector.to_vec(),
            limit as u64,
        )
        .with_payload(false);

        if let Some(filter) = restricts.and_then(Self::build_filter) {
            builder = builder.filter(filter);
        }

        let results = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| Error::from(RetrievalError::VectorIndex(e.to_string())))?;

        let hits = results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .map(|pid| match pid.point_id_options {
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
                        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => {
                            n.to_string()
                        }
                        None => String::new(),
                    })
                    .unwrap_or_default();
                VectorHit {
                    id,
                    score: point.score,
                }
            })
            .filter(|hit| !hit.id.is_empty())
            .collect();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shop_assist_core::NumericBounds;

    #[test]
    fn test_filter_empty_restricts() {
        assert!(QdrantVectorIndex::build_filter(&VectorRestricts::default()).is_none());
    }

    #[test]
    fn test_filter_combines_all_dimensions() {
        let restricts = VectorRestricts {
            bounds: NumericBounds {
                min_price: Some(Decimal::from(100)),
                max_price: Some(Decimal::from(500)),
                min_rating: Some(4.0),
            },
            category_ids: vec!["smartphones".to_string()],
            brand: Some("Samsung".to_string()),
        };
        let filter = QdrantVectorIndex::build_filter(&restricts).unwrap();
        // brand + categories + price range + rating range
        assert_eq!(filter.must.len(), 4);
    }
}
