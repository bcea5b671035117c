//! Reranker adapter
//!
//! Second-pass relevance scoring of the filtered candidate set against the
//! original free-text query. Reranking is a quality refinement, never a
//! hard dependency: sets at or below the page size skip it, and any
//! collaborator failure falls back to the pre-rerank order truncated to
//! the page size.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use shop_assist_config::RerankSettings;
use shop_assist_core::{CatalogItem, Error, RerankDocument, RerankService, Result};

use crate::RetrievalError;

/// Adapter around the reranking collaborator.
pub struct RerankAdapter {
    service: Option<Arc<dyn RerankService>>,
    page_size: usize,
    snippet_chars: usize,
    timeout: Duration,
}

impl RerankAdapter {
    pub fn new(
        service: Option<Arc<dyn RerankService>>,
        page_size: usize,
        snippet_chars: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            page_size,
            snippet_chars,
            timeout,
        }
    }

    /// Render one candidate to the short document the cross-encoder scores.
    fn render_document(&self, item: &CatalogItem) -> RerankDocument {
        let snippet: String = item.description.chars().take(self.snippet_chars).collect();
        let brand = item.brand.as_deref().unwrap_or("unbranded");
        RerankDocument {
            id: item.id.clone(),
            text: format!("{} | {} | {} | {}", item.name, brand, item.category, snippet),
        }
    }

    /// Rerank `items` against `query`, or degrade to the first page of the
    /// incoming order.
    pub async fn rerank(&self, query: Option<&str>, mut items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        if items.len() <= self.page_size {
            // too small to reorder meaningfully; not worth the latency
            return items;
        }

        let (Some(service), Some(query)) = (self.service.as_ref(), query) else {
            items.truncate(self.page_size);
            return items;
        };

        let documents: Vec<RerankDocument> =
            items.iter().map(|i| self.render_document(i)).collect();

        let ranked = tokio::time::timeout(
            self.timeout,
            service.rerank(query, &documents, self.page_size),
        )
        .await;

        match ranked {
            Ok(Ok(ids)) if !ids.is_empty() => {
                let mut by_id: HashMap<String, CatalogItem> =
                    items.into_iter().map(|i| (i.id.clone(), i)).collect();
                ids.into_iter()
                    .filter_map(|id| by_id.remove(&id))
                    .take(self.page_size)
                    .collect()
            }
            Ok(Ok(_)) => {
                tracing::warn!("Reranker returned no ids, falling back to pre-rerank order");
                items.truncate(self.page_size);
                items
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Rerank failed, falling back to pre-rerank order");
                items.truncate(self.page_size);
                items
            }
            Err(_) => {
                tracing::warn!("Rerank timed out, falling back to pre-rerank order");
                items.truncate(self.page_size);
                items
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<RerankRequestDoc<'a>>,
    top_n: usize,
}

#[derive(Debug, Serialize)]
struct RerankRequestDoc<'a> {
    id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResponseEntry>,
}

#[derive(Debug, Deserialize)]
struct RerankResponseEntry {
    id: String,
    #[allow(dead_code)]
    score: Option<f32>,
}

/// Reranking collaborator client.
pub struct HttpRerankClient {
    client: Client,
    config: RerankSettings,
}

impl HttpRerankClient {
    pub fn new(config: RerankSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Rerank(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RerankService for HttpRerankClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        limit: usize,
    ) -> Result<Vec<String>> {
        let request = RerankRequest {
            model: &self.config.model,
            query,
            documents: documents
                .iter()
                .map(|d| RerankRequestDoc {
                    id: &d.id,
                    text: &d.text,
                })
                .collect(),
            top_n: limit,
        };

        let url = format!("{}/rerank", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from(RetrievalError::Rerank(format!("request failed: {e}"))))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Rerank(format!("{status}: {body}")).into());
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::from(RetrievalError::Rerank(format!("invalid response: {e}"))))?;

        Ok(parsed
            .results
            .into_iter()
            .take(limit)
            .map(|r| r.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("item {id}"),
            brand: Some("Acme".to_string()),
            category: "Gadgets".to_string(),
            price: Decimal::from(10),
            rating: Some(4.0),
            description: "a".repeat(400),
            thumbnail: None,
            in_stock: true,
        }
    }

    fn items(n: usize) -> Vec<CatalogItem> {
        (0..n).map(|i| item(&format!("i{i}"))).collect()
    }

    struct OrderReversingService;

    #[async_trait]
    impl RerankService for OrderReversingService {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[RerankDocument],
            limit: usize,
        ) -> Result<Vec<String>> {
            Ok(documents
                .iter()
                .rev()
                .take(limit)
                .map(|d| d.id.clone())
                .collect())
        }
    }

    struct FailingService;

    #[async_trait]
    impl RerankService for FailingService {
        async fn rerank(
            &self,
            _query: &str,
            _documents: &[RerankDocument],
            _limit: usize,
        ) -> Result<Vec<String>> {
            Err(Error::Rerank("unavailable".to_string()))
        }
    }

    fn adapter(service: Option<Arc<dyn RerankService>>) -> RerankAdapter {
        RerankAdapter::new(service, 10, 160, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_small_set_returned_unchanged() {
        let adapter = adapter(Some(Arc::new(OrderReversingService)));
        let result = adapter.rerank(Some("query"), items(5)).await;
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i0", "i1", "i2", "i3", "i4"]);
    }

    #[tokio::test]
    async fn test_rerank_reorders_and_truncates() {
        let adapter = adapter(Some(Arc::new(OrderReversingService)));
        let result = adapter.rerank(Some("query"), items(15)).await;
        assert_eq!(result.len(), 10);
        assert_eq!(result[0].id, "i14");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_pre_rerank_order() {
        let adapter = adapter(Some(Arc::new(FailingService)));
        let result = adapter.rerank(Some("query"), items(15)).await;
        assert_eq!(result.len(), 10);
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids[0], "i0");
        assert_eq!(ids[9], "i9");
    }

    #[tokio::test]
    async fn test_no_service_truncates() {
        let adapter = adapter(None);
        let result = adapter.rerank(Some("query"), items(12)).await;
        assert_eq!(result.len(), 10);
        assert_eq!(result[0].id, "i0");
    }

    #[tokio::test]
    async fn test_document_rendering_truncates_description() {
        let adapter = adapter(None);
        let doc = adapter.render_document(&item("x"));
        assert!(doc.text.contains("item x"));
        assert!(doc.text.contains("Acme"));
        assert!(doc.text.len() < 400);
    }
}
