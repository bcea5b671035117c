//! HTTP embedding client
//!
//! Talks to the embedding collaborator over its REST API. Rate limiting is
//! surfaced as a distinct error and retried according to the configured
//! [`RetryPolicy`]; every other failure is returned as-is for the caller's
//! fail-soft handling.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use shop_assist_config::{EmbeddingSettings, RetryPolicy};
use shop_assist_core::{EmbeddingService, Error, Result};

use crate::RetrievalError;

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding collaborator client.
pub struct HttpEmbeddingClient {
    client: Client,
    config: EmbeddingSettings,
    retry: RetryPolicy,
}

impl HttpEmbeddingClient {
    pub fn new(config: EmbeddingSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let retry = config.retry;
        Ok(Self {
            client,
            config,
            retry,
        })
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed_once(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        let request = EmbedRequest {
            model: self.config.model.clone(),
            input: text.to_string(),
        };

        let url = format!("{}/api/embed", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("request failed: {e}")))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RetrievalError::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!("{status}: {body}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("invalid response: {e}")))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("no embedding returned".to_string()))
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingClient {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0;
        loop {
            match self.embed_once(text).await {
                Ok(vector) => return Ok(vector),
                Err(RetrievalError::RateLimited) if attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Embedding service rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_settings() {
        let client = HttpEmbeddingClient::new(EmbeddingSettings::default()).unwrap();
        assert_eq!(client.dimension(), 1024);
    }
}
