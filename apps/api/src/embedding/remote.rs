//! Remote embedding provider for an OpenAI-compatible `/embeddings` endpoint
//! (e.g. a sentence-transformers server hosting `all-mpnet-base-v2`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct RemoteEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

impl RemoteEmbedder {
    pub fn new(
        url: String,
        api_key: Option<String>,
        model: String,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            api_key,
            model,
            dimension,
        })
    }

    /// One round-trip used at startup to decide between this provider and degraded mode.
    pub async fn probe(&self) -> Result<(), EmbeddingError> {
        self.embed("health check").await.map(|_| ())
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    /// Retries on 429 and 5xx with exponential backoff (500ms, 1s).
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "embedding request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let raw = response.text().await?;
            let vector = parse_embedding_response(&raw, self.dimension)?;
            debug!(chars = text.len(), "remote embedding fetched");
            return Ok(vector);
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::Unavailable(format!("no response after {MAX_RETRIES} attempts"))
        }))
    }
}

/// Extracts the first embedding and enforces the configured dimension.
fn parse_embedding_response(raw: &str, dimension: usize) -> Result<EmbeddingVector, EmbeddingError> {
    let parsed: EmbeddingResponse = serde_json::from_str(raw)?;
    let values = parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| EmbeddingError::Unavailable("response contained no embeddings".into()))?;

    let vector = EmbeddingVector::new(values);
    if vector.dimension() != dimension {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimension,
            actual: vector.dimension(),
        });
    }
    Ok(vector)
}
