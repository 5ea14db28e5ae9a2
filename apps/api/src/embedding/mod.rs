//! Embedding providers — the only way the service turns text into vectors.
//!
//! `GapAnalyzer` and `RolePredictor` hold an `Arc<dyn EmbeddingProvider>` chosen
//! at startup: remote when `EMBEDDING_URL` is set and reachable, local hashing
//! otherwise, and `DegradedEmbedder` when the remote probe fails.

use async_trait::async_trait;
use thiserror::Error;

pub mod hashing;
pub mod remote;

/// Dimension of the sentence-transformer model the service was built around.
pub const DEFAULT_DIMENSION: usize = 768;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixed-dimension vector for a phrase or text block.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    /// True when the provider only returns placeholder vectors.
    fn is_degraded(&self) -> bool {
        false
    }

    /// Why the provider is degraded, when it is.
    fn degraded_reason(&self) -> Option<&str> {
        None
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

/// Stand-in used when no real provider could be initialized.
///
/// Keeps the dimensionality contract with zero vectors; callers must check
/// `is_degraded()` and surface degraded mode instead of trusting similarities.
pub struct DegradedEmbedder {
    dimension: usize,
    reason: String,
}

impl DegradedEmbedder {
    pub fn new(dimension: usize, reason: impl Into<String>) -> Self {
        Self {
            dimension,
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl EmbeddingProvider for DegradedEmbedder {
    fn name(&self) -> &'static str {
        "degraded"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_degraded(&self) -> bool {
        true
    }

    fn degraded_reason(&self) -> Option<&str> {
        Some(self.reason())
    }

    async fn embed(&self, _text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(EmbeddingVector::zeros(self.dimension))
    }
}
