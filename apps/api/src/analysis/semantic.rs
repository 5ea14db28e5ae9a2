//! Semantic Similarity Matcher — thresholded max-cosine equivalence between skills.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

/// Default cosine similarity at which two skill phrases count as equivalent.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;

/// Cosine similarity in [-1, 1]; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Highest similarity between `candidate` and any of `pool`; `None` for an empty pool.
pub fn max_similarity(candidate: &EmbeddingVector, pool: &[EmbeddingVector]) -> Option<f32> {
    pool.iter()
        .map(|v| cosine_similarity(candidate.as_slice(), v.as_slice()))
        .reduce(f32::max)
}

/// A job skill is satisfied when some resume skill reaches `threshold`.
/// An empty resume never satisfies anything.
pub fn is_satisfied(candidate: &EmbeddingVector, pool: &[EmbeddingVector], threshold: f32) -> bool {
    max_similarity(candidate, pool).is_some_and(|best| best >= threshold)
}

/// Per-analysis memo over an embedding provider. Dropped when the analysis ends.
pub struct MemoizedEmbedder<'a> {
    provider: &'a dyn EmbeddingProvider,
    cache: HashMap<String, EmbeddingVector>,
}

impl<'a> MemoizedEmbedder<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self {
            provider,
            cache: HashMap::new(),
        }
    }

    pub async fn embed(&mut self, phrase: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let key = phrase.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let vector = self.provider.embed(phrase).await?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Job skills not semantically satisfied by the resume skills, in job order.
///
/// Fails with `EmbeddingError::Unavailable` when the provider is degraded so the
/// caller can report it rather than trust all-zero similarities.
pub async fn unsatisfied_skills(
    provider: &dyn EmbeddingProvider,
    job_skills: &[String],
    resume_skills: &[String],
    threshold: f32,
) -> Result<Vec<String>, EmbeddingError> {
    if provider.is_degraded() {
        return Err(EmbeddingError::Unavailable(format!(
            "provider '{}' is running in degraded mode",
            provider.name()
        )));
    }

    let mut memo = MemoizedEmbedder::new(provider);

    let mut resume_vectors = Vec::with_capacity(resume_skills.len());
    for skill in resume_skills {
        resume_vectors.push(memo.embed(skill).await?);
    }

    let mut missing = Vec::new();
    for skill in job_skills {
        let vector = memo.embed(skill).await?;
        if !is_satisfied(&vector, &resume_vectors, threshold) {
            missing.push(skill.clone());
        }
    }

    debug!(
        provider = provider.name(),
        phrases = memo.cached(),
        missing = missing.len(),
        "semantic comparison complete"
    );
    Ok(missing)
}
