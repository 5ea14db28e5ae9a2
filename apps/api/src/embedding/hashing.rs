use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use super::{EmbeddingError, EmbeddingProvider, EmbeddingVector};
use crate::analysis::normalize::prepare_for_matching;

/// Fixed keys keep vectors stable across processes and Rust versions.
/// Changing them changes every embedding.
const HASH_KEY_0: u64 = 0x5ca1_ab1e_0ddb_a11f;
const HASH_KEY_1: u64 = 0x0bad_cafe_feed_f00d;

/// Weight of a whole-word feature relative to one character trigram.
const WORD_WEIGHT: f32 = 2.0;

/// Deterministic local embedder using signed feature hashing.
///
/// Features are the lowercased tokens plus boundary-marked character trigrams
/// (`<ml>`, `<po`, `pos`, ...), so spelling variants such as `postgres` and
/// `postgresql` land close together. Tokens keep `+`, `#` and inner `.`, so
/// `c++`, `c#` and `node.js` stay distinct skills. No model download, no network.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(feature: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        salt.hash(&mut hasher);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let idx = (Self::hash(feature, 0) % self.dimension as u64) as usize;
        let sign = if Self::hash(feature, 1) % 2 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn embed_sync(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0_f32; self.dimension];

        for word in tokens(&prepare_for_matching(text)) {
            self.add_feature(&mut vector, word, WORD_WEIGHT);

            let marked: Vec<char> = format!("<{word}>").chars().collect();
            for gram in marked.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &gram, 1.0);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        EmbeddingVector::new(vector)
    }
}

/// Splits on everything except alphanumerics and the symbols skill names carry.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &'static str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}
