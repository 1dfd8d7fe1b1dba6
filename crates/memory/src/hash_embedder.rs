//! Deterministic local embedder — feature hashing over word tokens.
//!
//! Each lowercase alphanumeric token is hashed into one of `dimension`
//! buckets with a sign bit; the resulting bag-of-words vector is
//! L2-normalized. The same text always produces the same vector, texts
//! sharing vocabulary land near each other, and no network or model files
//! are needed — which is what the memory layer requires of an embedder
//! before a remote embedding model is configured.

use async_trait::async_trait;
use memoclaw_core::error::MemoryError;
use memoclaw_core::memory::Embedder;

/// Default embedding dimension.
pub const DEFAULT_DIMENSION: usize = 256;

/// A deterministic feature-hashing embedder.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(2),
        }
    }

    /// FNV-1a over the token bytes.
    fn hash_token(token: &str) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325;
        for b in token.bytes() {
            hash ^= b as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::hash_token(token);
            let bucket = (hash % self.dimension as u64) as usize;
            // One hash bit decides the sign so collisions can cancel
            // instead of always accumulating.
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "feature_hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        Ok(self.embed_sync(text))
    }
}
