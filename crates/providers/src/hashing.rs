//! Placeholder embedding provider.
//!
//! Produces a syntactic fingerprint: one slot per leading token, filled with a
//! rolling hash of that token scaled into `[0, 1)`. It is deterministic and
//! fixed-length but carries no semantic similarity guarantee.

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};

pub const DEFAULT_DIMENSION: usize = 100;
pub const DEFAULT_MAX_CHARS: usize = 8000;

#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
    max_chars: usize,
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION, DEFAULT_MAX_CHARS)
    }
}

impl HashingProvider {
    pub fn new(dimension: usize, max_chars: usize) -> Self {
        Self {
            dimension,
            max_chars,
        }
    }

    pub fn fingerprint(&self, text: &str) -> Vec<f32> {
        let truncated: String = text.chars().take(self.max_chars).collect();
        let lowered = truncated.to_lowercase();
        let mut vector = vec![0.0f32; self.dimension];
        for (slot, token) in vector.iter_mut().zip(lowered.split_whitespace()) {
            *slot = (token_hash(token).unsigned_abs() % 100) as f32 / 100.0;
        }
        vector
    }
}

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
fn token_hash(token: &str) -> i32 {
    token.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: texts.iter().map(|t| self.fingerprint(t)).collect(),
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_input_chars(&self) -> usize {
        self.max_chars
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
