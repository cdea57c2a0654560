use crate::config::EmbeddingConfig;
use crate::document::truncate_chars;
use crate::error::{AnalysisError, Result};
use providers::{EmbeddingProvider, ProviderError, ProviderRegistry};
use std::sync::Arc;
use tracing::debug;

/// Validates and truncates text before handing it to an embedding provider.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    max_chars: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, max_chars: Option<usize>) -> Self {
        let max_chars = max_chars.unwrap_or_else(|| provider.max_input_chars());
        Self {
            provider,
            max_chars,
        }
    }

    pub fn from_registry(registry: &ProviderRegistry, cfg: &EmbeddingConfig) -> Result<Self> {
        let provider = registry.embedding(Some(&cfg.provider))?;
        Ok(Self::new(provider, cfg.max_chars))
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let truncated = truncate_chars(text, self.max_chars);
        debug!(
            "embedding {} chars with {}",
            truncated.chars().count(),
            self.provider.name()
        );

        let resp = self.provider.embed(&[truncated.to_string()]).await?;
        let vector = resp.vectors.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("provider returned no vectors".into())
        })?;

        if vector.len() != self.dimension() {
            return Err(AnalysisError::DimensionMismatch {
                left: vector.len(),
                right: self.dimension(),
            });
        }
        Ok(vector)
    }
}
