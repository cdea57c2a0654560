use crate::config::AppConfig;
use crate::document::TextDocument;
use crate::embeddings::Embedder;
use crate::error::{AnalysisError, Result};
use crate::models::{IntegrityReport, SourceRecord};
use crate::plagiarism::PlagiarismScorer;
use crate::ranker::{RankedSources, SourceRanker};
use crate::synthesis::Synthesizer;
use providers::hashing::{HashingProvider, DEFAULT_MAX_CHARS};
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::ProviderRegistry;
use std::sync::Arc;
use tracing::{info, warn};

const OPENAI_EMBEDDING_MAX_CHARS: usize = 8000;

/// One configured engine. Holds no per-request state, so a single instance
/// serves any number of concurrent analyses.
#[derive(Clone)]
pub struct AnalysisPipeline {
    embedder: Embedder,
    scorer: PlagiarismScorer,
    ranker: SourceRanker,
    synthesizer: Synthesizer,
}

impl AnalysisPipeline {
    pub fn new(
        embedder: Embedder,
        ranker: SourceRanker,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            embedder,
            scorer: PlagiarismScorer::new(),
            ranker,
            synthesizer,
        }
    }

    pub fn from_config(config: &AppConfig, registry: &ProviderRegistry) -> Result<Self> {
        let embedder = Embedder::from_registry(registry, &config.embeddings)?;
        info!(
            "embedding with {} ({} dims)",
            embedder.provider_name(),
            embedder.dimension()
        );
        let synthesizer = Synthesizer::from_registry(registry, config.synthesis.clone());
        Ok(Self::new(
            embedder,
            SourceRanker::new(config.ranking.clone()),
            synthesizer,
        ))
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Embed `text` and rank the corpus against it. A provider failure yields
    /// an empty ranking; empty input is an error.
    pub async fn rank_sources(&self, text: &str, corpus: &[SourceRecord]) -> Result<RankedSources> {
        match self.embedder.embed(text).await {
            Ok(vector) => Ok(self.ranker.rank(&vector, corpus)),
            Err(err) if err.is_request_error() => Err(err),
            Err(err) => {
                warn!("document embedding failed, continuing without sources: {}", err);
                Ok(RankedSources::default())
            }
        }
    }

    pub async fn analyze(&self, text: &str, corpus: &[SourceRecord]) -> Result<IntegrityReport> {
        let doc = TextDocument::new(text);
        if doc.is_blank() {
            return Err(AnalysisError::EmptyInput);
        }

        let scorer = self.scorer;
        let (ranked, plagiarism) = tokio::join!(self.rank_sources(doc.text(), corpus), async {
            scorer.score(doc.text())
        });
        let ranked = ranked?;
        let suggested = ranked.top();

        let synthesis = self
            .synthesizer
            .synthesize(doc.text(), &suggested, &plagiarism)
            .await?;

        info!(
            "analysis done: {} words, plagiarism {:.0}, {} suggested sources, {} report",
            doc.word_count(),
            plagiarism.score,
            suggested.len(),
            synthesis.source.as_str()
        );

        Ok(IntegrityReport {
            document_hash: doc.content_hash(),
            word_count: doc.word_count(),
            analysis: synthesis.result,
            analysis_source: synthesis.source,
            plagiarism,
            suggested_sources: suggested,
            skipped_sources: ranked.skipped_ids(),
        })
    }
}

/// Providers available to this process. The hashing embedder is always
/// registered; OpenAI is added when `llm.api_key` is set.
pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let max_chars = config.embeddings.max_chars.unwrap_or(DEFAULT_MAX_CHARS);
    let mut reg = ProviderRegistry::new().with_embedding(
        "hashing",
        Arc::new(HashingProvider::new(config.embeddings.dimension, max_chars)),
    );

    let api_key = config
        .llm
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty());

    if let Some(key) = api_key {
        let built = OpenAiProvider::new(OpenAiConfig {
            api_key: key,
            base_url: config.llm.base_url.clone(),
            embedding_model: config.embeddings.model.clone(),
            embedding_dimension: config.embeddings.dimension,
            embedding_max_chars: config
                .embeddings
                .max_chars
                .unwrap_or(OPENAI_EMBEDDING_MAX_CHARS),
            chat_model: config.llm.chat_model.clone(),
            max_retries: config.llm.max_retries,
            request_timeout_secs: config.llm.request_timeout_secs,
        });
        match built {
            Ok(provider) => {
                reg = reg
                    .with_embedding("openai", Arc::new(provider.clone()))
                    .with_llm("openai", Arc::new(provider))
                    .set_preferred_llm("openai");
            }
            Err(err) => warn!("OpenAI provider unavailable: {}", err),
        }
    }

    reg.set_preferred_embedding(&config.embeddings.provider)
}
