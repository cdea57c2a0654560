//! Scores a document embedding against the reference corpus.

use crate::config::RankingConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{SimilarityMatch, SourceRecord};
use crate::similarity::cosine_similarity;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedSources {
    /// Every scored source, best first. Not filtered by threshold.
    pub all: Vec<SimilarityMatch>,
    pub skipped: Vec<SkippedSource>,
    threshold: f32,
    max_matches: usize,
}

impl RankedSources {
    /// Matches above the threshold, capped at `max_matches`.
    pub fn top(&self) -> Vec<SimilarityMatch> {
        self.above_threshold()
            .take(self.max_matches)
            .cloned()
            .collect()
    }

    pub fn above_threshold(&self) -> impl Iterator<Item = &SimilarityMatch> {
        let threshold = self.threshold;
        self.all.iter().filter(move |m| m.similarity > threshold)
    }

    pub fn skipped_ids(&self) -> Vec<String> {
        self.skipped.iter().map(|s| s.id.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct SourceRanker {
    cfg: RankingConfig,
}

impl SourceRanker {
    pub fn new(cfg: RankingConfig) -> Self {
        Self { cfg }
    }

    pub fn rank(&self, doc_embedding: &[f32], corpus: &[SourceRecord]) -> RankedSources {
        let mut all = Vec::with_capacity(corpus.len());
        let mut skipped = Vec::new();

        for source in corpus {
            let scored = parse_embedding(source, doc_embedding.len())
                .and_then(|embedding| cosine_similarity(doc_embedding, &embedding));
            match scored {
                Ok(similarity) => all.push(SimilarityMatch::new(source, similarity)),
                Err(err) => {
                    warn!("skipping corpus source {}: {}", source.id, err);
                    skipped.push(SkippedSource {
                        id: source.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        // stable: equal scores keep corpus order
        all.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        debug!(
            "ranked {} sources ({} skipped), best {:?}",
            all.len(),
            skipped.len(),
            all.first().map(|m| m.similarity)
        );

        RankedSources {
            all,
            skipped,
            threshold: self.cfg.threshold,
            max_matches: self.cfg.max_matches,
        }
    }
}

/// Read a stored embedding as a flat array of finite numbers of the expected
/// length.
pub fn parse_embedding(source: &SourceRecord, expected_dim: usize) -> Result<Vec<f32>> {
    let malformed = |reason: String| AnalysisError::MalformedCorpusEntry {
        id: source.id.clone(),
        reason,
    };

    let values = match &source.embedding {
        serde_json::Value::Array(values) => values,
        serde_json::Value::String(raw) => {
            return Err(malformed(format!("unparsable embedding {:?}", truncate(raw))))
        }
        other => return Err(malformed(format!("embedding is not an array: {}", other))),
    };

    if values.len() != expected_dim {
        return Err(malformed(format!(
            "expected {} dimensions, found {}",
            expected_dim,
            values.len()
        )));
    }

    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v.as_f64().map(|x| x as f32) {
            Some(x) if x.is_finite() => Ok(x),
            Some(_) => Err(malformed(format!("value out of range at index {}", i))),
            None => Err(malformed(format!("non-numeric value at index {}", i))),
        })
        .collect()
}

fn truncate(raw: &str) -> &str {
    crate::document::truncate_chars(raw, 40)
}
