use integrity_core::config::{RankingConfig, SynthesisConfig};
use integrity_core::embeddings::Embedder;
use integrity_core::models::AnalysisSource;
use integrity_core::ranker::SourceRanker;
use integrity_core::synthesis::{fallback_analysis, Synthesizer};
use integrity_core::{AnalysisError, AnalysisPipeline, SourceRecord};
use providers::hashing::HashingProvider;
use providers::{
    CompletionRequest, CompletionResponse, EmbedResponse, EmbeddingProvider, LlmProvider,
    ProviderError,
};
use std::sync::Arc;

const ESSAY: &str = "Coral reefs occupy less than one percent of the ocean floor yet support \
a quarter of all marine species. Rising sea surface temperatures push corals past their thermal \
tolerance and the symbiotic algae that feed them are expelled. Repeated bleaching leaves little \
time for recovery between events and reef structures begin to erode. Field surveys across the \
western Pacific recorded steep declines in live coral cover over two decades of monitoring. \
Local stressors such as sediment runoff and overfishing compound the damage done by heat. \
Restoration projects now combine larval seeding with protected areas to rebuild resilience.";

fn fingerprint(text: &str) -> serde_json::Value {
    serde_json::json!(HashingProvider::default().fingerprint(text))
}

fn source(id: &str, title: &str, embedding: serde_json::Value) -> SourceRecord {
    SourceRecord {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["M. Reyes".to_string()],
        abstract_text: String::new(),
        embedding,
    }
}

fn corpus() -> Vec<SourceRecord> {
    vec![
        source("copy", "Reef decline under warming", fingerprint(ESSAY)),
        source(
            "far",
            "Lattice chromodynamics",
            fingerprint("quantum chromodynamics lattice"),
        ),
        source("broken", "Corrupted row", serde_json::json!("[0.1, 0.2,")),
        source("short", "Wrong size", serde_json::json!([0.5, 0.5])),
    ]
}

fn pipeline(llm: Option<Arc<dyn LlmProvider>>) -> AnalysisPipeline {
    AnalysisPipeline::new(
        Embedder::new(Arc::new(HashingProvider::default()), None),
        SourceRanker::new(RankingConfig::default()),
        Synthesizer::new(llm, SynthesisConfig::default()),
    )
}

struct NonJsonModel;

#[async_trait::async_trait]
impl LlmProvider for NonJsonModel {
    async fn complete(&self, _req: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            content: "Sure! This essay is about coral reefs.".to_string(),
            model: None,
        })
    }

    fn name(&self) -> &str {
        "non-json"
    }
}

struct QuotaEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for QuotaEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Err(ProviderError::QuotaExceeded("insufficient_quota".into()))
    }

    fn dimension(&self) -> usize {
        100
    }

    fn max_input_chars(&self) -> usize {
        8000
    }

    fn name(&self) -> &str {
        "quota"
    }
}

#[tokio::test]
async fn end_to_end_without_model() {
    let report = pipeline(None).analyze(ESSAY, &corpus()).await.unwrap();

    assert_eq!(report.analysis_source, AnalysisSource::Fallback);
    assert_eq!(report.analysis, fallback_analysis(report.word_count));
    assert_eq!(report.suggested_sources.len(), 1);
    assert_eq!(report.suggested_sources[0].source_id, "copy");
    assert!((report.suggested_sources[0].similarity - 1.0).abs() < 1e-5);
    assert_eq!(report.skipped_sources, vec!["broken".to_string(), "short".to_string()]);
    assert_eq!(report.document_hash.len(), 64);
    assert!(report.plagiarism.score <= 95.0);
}

#[tokio::test]
async fn non_json_model_reply_matches_fallback() {
    let report = pipeline(Some(Arc::new(NonJsonModel)))
        .analyze(ESSAY, &corpus())
        .await
        .unwrap();
    assert_eq!(report.analysis_source, AnalysisSource::Fallback);
    assert_eq!(report.analysis, fallback_analysis(report.word_count));
}

#[tokio::test]
async fn empty_and_short_inputs_are_request_errors() {
    let p = pipeline(None);
    assert!(matches!(
        p.analyze("", &corpus()).await,
        Err(AnalysisError::EmptyInput)
    ));
    assert!(matches!(
        p.analyze("  \n ", &corpus()).await,
        Err(AnalysisError::EmptyInput)
    ));
    assert!(matches!(
        p.analyze("Too short to analyse.", &corpus()).await,
        Err(AnalysisError::InputTooShort { .. })
    ));
}

#[tokio::test]
async fn embedding_outage_still_produces_a_report() {
    let p = AnalysisPipeline::new(
        Embedder::new(Arc::new(QuotaEmbedder), None),
        SourceRanker::new(RankingConfig::default()),
        Synthesizer::new(None, SynthesisConfig::default()),
    );
    let report = p.analyze(ESSAY, &corpus()).await.unwrap();
    assert!(report.suggested_sources.is_empty());
    assert!(report.skipped_sources.is_empty());
    assert_eq!(report.analysis_source, AnalysisSource::Fallback);
}

#[tokio::test]
async fn report_serializes_with_stable_keys() {
    let report = pipeline(None).analyze(ESSAY, &corpus()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    for key in [
        "document_hash",
        "word_count",
        "analysis",
        "analysis_source",
        "plagiarism",
        "suggested_sources",
        "skipped_sources",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["analysis_source"], "fallback");
    assert_eq!(json["analysis"]["academic_level"], "Undergraduate");
    assert!(json["suggested_sources"][0].get("abstract").is_some());
}
