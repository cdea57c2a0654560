//! Turns ranked sources and heuristic signals into an [`AnalysisResult`].
//!
//! A language model is asked for the report when one is configured. Anything
//! other than a well-formed answer (transport failure, timeout, bad JSON,
//! missing keys) drops to a deterministic rule-based report instead.

use crate::config::SynthesisConfig;
use crate::document::truncate_chars;
use crate::error::{AnalysisError, Result};
use crate::models::{AcademicLevel, AnalysisResult, AnalysisSource, SimilarityMatch, WritingQuality};
use crate::plagiarism::PlagiarismReport;
use providers::{CompletionRequest, LlmProvider, ProviderRegistry};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MIN_SYNTHESIS_CHARS: usize = 50;
pub const FALLBACK_CONFIDENCE: f32 = 0.6;
const GRADUATE_WORD_COUNT: usize = 2000;
const MAX_THEMES: usize = 5;
const MIN_THEMES: usize = 2;
const DEFAULT_MODEL_CONFIDENCE: f32 = 0.8;
const TRUNCATION_MARKER: &str = "\n[... text truncated ...]";

const SYSTEM_PROMPT: &str = "You are an academic writing analyst. Reply with one JSON object and \
nothing else. Required keys: \"topic\" (string), \"academic_level\" (one of \"High School\", \
\"Undergraduate\", \"Master/Graduate\", \"PhD\"), \"key_themes\" (array of 2 to 5 strings), \
\"research_suggestions\" (string). Optional keys: \"citation_recommendations\" (string), \
\"writing_quality\" (one of \"Poor\", \"Average\", \"Good\", \"Excellent\"), \"strengths\" (array \
of strings), \"improvement_areas\" (array of strings), \"confidence_score\" (number between 0 and 1).";

const REQUIRED_KEYS: [&str; 4] = ["topic", "academic_level", "key_themes", "research_suggestions"];

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
}

#[derive(Clone)]
pub struct Synthesizer {
    llm: Option<Arc<dyn LlmProvider>>,
    cfg: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, cfg: SynthesisConfig) -> Self {
        Self { llm, cfg }
    }

    /// Pick the configured model, or the registry's preferred one. No model
    /// means every report is rule-based.
    pub fn from_registry(registry: &ProviderRegistry, cfg: SynthesisConfig) -> Self {
        let llm = match registry.llm(cfg.provider.as_deref()) {
            Ok(llm) => Some(llm),
            Err(err) => {
                debug!("no language model for synthesis: {}", err);
                None
            }
        };
        Self::new(llm, cfg)
    }

    pub async fn synthesize(
        &self,
        text: &str,
        sources: &[SimilarityMatch],
        report: &PlagiarismReport,
    ) -> Result<Synthesis> {
        let chars = text.chars().count();
        if chars < MIN_SYNTHESIS_CHARS {
            return Err(AnalysisError::InputTooShort {
                operation: "synthesis",
                minimum: MIN_SYNTHESIS_CHARS,
                actual: chars,
            });
        }
        let word_count = text.split_whitespace().count();

        let Some(llm) = &self.llm else {
            info!("no language model configured, using rule-based analysis");
            return Ok(fallback(word_count));
        };

        match self.ask_model(llm.as_ref(), text, word_count, sources, report).await {
            Ok(result) => Ok(Synthesis {
                result,
                source: AnalysisSource::Model,
            }),
            Err(err) => {
                warn!("model analysis unavailable, using rule-based analysis: {}", err);
                Ok(fallback(word_count))
            }
        }
    }

    async fn ask_model(
        &self,
        llm: &dyn LlmProvider,
        text: &str,
        word_count: usize,
        sources: &[SimilarityMatch],
        report: &PlagiarismReport,
    ) -> Result<AnalysisResult> {
        let req = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(text, word_count, sources, report, &self.cfg),
            json_mode: true,
        };

        let timeout = Duration::from_secs(self.cfg.timeout_secs);
        let resp = tokio::time::timeout(timeout, llm.complete(&req))
            .await
            .map_err(|_| providers::ProviderError::Timeout(self.cfg.timeout_secs))??;

        debug!(
            "{} answered with {} chars",
            resp.model.as_deref().unwrap_or(llm.name()),
            resp.content.len()
        );
        parse_model_response(&resp.content)
    }
}

pub fn build_prompt(
    text: &str,
    word_count: usize,
    sources: &[SimilarityMatch],
    report: &PlagiarismReport,
    cfg: &SynthesisConfig,
) -> String {
    let body = truncate_chars(text, cfg.max_prompt_chars);
    let mut prompt = format!(
        "Analyze this academic document ({} words).\n\nDocument:\n{}",
        word_count, body
    );
    if body.len() < text.len() {
        prompt.push_str(TRUNCATION_MARKER);
    }

    prompt.push_str("\n\nSimilar sources from the reference corpus:\n");
    if sources.is_empty() {
        prompt.push_str("(none above the similarity threshold)\n");
    }
    for (i, source) in sources.iter().take(cfg.prompt_sources).enumerate() {
        let authors = if source.authors.is_empty() {
            "unknown authors".to_string()
        } else {
            source.authors.join(", ")
        };
        let _ = writeln!(
            prompt,
            "{}. \"{}\" by {} ({:.1}% similar)",
            i + 1,
            source.title,
            authors,
            source.similarity * 100.0
        );
    }

    let _ = write!(
        prompt,
        "\nHeuristic plagiarism score: {:.0}/95",
        report.score
    );
    for flagged in report.flagged_sections() {
        let _ = write!(prompt, "\n- {}", flagged);
    }
    prompt.push_str(
        "\n\nIdentify the topic, academic level and key themes, then suggest further research \
         and citations. Answer with the JSON object only.",
    );
    prompt
}

/// Validate a model answer. Anything short of all required keys with usable
/// values is rejected.
pub fn parse_model_response(content: &str) -> Result<AnalysisResult> {
    let invalid = |msg: String| AnalysisError::InvalidModelResponse(msg);

    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| invalid(format!("not JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_string()))?;

    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !obj.contains_key(**k)) {
        return Err(invalid(format!("missing key {}", missing)));
    }

    let topic = obj["topic"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("topic must be a non-empty string".to_string()))?
        .to_string();

    let academic_level = obj["academic_level"]
        .as_str()
        .and_then(AcademicLevel::parse)
        .ok_or_else(|| invalid(format!("unrecognised academic_level {}", obj["academic_level"])))?;

    let mut key_themes = string_list(&obj["key_themes"])
        .ok_or_else(|| invalid("key_themes must be an array of strings".to_string()))?;
    if key_themes.len() < MIN_THEMES {
        return Err(invalid(format!(
            "expected at least {} key themes, got {}",
            MIN_THEMES,
            key_themes.len()
        )));
    }
    key_themes.truncate(MAX_THEMES);

    let research_suggestions = text_field(&obj["research_suggestions"])
        .ok_or_else(|| invalid("research_suggestions must be text".to_string()))?;

    let citation_recommendations = optional(obj, "citation_recommendations")
        .and_then(text_field)
        .unwrap_or_else(|| FALLBACK_CITATIONS.to_string());

    let writing_quality = optional(obj, "writing_quality")
        .and_then(Value::as_str)
        .and_then(WritingQuality::parse);

    let confidence_score = optional(obj, "confidence_score")
        .and_then(Value::as_f64)
        .map(|c| (c as f32).clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    Ok(AnalysisResult {
        topic,
        academic_level,
        key_themes,
        writing_quality,
        research_suggestions,
        citation_recommendations,
        strengths: optional(obj, "strengths").and_then(string_list),
        improvement_areas: optional(obj, "improvement_areas").and_then(string_list),
        confidence_score,
    })
}

fn optional<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| s.as_deref() != Some(""))
        .collect()
}

/// A string, or a list of strings joined into one paragraph.
fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(_) => string_list(value)
            .filter(|items| !items.is_empty())
            .map(|items| items.join(" ")),
        _ => None,
    }
}

const FALLBACK_TOPIC: &str = "General Academic Research";
const FALLBACK_THEMES: [&str; 3] = [
    "Research Methodology",
    "Literature Review",
    "Critical Analysis",
];
const FALLBACK_RESEARCH: &str = "Broaden the literature base with recent peer-reviewed work on \
the central question, compare competing methodological approaches, and state the limitations \
of the evidence explicitly.";
const FALLBACK_CITATIONS: &str = "Cite primary sources for every factual claim, follow one \
citation style consistently (APA, MLA or Chicago), and attribute paraphrased material as \
carefully as direct quotations.";

/// The rule-based report. Depends only on the word count.
pub fn fallback_analysis(word_count: usize) -> AnalysisResult {
    let academic_level = if word_count > GRADUATE_WORD_COUNT {
        AcademicLevel::MasterGraduate
    } else {
        AcademicLevel::Undergraduate
    };
    AnalysisResult {
        topic: FALLBACK_TOPIC.to_string(),
        academic_level,
        key_themes: FALLBACK_THEMES.iter().map(|t| t.to_string()).collect(),
        writing_quality: None,
        research_suggestions: FALLBACK_RESEARCH.to_string(),
        citation_recommendations: FALLBACK_CITATIONS.to_string(),
        strengths: None,
        improvement_areas: None,
        confidence_score: FALLBACK_CONFIDENCE,
    }
}

fn fallback(word_count: usize) -> Synthesis {
    Synthesis {
        result: fallback_analysis(word_count),
        source: AnalysisSource::Fallback,
    }
}
