use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A corpus entry as stored. `embedding_json` is kept verbatim; parsing and
/// validation happen in the engine so one bad row never fails a load.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: String,
    pub title: String,
    pub authors_json: String,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub embedding_json: String,
    pub added_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub id: i64,
    pub document_hash: String,
    pub label: Option<String>,
    pub word_count: i64,
    pub plagiarism_score: f64,
    pub flagged_sections_json: String,
    pub suggested_sources_json: String,
    pub analysis_json: String,
    pub analysis_source: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub document_hash: String,
    pub label: Option<String>,
    pub word_count: i64,
    pub plagiarism_score: f64,
    pub flagged_sections_json: String,
    pub suggested_sources_json: String,
    pub analysis_json: String,
    pub analysis_source: String,
}
