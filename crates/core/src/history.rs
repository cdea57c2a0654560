//! Persisting finished reports through the storage collaborator.

use crate::models::IntegrityReport;
use sqlx::SqlitePool;
use storage::models::NewAnalysis;

pub fn to_record(report: &IntegrityReport, label: Option<&str>) -> anyhow::Result<NewAnalysis> {
    Ok(NewAnalysis {
        document_hash: report.document_hash.clone(),
        label: label.map(str::to_string),
        word_count: report.word_count as i64,
        plagiarism_score: f64::from(report.plagiarism.score),
        flagged_sections_json: serde_json::to_string(&report.plagiarism.flagged_sections())?,
        suggested_sources_json: serde_json::to_string(&report.suggested_sources)?,
        analysis_json: serde_json::to_string(&report.analysis)?,
        analysis_source: report.analysis_source.as_str().to_string(),
    })
}

pub async fn save(
    pool: &SqlitePool,
    report: &IntegrityReport,
    label: Option<&str>,
) -> anyhow::Result<i64> {
    let record = to_record(report, label)?;
    storage::analyses::save_analysis(pool, &record).await
}
