use crate::models::{AnalysisRow, NewAnalysis};
use sqlx::SqlitePool;

pub async fn save_analysis(pool: &SqlitePool, analysis: &NewAnalysis) -> anyhow::Result<i64> {
    let result = sqlx::query(
        "INSERT INTO analyses (document_hash, label, word_count, plagiarism_score, flagged_sections_json,
           suggested_sources_json, analysis_json, analysis_source, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&analysis.document_hash)
    .bind(&analysis.label)
    .bind(analysis.word_count)
    .bind(analysis.plagiarism_score)
    .bind(&analysis.flagged_sections_json)
    .bind(&analysis.suggested_sources_json)
    .bind(&analysis.analysis_json)
    .bind(&analysis.analysis_source)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn analyses_for_document(
    pool: &SqlitePool,
    document_hash: &str,
) -> anyhow::Result<Vec<AnalysisRow>> {
    let rows = sqlx::query_as::<_, AnalysisRow>(
        "SELECT * FROM analyses WHERE document_hash = ? ORDER BY id",
    )
    .bind(document_hash)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
