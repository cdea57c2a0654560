//! Loading the reference corpus from its collaborators.

use crate::embeddings::Embedder;
use crate::models::SourceRecord;
use anyhow::Context;
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::Path;
use storage::models::SourceRow;
use tracing::{debug, warn};

impl From<SourceRow> for SourceRecord {
    fn from(row: SourceRow) -> Self {
        let authors = serde_json::from_str(&row.authors_json).unwrap_or_else(|e| {
            warn!("source {} has unreadable authors: {}", row.id, e);
            Vec::new()
        });
        // keep unparsable text as a string so ranking can report it
        let embedding = serde_json::from_str(&row.embedding_json)
            .unwrap_or(Value::String(row.embedding_json));
        SourceRecord {
            id: row.id,
            title: row.title,
            authors,
            abstract_text: row.abstract_text,
            embedding,
        }
    }
}

/// Read a JSON array of source records.
pub fn load_json(path: &Path) -> anyhow::Result<Vec<SourceRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading corpus {}", path.display()))?;
    let records: Vec<SourceRecord> = serde_json::from_str(&content)
        .with_context(|| format!("parsing corpus {}", path.display()))?;
    debug!("loaded {} sources from {}", records.len(), path.display());
    Ok(records)
}

pub async fn load_db(pool: &SqlitePool) -> anyhow::Result<Vec<SourceRecord>> {
    let rows = storage::sources::load_sources(pool).await?;
    Ok(rows.into_iter().map(SourceRecord::from).collect())
}

/// Store records, serializing each embedding back to JSON text.
pub async fn import(pool: &SqlitePool, records: &[SourceRecord]) -> anyhow::Result<usize> {
    for record in records {
        storage::sources::upsert_source(
            pool,
            &record.id,
            &record.title,
            &record.authors,
            &record.abstract_text,
            &record.embedding.to_string(),
        )
        .await
        .with_context(|| format!("importing source {}", record.id))?;
    }
    Ok(records.len())
}

/// Embed `title` and `abstract` for records that arrived without an
/// embedding. Returns how many were filled.
pub async fn embed_missing(
    embedder: &Embedder,
    records: &mut [SourceRecord],
) -> crate::error::Result<usize> {
    let mut filled = 0;
    for record in records.iter_mut().filter(|r| r.embedding.is_null()) {
        let text = format!("{}. {}", record.title, record.abstract_text);
        let vector = embedder.embed(&text).await?;
        record.embedding = serde_json::json!(vector);
        filled += 1;
    }
    if filled > 0 {
        debug!("embedded {} corpus entries with {}", filled, embedder.provider_name());
    }
    Ok(filled)
}
