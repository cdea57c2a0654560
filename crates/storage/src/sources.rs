use crate::models::SourceRow;
use sqlx::SqlitePool;
use tracing::debug;

pub async fn load_sources(pool: &SqlitePool) -> anyhow::Result<Vec<SourceRow>> {
    let rows = sqlx::query_as::<_, SourceRow>(
        "SELECT id, title, authors_json, abstract, embedding_json, added_at FROM sources ORDER BY added_at, id",
    )
    .fetch_all(pool)
    .await?;
    debug!("loaded {} corpus sources", rows.len());
    Ok(rows)
}

/// Insert or replace a corpus entry keyed by id.
pub async fn upsert_source(
    pool: &SqlitePool,
    id: &str,
    title: &str,
    authors: &[String],
    abstract_text: &str,
    embedding_json: &str,
) -> anyhow::Result<()> {
    let authors_json = serde_json::to_string(authors)?;
    sqlx::query(
        "INSERT INTO sources (id, title, authors_json, abstract, embedding_json, added_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           title=excluded.title,
           authors_json=excluded.authors_json,
           abstract=excluded.abstract,
           embedding_json=excluded.embedding_json",
    )
    .bind(id)
    .bind(title)
    .bind(authors_json)
    .bind(abstract_text)
    .bind(embedding_json)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count_sources(pool: &SqlitePool) -> anyhow::Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
