//! Agent run history: one row per completed action pipeline.

use crate::error::Error;
use crate::models::HistoryRecord;
use sqlx::{Row, SqlitePool};

/// Longest description stored for one history row.
pub const MAX_DESCRIPTION_LEN: usize = 50;

#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records one completed run. Rows are never updated afterwards.
    pub async fn append(&self, description: &str, file_paths: &[String]) -> Result<i64, Error> {
        let description = truncate(description.trim(), MAX_DESCRIPTION_LEN);
        let paths_json = serde_json::json!(file_paths).to_string();
        let result = sqlx::query(
            "INSERT INTO history (description, file_paths_json, created_at, updated_at) \
             VALUES (?1, ?2, strftime('%s','now'), strftime('%s','now'))",
        )
        .bind(description)
        .bind(paths_json)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// The most recent rows, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<HistoryRecord>, Error> {
        let rows = sqlx::query(
            "SELECT id, description, file_paths_json, created_at, updated_at \
             FROM history ORDER BY id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::new();
        for row in rows {
            let paths_json: String = row.try_get("file_paths_json")?;
            records.push(HistoryRecord {
                id: row.try_get("id")?,
                description: row.try_get("description")?,
                file_paths: serde_json::from_str(&paths_json).unwrap_or_default(),
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            });
        }
        Ok(records)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}
