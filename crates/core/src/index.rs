//! Persistent per-file metadata store, keyed by path.

use crate::error::Error;
use crate::models::{FileRecord, NewFileRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use std::collections::HashMap;

#[derive(Clone)]
pub struct TagIndex {
    pool: SqlitePool,
}

impl TagIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn find_by_path(&self, path: &str) -> Result<Option<FileRecord>, Error> {
        let row = sqlx::query(
            "SELECT path, name, type, description, size, last_modified, created_at, updated_at \
             FROM files WHERE path = ?1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = record_from_row(&row)?;
        let mut tag_map = self.tags_for_paths(&[record.path.clone()]).await?;
        record.tags = tag_map.remove(&record.path).unwrap_or_default();
        Ok(Some(record))
    }

    /// Any-of membership match: a record is returned when it carries at
    /// least one of the given tags.
    pub async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<FileRecord>, Error> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::new(
            "SELECT DISTINCT f.path, f.name, f.type, f.description, f.size, f.last_modified, \
             f.created_at, f.updated_at \
             FROM files f \
             JOIN file_tags ft ON ft.file_id = f.id \
             JOIN tags t ON t.id = ft.tag_id \
             WHERE t.name IN (",
        );
        let mut separated = qb.separated(", ");
        for tag in tags {
            separated.push_bind(tag);
        }
        separated.push_unseparated(")");
        qb.push(" ORDER BY f.path");
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let paths: Vec<String> = records.iter().map(|r| r.path.clone()).collect();
        let mut tag_map = self.tags_for_paths(&paths).await?;
        for record in &mut records {
            record.tags = tag_map.remove(&record.path).unwrap_or_default();
        }
        Ok(records)
    }

    /// The deduplicated union of tags across all records. Tags no longer
    /// attached to any file drop out of the vocabulary.
    pub async fn all_tags(&self) -> Result<Vec<String>, Error> {
        let rows = sqlx::query(
            "SELECT DISTINCT t.name FROM tags t JOIN file_tags ft ON ft.tag_id = t.id \
             ORDER BY t.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// Fails with `AlreadyExists` when the path is present; the stored
    /// record is left untouched in that case.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<(), Error> {
        let result = sqlx::query(
            "INSERT INTO files (path, name, type, description, size, last_modified, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%s','now'), strftime('%s','now'))",
        )
        .bind(&record.path)
        .bind(&record.name)
        .bind(&record.file_type)
        .bind(&record.description)
        .bind(record.size as i64)
        .bind(record.last_modified)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    return Err(Error::AlreadyExists(record.path.clone()));
                }
            }
            return Err(err.into());
        }

        for tag in &record.tags {
            sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?1)")
                .bind(tag)
                .execute(&self.pool)
                .await?;
            sqlx::query(
                "INSERT OR IGNORE INTO file_tags (file_id, tag_id) \
                 VALUES ((SELECT id FROM files WHERE path = ?1), \
                         (SELECT id FROM tags WHERE name = ?2))",
            )
            .bind(&record.path)
            .bind(tag)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn remove(&self, path: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM file_tags WHERE file_id = (SELECT id FROM files WHERE path = ?1)")
            .bind(path)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM files WHERE path = ?1")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn tags_for_paths(
        &self,
        paths: &[String],
    ) -> Result<HashMap<String, Vec<String>>, Error> {
        if paths.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb = QueryBuilder::new(
            "SELECT f.path, GROUP_CONCAT(t.name, ',') AS tags FROM files f \
             LEFT JOIN file_tags ft ON ft.file_id = f.id \
             LEFT JOIN tags t ON t.id = ft.tag_id \
             WHERE f.path IN (",
        );
        let mut separated = qb.separated(", ");
        for path in paths {
            separated.push_bind(path);
        }
        separated.push_unseparated(")");
        qb.push(" GROUP BY f.path");
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut map = HashMap::new();
        for row in rows {
            let path: String = row.get(0);
            let tags_col: Option<String> = row.try_get(1).ok().flatten();
            let tags: Vec<String> = tags_col
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string())
                .collect();
            map.insert(path, tags);
        }
        Ok(map)
    }
}

fn record_from_row(row: &SqliteRow) -> Result<FileRecord, Error> {
    Ok(FileRecord {
        path: row.try_get("path")?,
        name: row.try_get("name")?,
        file_type: row.try_get("type")?,
        description: row.try_get("description")?,
        tags: Vec::new(),
        size: row.try_get::<i64, _>("size")? as u64,
        last_modified: row.try_get("last_modified")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
