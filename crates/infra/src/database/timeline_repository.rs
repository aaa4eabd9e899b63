//! SQLite implementation of the TimelineRepository port.
//!
//! Uses `INSERT ... ON CONFLICT(user_id, entity_type, entity_id) DO UPDATE`
//! so the sink can skip its find-then-write fallback.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use realtysync_core::TimelineRepository;
use realtysync_domain::{
    RealtySyncError, Result, StoredTimelineEntry, TimelineKey, TimelineMetadata,
};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::instrument;

use super::manager::{from_millis, map_join_error, map_sql_error, to_millis, DbManager};
use crate::errors::InfraError;

const SELECT_ENTRY: &str = "SELECT id, user_id, entry_type, entity_type, entity_id, summary,
        content, timestamp, metadata_json
    FROM timeline_entries";

/// SQLite implementation of TimelineRepository
pub struct SqliteTimelineRepository {
    db: Arc<DbManager>,
}

impl SqliteTimelineRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// All entries for a user, oldest first.
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredTimelineEntry>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_ENTRY} WHERE user_id = ?1 ORDER BY timestamp, entity_id"))
            .map_err(map_sql_error)?;

        let entries = stmt
            .query_map([user_id], map_entry_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;
        Ok(entries)
    }
}

fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<StoredTimelineEntry> {
    let metadata_json: String = row.get(8)?;
    let metadata: TimelineMetadata = serde_json::from_str(&metadata_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(StoredTimelineEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        entry_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        summary: row.get(5)?,
        content: row.get(6)?,
        timestamp: from_millis(7, row.get(7)?)?,
        metadata,
    })
}

fn metadata_json(entry: &StoredTimelineEntry) -> Result<String> {
    Ok(serde_json::to_string(&entry.metadata).map_err(InfraError::from)?)
}

#[async_trait]
impl TimelineRepository for SqliteTimelineRepository {
    fn supports_native_upsert(&self) -> bool {
        true
    }

    #[instrument(skip(self, entry), fields(entity_id = %entry.entity_id))]
    async fn upsert(&self, entry: &StoredTimelineEntry) -> Result<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let now = Utc::now().timestamp_millis();

            conn.execute(
                "INSERT INTO timeline_entries (
                    id, user_id, entry_type, entity_type, entity_id, summary, content,
                    timestamp, metadata_json, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                ON CONFLICT(user_id, entity_type, entity_id) DO UPDATE SET
                    entry_type = excluded.entry_type,
                    summary = excluded.summary,
                    content = excluded.content,
                    timestamp = excluded.timestamp,
                    metadata_json = excluded.metadata_json,
                    updated_at = excluded.updated_at",
                params![
                    entry.id,
                    entry.user_id,
                    entry.entry_type,
                    entry.entity_type,
                    entry.entity_id,
                    entry.summary,
                    entry.content,
                    to_millis(entry.timestamp),
                    metadata_json(&entry)?,
                    now,
                ],
            )
            .map_err(map_sql_error)?;

            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn find_by_key(&self, key: &TimelineKey) -> Result<Option<StoredTimelineEntry>> {
        let db = Arc::clone(&self.db);
        let key = key.clone();

        task::spawn_blocking(move || -> Result<Option<StoredTimelineEntry>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!(
                    "{SELECT_ENTRY} WHERE user_id = ?1 AND entity_type = ?2 AND entity_id = ?3"
                ),
                params![key.user_id, key.entity_type, key.entity_id],
                map_entry_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, entry), fields(entity_id = %entry.entity_id))]
    async fn create(&self, entry: &StoredTimelineEntry) -> Result<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let now = Utc::now().timestamp_millis();

            conn.execute(
                "INSERT INTO timeline_entries (
                    id, user_id, entry_type, entity_type, entity_id, summary, content,
                    timestamp, metadata_json, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    entry.id,
                    entry.user_id,
                    entry.entry_type,
                    entry.entity_type,
                    entry.entity_id,
                    entry.summary,
                    entry.content,
                    to_millis(entry.timestamp),
                    metadata_json(&entry)?,
                    now,
                ],
            )
            .map_err(map_sql_error)?;

            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, entry), fields(entity_id = %entry.entity_id))]
    async fn update(&self, entry: &StoredTimelineEntry) -> Result<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE timeline_entries SET
                        summary = ?2, content = ?3, timestamp = ?4, metadata_json = ?5,
                        updated_at = ?6
                     WHERE id = ?1",
                    params![
                        entry.id,
                        entry.summary,
                        entry.content,
                        to_millis(entry.timestamp),
                        metadata_json(&entry)?,
                        Utc::now().timestamp_millis(),
                    ],
                )
                .map_err(map_sql_error)?;

            if changed == 0 {
                return Err(RealtySyncError::NotFound(format!("timeline entry {}", entry.id)));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
