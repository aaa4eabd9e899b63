//! SQLite implementation of the SyncAccountRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use realtysync_core::SyncAccountRepository;
use realtysync_domain::{RealtySyncError, Result, SyncAccount};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::{from_millis, map_join_error, map_sql_error, to_millis, DbManager};

const SELECT_ACCOUNT: &str =
    "SELECT id, user_id, provider, sync_enabled, last_sync_at FROM sync_accounts";

/// SQLite implementation of SyncAccountRepository
pub struct SqliteSyncAccountRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncAccountRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or update an account's identity and enabled flag.
    ///
    /// The cursor is only written on insert; existing cursors are left to
    /// `update_last_sync`.
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub fn upsert_account(&self, account: &SyncAccount) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO sync_accounts (
                id, user_id, provider, sync_enabled, last_sync_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                provider = excluded.provider,
                sync_enabled = excluded.sync_enabled,
                updated_at = excluded.updated_at",
            params![
                account.id,
                account.user_id,
                account.provider,
                account.sync_enabled,
                account.last_sync_at.map(to_millis),
                now,
            ],
        )
        .map_err(map_sql_error)?;

        Ok(())
    }

    /// Toggle sync for an account.
    pub fn set_sync_enabled(&self, account_id: &str, enabled: bool) -> Result<()> {
        let conn = self.db.get_connection()?;
        let changed = conn
            .execute(
                "UPDATE sync_accounts SET sync_enabled = ?2, updated_at = ?3 WHERE id = ?1",
                params![account_id, enabled, Utc::now().timestamp_millis()],
            )
            .map_err(map_sql_error)?;

        if changed == 0 {
            return Err(RealtySyncError::NotFound(format!("sync account {account_id}")));
        }
        Ok(())
    }
}

fn map_account_row(row: &Row<'_>) -> rusqlite::Result<SyncAccount> {
    let last_sync_at: Option<i64> = row.get(4)?;
    Ok(SyncAccount {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider: row.get(2)?,
        sync_enabled: row.get(3)?,
        last_sync_at: last_sync_at.map(|millis| from_millis(4, millis)).transpose()?,
    })
}

#[async_trait]
impl SyncAccountRepository for SqliteSyncAccountRepository {
    #[instrument(skip(self))]
    async fn list_enabled(&self) -> Result<Vec<SyncAccount>> {
        let db = Arc::clone(&self.db);

        let accounts = task::spawn_blocking(move || -> Result<Vec<SyncAccount>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("{SELECT_ACCOUNT} WHERE sync_enabled = 1 ORDER BY id"))
                .map_err(map_sql_error)?;

            let accounts = stmt
                .query_map([], map_account_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(accounts)
        })
        .await
        .map_err(map_join_error)??;

        debug!(count = accounts.len(), "loaded enabled sync accounts");
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, account_id: &str) -> Result<Option<SyncAccount>> {
        let db = Arc::clone(&self.db);
        let account_id = account_id.to_string();

        task::spawn_blocking(move || -> Result<Option<SyncAccount>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("{SELECT_ACCOUNT} WHERE id = ?1"),
                [&account_id],
                map_account_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn update_last_sync(&self, account_id: &str, synced_at: DateTime<Utc>) -> Result<()> {
        let db = Arc::clone(&self.db);
        let account_id = account_id.to_string();
        let synced_at = to_millis(synced_at);

        let advanced = task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE sync_accounts SET last_sync_at = ?2, updated_at = ?3
                     WHERE id = ?1 AND (last_sync_at IS NULL OR last_sync_at < ?2)",
                    params![account_id, synced_at, Utc::now().timestamp_millis()],
                )
                .map_err(map_sql_error)?;
            if changed > 0 {
                return Ok(true);
            }

            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM sync_accounts WHERE id = ?1)",
                    [&account_id],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            if !exists {
                return Err(RealtySyncError::NotFound(format!("sync account {account_id}")));
            }
            Ok(false)
        })
        .await
        .map_err(map_join_error)??;

        if !advanced {
            debug!("cursor already at or past requested value, left unchanged");
        }
        Ok(())
    }
}
