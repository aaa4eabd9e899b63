//! In-memory repository mocks
//!
//! The timeline mock deliberately lacks a native upsert so the sink's
//! find-then-update-or-create path is what gets exercised.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use realtysync_core::{SyncAccountRepository, TimelineRepository};
use realtysync_domain::{
    RealtySyncError, Result as DomainResult, StoredTimelineEntry, SyncAccount, TimelineKey,
};

/// Accounts keyed by id. Cursor updates are monotonic.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, SyncAccount>>,
}

impl InMemoryAccountRepository {
    pub fn new(accounts: Vec<SyncAccount>) -> Self {
        Self {
            accounts: Mutex::new(
                accounts.into_iter().map(|account| (account.id.clone(), account)).collect(),
            ),
        }
    }

    pub fn cursor(&self, account_id: &str) -> Option<DateTime<Utc>> {
        self.accounts.lock().unwrap().get(account_id).and_then(|account| account.last_sync_at)
    }
}

#[async_trait]
impl SyncAccountRepository for InMemoryAccountRepository {
    async fn list_enabled(&self) -> DomainResult<Vec<SyncAccount>> {
        let mut enabled: Vec<SyncAccount> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|account| account.sync_enabled)
            .cloned()
            .collect();
        enabled.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(enabled)
    }

    async fn find_by_id(&self, account_id: &str) -> DomainResult<Option<SyncAccount>> {
        Ok(self.accounts.lock().unwrap().get(account_id).cloned())
    }

    async fn update_last_sync(
        &self,
        account_id: &str,
        synced_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| RealtySyncError::NotFound(account_id.to_string()))?;
        if account.last_sync_at.map_or(true, |current| synced_at > current) {
            account.last_sync_at = Some(synced_at);
        }
        Ok(())
    }
}

/// Timeline rows keyed by composite key, without a native upsert.
#[derive(Default)]
pub struct InMemoryTimelineRepository {
    rows: Mutex<HashMap<TimelineKey, StoredTimelineEntry>>,
    rejected_ids: Mutex<HashSet<String>>,
    creates: Mutex<usize>,
    updates: Mutex<usize>,
}

impl InMemoryTimelineRepository {
    /// Make writes for this external id fail.
    pub fn reject(&self, external_id: &str) {
        self.rejected_ids.lock().unwrap().insert(external_id.to_string());
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn entries(&self) -> Vec<StoredTimelineEntry> {
        let mut rows: Vec<_> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        rows
    }

    pub fn creates(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    pub fn updates(&self) -> usize {
        *self.updates.lock().unwrap()
    }

    fn check(&self, entry: &StoredTimelineEntry) -> DomainResult<()> {
        if self.rejected_ids.lock().unwrap().contains(&entry.entity_id) {
            return Err(RealtySyncError::Database(format!("write rejected: {}", entry.entity_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl TimelineRepository for InMemoryTimelineRepository {
    async fn find_by_key(&self, key: &TimelineKey) -> DomainResult<Option<StoredTimelineEntry>> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn create(&self, entry: &StoredTimelineEntry) -> DomainResult<()> {
        self.check(entry)?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&entry.key()) {
            return Err(RealtySyncError::Database("UNIQUE constraint failed".into()));
        }
        rows.insert(entry.key(), entry.clone());
        *self.creates.lock().unwrap() += 1;
        Ok(())
    }

    async fn update(&self, entry: &StoredTimelineEntry) -> DomainResult<()> {
        self.check(entry)?;
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .get_mut(&entry.key())
            .filter(|row| row.id == entry.id)
            .ok_or_else(|| RealtySyncError::NotFound(entry.id.clone()))?;
        *existing = entry.clone();
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }
}
