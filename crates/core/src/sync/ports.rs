//! Port interfaces for sync operations

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use realtysync_domain::{
    FetchWindow, ProviderKind, RawCalendarEvent, RealtySyncError, Result, StoredTimelineEntry,
    SyncAccount, SyncNotification, TimelineKey,
};

/// Trait for reading sync accounts and advancing their cursor
#[async_trait]
pub trait SyncAccountRepository: Send + Sync {
    /// All accounts with sync enabled
    async fn list_enabled(&self) -> Result<Vec<SyncAccount>>;

    /// Look up a single account regardless of its enabled flag
    async fn find_by_id(&self, account_id: &str) -> Result<Option<SyncAccount>>;

    /// Record a successful sync. Implementations must never move the
    /// cursor backwards.
    async fn update_last_sync(&self, account_id: &str, synced_at: DateTime<Utc>) -> Result<()>;
}

/// Trait for persisting timeline entries
///
/// Stores with a composite-key upsert override `supports_native_upsert` and
/// `upsert`; all others only need the find/create/update trio.
#[async_trait]
pub trait TimelineRepository: Send + Sync {
    fn supports_native_upsert(&self) -> bool {
        false
    }

    /// Insert or overwrite the row keyed by `entry.key()`
    async fn upsert(&self, entry: &StoredTimelineEntry) -> Result<()> {
        Err(RealtySyncError::Internal(format!(
            "native upsert not supported for {}",
            entry.entity_id
        )))
    }

    async fn find_by_key(&self, key: &TimelineKey) -> Result<Option<StoredTimelineEntry>>;

    async fn create(&self, entry: &StoredTimelineEntry) -> Result<()>;

    /// Overwrite summary, content, timestamp and metadata of the row with `entry.id`
    async fn update(&self, entry: &StoredTimelineEntry) -> Result<()>;
}

/// Bearer token for a provider API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Trait for resolving valid provider credentials for an account
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, account_id: &str) -> Result<AccessToken>;
}

/// Provider adapter: one implementation per calendar provider
#[async_trait]
pub trait EventSource: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Fetch a flat, capped list of raw events for the window.
    ///
    /// Pagination happens inside the adapter.
    async fn fetch_events(
        &self,
        token: &AccessToken,
        window: FetchWindow,
    ) -> Result<Vec<RawCalendarEvent>>;
}

/// Receives completion messages. Must not block the pipeline.
pub trait SyncNotifier: Send + Sync {
    fn notify(&self, notification: SyncNotification);
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl SyncNotifier for NoopNotifier {
    fn notify(&self, _notification: SyncNotification) {}
}
