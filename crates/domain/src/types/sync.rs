//! Sync pass inputs and outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RealtySyncError, Result};

/// Range of events an adapter is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FetchWindow {
    /// First sync: everything from `time_min` through the provider's forward horizon.
    Backfill { time_min: DateTime<Utc> },
    /// Incremental sync from the stored cursor.
    Since { cursor: DateTime<Utc> },
}

impl FetchWindow {
    /// Compute the window for an account with the given cursor.
    ///
    /// # Errors
    /// Returns `RealtySyncError::Config` if `backfill_days` reaches past the
    /// representable date range.
    pub fn for_cursor(
        cursor: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        backfill_days: i64,
    ) -> Result<Self> {
        match cursor {
            Some(cursor) => Ok(Self::Since { cursor }),
            None => chrono::Duration::try_days(backfill_days)
                .and_then(|span| now.checked_sub_signed(span))
                .map(|time_min| Self::Backfill { time_min })
                .ok_or_else(|| {
                    RealtySyncError::Config(format!(
                        "backfill of {backfill_days} days is out of range"
                    ))
                }),
        }
    }

    pub fn is_backfill(&self) -> bool {
        matches!(self, Self::Backfill { .. })
    }
}

/// Outcome category of one account sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Completed,
    /// Another sync for the same account held the guard. Not an error.
    AlreadyInProgress,
    Failed,
}

/// Per-account result, also returned by the manual trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub account_id: String,
    pub status: SyncStatus,
    pub events_processed: usize,
    pub error: Option<String>,
}

impl SyncResult {
    pub fn completed(account_id: impl Into<String>, events_processed: usize) -> Self {
        Self {
            account_id: account_id.into(),
            status: SyncStatus::Completed,
            events_processed,
            error: None,
        }
    }

    pub fn already_in_progress(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            status: SyncStatus::AlreadyInProgress,
            events_processed: 0,
            error: None,
        }
    }

    pub fn failed(account_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            status: SyncStatus::Failed,
            events_processed: 0,
            error: Some(error.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.status == SyncStatus::Completed
    }

    pub fn is_skipped(&self) -> bool {
        self.status == SyncStatus::AlreadyInProgress
    }
}

/// Aggregated outcome of one scheduled pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<SyncResult>,
}

impl PassReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.status == SyncStatus::Failed).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn events_processed(&self) -> usize {
        self.results.iter().map(|r| r.events_processed).sum()
    }

    pub fn result_for(&self, account_id: &str) -> Option<&SyncResult> {
        self.results.iter().find(|r| r.account_id == account_id)
    }
}

/// Messages emitted to the external notifier once work completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncNotification {
    AccountSynced {
        account_id: String,
        user_id: String,
        events_processed: usize,
        completed_at: DateTime<Utc>,
    },
    PassCompleted(PassReport),
}
