//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKFILL_DAYS, DEFAULT_BACKOFF_SCHEDULE_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SYNC_INTERVAL_SECS, GOOGLE_CALENDAR_API_BASE,
    MAX_BACKFILL_DAYS, MAX_EVENTS_PER_SYNC, MICROSOFT_GRAPH_API_BASE,
};
use crate::errors::{RealtySyncError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub providers: ProviderEndpoints,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "realtysync.db".to_string(), pool_size: 8 }
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Wait before retry N (1-based) is `backoff_schedule_secs[N - 1]`; the
    /// last entry repeats if `max_retries` exceeds the schedule length.
    pub backoff_schedule_secs: Vec<u64>,
    pub max_retries: u32,
    pub backfill_days: i64,
    pub max_events: usize,
    pub request_timeout_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
            backoff_schedule_secs: DEFAULT_BACKOFF_SCHEDULE_SECS.to_vec(),
            max_retries: DEFAULT_MAX_RETRIES,
            backfill_days: DEFAULT_BACKFILL_DAYS,
            max_events: MAX_EVENTS_PER_SYNC,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn backoff_schedule(&self) -> Vec<Duration> {
        self.backoff_schedule_secs.iter().copied().map(Duration::from_secs).collect()
    }
}

/// Base URLs for the provider APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub google_base_url: String,
    pub microsoft_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google_base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            microsoft_base_url: MICROSOFT_GRAPH_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    /// Returns `RealtySyncError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(RealtySyncError::Config("database.pool_size must be > 0".into()));
        }
        if self.sync.interval_seconds == 0 {
            return Err(RealtySyncError::Config("sync.interval_seconds must be > 0".into()));
        }
        if self.sync.backoff_schedule_secs.is_empty() {
            return Err(RealtySyncError::Config(
                "sync.backoff_schedule_secs must not be empty".into(),
            ));
        }
        if !(1..=MAX_EVENTS_PER_SYNC).contains(&self.sync.max_events) {
            return Err(RealtySyncError::Config(format!(
                "sync.max_events must be within 1..={MAX_EVENTS_PER_SYNC}"
            )));
        }
        if !(0..=MAX_BACKFILL_DAYS).contains(&self.sync.backfill_days) {
            return Err(RealtySyncError::Config(format!(
                "sync.backfill_days must be within 0..={MAX_BACKFILL_DAYS}"
            )));
        }
        if self.sync.request_timeout_seconds == 0 {
            return Err(RealtySyncError::Config("sync.request_timeout_seconds must be > 0".into()));
        }
        Ok(())
    }
}
