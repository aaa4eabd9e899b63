//! Sync pass metrics
//!
//! ## Design
//! - **Relaxed ordering** for independent counters
//! - **SeqCst** for the pass count and total duration, which feed the average
//! - Durations stored in milliseconds

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use realtysync_domain::PassReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Counters recorded by the scheduler after each pass.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    passes: AtomicU64,
    pass_failures: AtomicU64,
    accounts_succeeded: AtomicU64,
    accounts_failed: AtomicU64,
    accounts_skipped: AtomicU64,
    events_stored: AtomicU64,
    total_pass_millis: AtomicU64,
    last_pass_millis: AtomicU64,
}

/// Point-in-time copy of [`SyncMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncMetricsSnapshot {
    pub passes: u64,
    pub pass_failures: u64,
    pub accounts_succeeded: u64,
    pub accounts_failed: u64,
    pub accounts_skipped: u64,
    pub events_stored: u64,
    pub last_pass_millis: u64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed pass into the counters.
    pub fn record_pass(&self, report: &PassReport, elapsed: Duration) -> MetricsResult<()> {
        let millis = u64::try_from(elapsed.as_millis()).map_err(|_| MetricsError::OutOfRange {
            metric: "sync.pass.duration",
            value: elapsed.as_millis(),
        })?;

        self.passes.fetch_add(1, Ordering::SeqCst);
        self.total_pass_millis.fetch_add(millis, Ordering::SeqCst);
        self.last_pass_millis.store(millis, Ordering::Relaxed);

        self.accounts_succeeded.fetch_add(report.succeeded() as u64, Ordering::Relaxed);
        self.accounts_failed.fetch_add(report.failed() as u64, Ordering::Relaxed);
        self.accounts_skipped.fetch_add(report.skipped() as u64, Ordering::Relaxed);
        self.events_stored.fetch_add(report.events_processed() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Record a pass that could not run at all (e.g. account listing failed).
    pub fn record_pass_failure(&self) -> MetricsResult<()> {
        self.pass_failures.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Average pass duration in milliseconds.
    pub fn avg_pass_millis(&self) -> MetricsResult<f64> {
        let passes = self.passes.load(Ordering::SeqCst);
        if passes == 0 {
            return Err(MetricsError::EmptyData { metric: "average pass duration" });
        }
        Ok(self.total_pass_millis.load(Ordering::SeqCst) as f64 / passes as f64)
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            passes: self.passes.load(Ordering::SeqCst),
            pass_failures: self.pass_failures.load(Ordering::Relaxed),
            accounts_succeeded: self.accounts_succeeded.load(Ordering::Relaxed),
            accounts_failed: self.accounts_failed.load(Ordering::Relaxed),
            accounts_skipped: self.accounts_skipped.load(Ordering::Relaxed),
            events_stored: self.events_stored.load(Ordering::Relaxed),
            last_pass_millis: self.last_pass_millis.load(Ordering::Relaxed),
        }
    }
}
