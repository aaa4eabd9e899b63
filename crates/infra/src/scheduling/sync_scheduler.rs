//! Interval scheduler for calendar sync passes.
//!
//! Runs [`SyncEngine::run_pass`] immediately on start and then every
//! `interval`. A pass that overruns the interval delays the next tick rather
//! than bunching catch-up ticks together.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use realtysync_core::SyncEngine;
//! use realtysync_infra::observability::metrics::SyncMetrics;
//! use realtysync_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
//!
//! # async fn example(engine: Arc<SyncEngine>) -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = Arc::new(SyncMetrics::new());
//! let mut scheduler = SyncScheduler::new(engine, SyncSchedulerConfig::default(), metrics)?;
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use realtysync_core::SyncEngine;
use realtysync_domain::{SyncConfig, SyncResult};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::observability::log_metric;
use crate::observability::metrics::SyncMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Time between pass starts
    pub interval: Duration,
    /// How long `stop` waits for an in-flight pass before detaching it
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self::from_sync_config(&SyncConfig::default())
    }
}

impl SyncSchedulerConfig {
    pub fn from_sync_config(config: &SyncConfig) -> Self {
        Self { interval: config.interval(), join_timeout: Duration::from_secs(5) }
    }
}

/// Periodic driver for the sync engine
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    metrics: Arc<SyncMetrics>,
}

impl SyncScheduler {
    /// Create a new sync scheduler
    ///
    /// # Errors
    ///
    /// Returns `CreationFailed` for a zero interval.
    pub fn new(
        engine: Arc<SyncEngine>,
        config: SyncSchedulerConfig,
        metrics: Arc<SyncMetrics>,
    ) -> SchedulerResult<Self> {
        if config.interval.is_zero() {
            return Err(SchedulerError::CreationFailed("interval must be non-zero".into()));
        }

        Ok(Self {
            engine,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            metrics,
        })
    }

    /// Start the scheduler
    ///
    /// Spawns the background loop. The first pass runs immediately.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self), fields(interval_secs = self.config.interval.as_secs()))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so a stopped scheduler can be restarted.
        self.cancellation_token = CancellationToken::new();

        let engine = Arc::clone(&self.engine);
        let metrics = Arc::clone(&self.metrics);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sync_loop(engine, metrics, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Idempotent. A pass in flight is allowed to finish; if it outlives the
    /// join timeout the task is detached and completes on its own.
    ///
    /// # Errors
    ///
    /// Returns `TaskJoinFailed` if the loop task panicked.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        self.cancellation_token.cancel();

        let Some(mut handle) = self.task_handle.lock().await.take() else {
            debug!("Sync scheduler already stopped");
            return Ok(());
        };

        match tokio::time::timeout(self.config.join_timeout, &mut handle).await {
            Ok(Ok(())) => info!("Sync scheduler stopped"),
            Ok(Err(join_err)) => return Err(SchedulerError::TaskJoinFailed(join_err.to_string())),
            Err(_) => warn!(
                timeout_secs = self.config.join_timeout.as_secs(),
                "sync pass still running at shutdown, detaching"
            ),
        }

        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Sync one account now, outside the interval.
    pub async fn trigger_manual_sync(&self, account_id: &str) -> SyncResult {
        self.engine.trigger_manual_sync(account_id).await
    }

    async fn sync_loop(
        engine: Arc<SyncEngine>,
        metrics: Arc<SyncMetrics>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    Self::run_pass(&engine, &metrics).await;
                }
            }
        }
    }

    async fn run_pass(engine: &SyncEngine, metrics: &SyncMetrics) {
        let started = Instant::now();

        match engine.run_pass().await {
            Ok(report) => {
                debug!(
                    accounts = report.results.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Scheduled sync pass finished"
                );
                log_metric(metrics.record_pass(&report, started.elapsed()), "sync.pass");
            }
            Err(e) => {
                error!(error = %e, "Sync pass could not start");
                log_metric(metrics.record_pass_failure(), "sync.pass.failure");
            }
        }
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() && self.is_running() {
            warn!("SyncScheduler dropped while running; cancelling");
        }
        self.cancellation_token.cancel();
    }
}
