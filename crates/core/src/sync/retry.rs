//! Retry/backoff around provider fetches
//!
//! Errors are split into retryable (transient network trouble, rate limiting,
//! busy upstream) and fatal. Retryable failures wait on a fixed escalating
//! schedule; counters live per account and reset on success.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use realtysync_domain::{RealtySyncError, Result, SyncConfig};
use tracing::{debug, warn};

const RETRYABLE_STATUSES: [u16; 3] = [429, 503, 504];

const TRANSIENT_MARKERS: [&str; 8] = [
    "econnreset",
    "etimedout",
    "econnrefused",
    "enotfound",
    "eai_again",
    "timed out",
    "connection reset",
    "connection refused",
];

/// Whether a failed fetch is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable,
    Fatal,
}

/// Classify an HTTP status returned by a provider.
pub fn classify_status(status: u16) -> ErrorClass {
    if RETRYABLE_STATUSES.contains(&status) {
        ErrorClass::Retryable
    } else {
        ErrorClass::Fatal
    }
}

/// Classify a domain error for the retry controller.
pub fn classify(error: &RealtySyncError) -> ErrorClass {
    match error {
        RealtySyncError::Network(_) => ErrorClass::Retryable,
        RealtySyncError::Provider { status, .. } => classify_status(*status),
        RealtySyncError::Auth(_)
        | RealtySyncError::InvalidInput(_)
        | RealtySyncError::NotFound(_)
        | RealtySyncError::Config(_)
        | RealtySyncError::UnsupportedProvider(_) => ErrorClass::Fatal,
        RealtySyncError::Database(message) | RealtySyncError::Internal(message) => {
            let lowered = message.to_ascii_lowercase();
            if TRANSIENT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                ErrorClass::Retryable
            } else {
                ErrorClass::Fatal
            }
        }
    }
}

/// Bounded retry with per-account attempt counters.
#[derive(Debug)]
pub struct RetryController {
    schedule: Vec<Duration>,
    max_retries: u32,
    attempts: DashMap<String, u32>,
}

/// Clears an account's counter when a run ends, including by panic or
/// cancellation.
struct AttemptsReset<'a> {
    attempts: &'a DashMap<String, u32>,
    account_id: &'a str,
}

impl Drop for AttemptsReset<'_> {
    fn drop(&mut self) {
        self.attempts.remove(self.account_id);
    }
}

impl RetryController {
    /// `schedule[n - 1]` is the wait before retry `n`; the last entry repeats.
    pub fn new(schedule: Vec<Duration>, max_retries: u32) -> Self {
        Self { schedule, max_retries, attempts: DashMap::new() }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.backoff_schedule(), config.max_retries)
    }

    /// Consecutive failed attempts recorded for an account in the current run.
    pub fn attempts(&self, account_id: &str) -> u32 {
        self.attempts.get(account_id).map_or(0, |count| *count)
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let index = retry.saturating_sub(1) as usize;
        self.schedule.get(index).or_else(|| self.schedule.last()).copied().unwrap_or_default()
    }

    /// Run `operation` until it succeeds, fails fatally, or exhausts retries.
    ///
    /// However the run ends, the account's counter is discarded so the next
    /// pass starts from zero.
    pub async fn run<T, F, Fut>(&self, account_id: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _reset = AttemptsReset { attempts: &self.attempts, account_id };

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if self.attempts(account_id) > 0 {
                        debug!(account_id, "fetch recovered, retry counter reset");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if classify(&error) == ErrorClass::Fatal {
                return Err(error);
            }

            let retry = {
                let mut count = self.attempts.entry(account_id.to_string()).or_insert(0);
                *count += 1;
                *count
            };

            if retry > self.max_retries {
                warn!(
                    account_id,
                    max_retries = self.max_retries,
                    error = %error,
                    "retries exhausted, giving up until next pass"
                );
                return Err(error);
            }

            let delay = self.delay_for(retry);
            warn!(
                account_id,
                retry,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %error,
                "retryable fetch error, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
