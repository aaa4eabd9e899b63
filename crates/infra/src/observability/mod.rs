//! Observability infrastructure for sync metrics
//!
//! Counters are lock-free atomics. Record methods return `MetricsResult<()>`
//! so callers can route failures through [`log_metric`] instead of aborting a
//! pass over a dropped metric.

pub mod metrics;

use tracing::warn;

/// Metrics error type
///
/// Recording currently always succeeds; the variants cover validation of the
/// inputs handed to the recorder.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average")
        metric: &'static str,
    },

    /// Value does not fit the counter it is recorded into
    #[error("Value out of range for metric '{metric}': {value}")]
    OutOfRange { metric: &'static str, value: u128 },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Downgrade a failed metric recording to a warning.
pub fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric, error = %err, "failed to record metric");
    }
}
