//! Scheduling infrastructure for periodic sync passes
//!
//! The scheduler follows the runtime rules used across infra:
//! - Explicit lifecycle management (start/stop)
//! - Join handle kept for the spawned loop
//! - Cancellation token support
//! - Structured tracing plus `SyncMetrics` recording

pub mod error;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sync_scheduler::{SyncScheduler, SyncSchedulerConfig};
