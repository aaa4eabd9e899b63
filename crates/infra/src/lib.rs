//! # RealtySync Infrastructure
//!
//! Infrastructure implementations of core sync ports.
//!
//! This crate contains:
//! - SQLite repositories for accounts and timeline entries (rusqlite + r2d2)
//! - Google Calendar and Microsoft Graph event sources (reqwest)
//! - Keychain-backed access tokens
//! - Broadcast notifier, sync metrics, and the interval scheduler
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `realtysync-core`
//! - Contains all "impure" code (I/O, network, keychain)

pub mod config;
pub mod credentials;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod notifications;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use credentials::KeyringTokenProvider;
pub use database::{DbManager, SqliteSyncAccountRepository, SqliteTimelineRepository};
pub use errors::InfraError;
pub use integrations::calendar::{build_registry, GoogleCalendarSource, MicrosoftCalendarSource};
pub use notifications::BroadcastNotifier;
pub use observability::metrics::SyncMetrics;
pub use scheduling::{SchedulerError, SchedulerResult, SyncScheduler, SyncSchedulerConfig};
