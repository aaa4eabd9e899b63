//! # RealtySync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for accounts, timeline storage, credentials,
//!   provider adapters, and notifications
//! - The sync engine services: concurrency guard, retry/backoff controller,
//!   storage sink, account sync worker, and pass coordinator
//!
//! ## Architecture Principles
//! - Only depends on `realtysync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod sync;

pub use sync::engine::{SyncDependencies, SyncEngine};
pub use sync::guard::{SyncGuard, SyncLease};
pub use sync::ports::{
    AccessToken, EventSource, NoopNotifier, SyncAccountRepository, SyncNotifier,
    TimelineRepository, TokenProvider,
};
pub use sync::registry::ProviderRegistry;
pub use sync::retry::{classify, classify_status, ErrorClass, RetryController};
pub use sync::sink::TimelineSink;
pub use sync::worker::AccountSyncWorker;
