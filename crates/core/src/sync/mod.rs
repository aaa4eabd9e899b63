//! Calendar sync engine
//!
//! Scheduler ticks call [`engine::SyncEngine::run_pass`], which fans out one
//! [`worker::AccountSyncWorker`] run per enabled account. Manual triggers go
//! through the same worker so guard, retry and upsert rules are identical.

pub mod engine;
pub mod guard;
pub mod ports;
pub mod registry;
pub mod retry;
pub mod sink;
pub mod worker;
