//! SQLite persistence for sync accounts and timeline entries

pub mod account_repository;
pub mod manager;
pub mod schema;
pub mod timeline_repository;

pub use account_repository::SqliteSyncAccountRepository;
pub use manager::{DbConnection, DbManager, DbPool};
pub use timeline_repository::SqliteTimelineRepository;
