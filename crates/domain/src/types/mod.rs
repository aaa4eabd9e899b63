//! Domain types and models
//!
//! Everything the sync pipeline passes between its stages: the account being
//! synced, raw and canonical calendar events, persisted timeline entries, and
//! per-account/per-pass results.

pub mod account;
pub mod event;
pub mod sync;
pub mod timeline;

pub use account::{ProviderKind, SyncAccount};
pub use event::{CanonicalEvent, EventTime, EventType, RawCalendarEvent};
pub use sync::{FetchWindow, PassReport, SyncNotification, SyncResult, SyncStatus};
pub use timeline::{StoredTimelineEntry, TimelineKey, TimelineMetadata};
