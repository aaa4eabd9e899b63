//! Domain constants
//!
//! Centralized location for the fixed values the sync engine relies on.

/// Entry type tag identifying a timeline row produced by calendar sync.
pub const TIMELINE_ENTRY_TYPE_CALENDAR_SYNC: &str = "calendar_sync";

/// Entity type used in the timeline linkage for synced calendar events.
pub const ENTITY_TYPE_CALENDAR_EVENT: &str = "calendar_event";

/// Summary used when a provider returns an event without a title.
pub const UNTITLED_EVENT_SUMMARY: &str = "Untitled event";

// Scheduling and retry defaults
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_BACKOFF_SCHEDULE_SECS: [u64; 3] = [60, 300, 900];
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// Fetch window defaults
pub const DEFAULT_BACKFILL_DAYS: i64 = 30;
pub const MAX_BACKFILL_DAYS: i64 = 3650;
pub const MAX_EVENTS_PER_SYNC: usize = 250;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Provider endpoints
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const MICROSOFT_GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
