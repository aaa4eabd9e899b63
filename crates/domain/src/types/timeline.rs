//! Persisted timeline entries produced by calendar sync

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ENTITY_TYPE_CALENDAR_EVENT, TIMELINE_ENTRY_TYPE_CALENDAR_SYNC};
use crate::types::event::{CanonicalEvent, EventType};

/// Composite identity of a timeline entry. At most one row exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineKey {
    pub user_id: String,
    pub entity_type: String,
    pub entity_id: String,
}

impl TimelineKey {
    /// Key for a synced calendar event owned by `user_id`.
    pub fn calendar_event(user_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            entity_type: ENTITY_TYPE_CALENDAR_EVENT.to_string(),
            entity_id: external_id.into(),
        }
    }
}

/// Metadata blob stored alongside each synced entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    pub account_id: String,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub event_type: EventType,
    pub property_reference: Option<String>,
}

/// Persisted timeline record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTimelineEntry {
    pub id: String,
    pub user_id: String,
    pub entry_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub summary: String,
    pub content: String,
    /// Event start time.
    pub timestamp: DateTime<Utc>,
    pub metadata: TimelineMetadata,
}

impl StoredTimelineEntry {
    /// Build the row for a canonical event. The `id` is fresh; on update the
    /// existing row keeps its own id.
    pub fn from_canonical(user_id: &str, account_id: &str, event: &CanonicalEvent) -> Self {
        let content = event.description.clone().unwrap_or_else(|| event.summary.clone());

        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            entry_type: TIMELINE_ENTRY_TYPE_CALENDAR_SYNC.to_string(),
            entity_type: ENTITY_TYPE_CALENDAR_EVENT.to_string(),
            entity_id: event.external_id.clone(),
            summary: event.summary.clone(),
            content,
            timestamp: event.start,
            metadata: TimelineMetadata {
                account_id: account_id.to_string(),
                end: event.end,
                location: event.location.clone(),
                attendees: event.attendees.clone(),
                event_type: event.event_type,
                property_reference: event.property_reference.clone(),
            },
        }
    }

    pub fn key(&self) -> TimelineKey {
        TimelineKey {
            user_id: self.user_id.clone(),
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_event(description: Option<&str>) -> CanonicalEvent {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        CanonicalEvent {
            external_id: "evt-1".into(),
            summary: "Open home".into(),
            description: description.map(str::to_string),
            start,
            end: start + chrono::Duration::minutes(30),
            location: Some("42 Wattle Street".into()),
            attendees: vec!["buyer@example.com".into()],
            event_type: EventType::Viewing,
            property_reference: Some("42 Wattle Street".into()),
        }
    }

    #[test]
    fn canonical_event_maps_to_calendar_sync_entry() {
        let event = sample_event(Some("Bring brochures"));
        let entry = StoredTimelineEntry::from_canonical("user-1", "acct-1", &event);

        assert_eq!(entry.entry_type, TIMELINE_ENTRY_TYPE_CALENDAR_SYNC);
        assert_eq!(entry.key(), TimelineKey::calendar_event("user-1", "evt-1"));
        assert_eq!(entry.timestamp, event.start);
        assert_eq!(entry.content, "Bring brochures");
        assert_eq!(entry.metadata.end, event.end);
        assert_eq!(entry.metadata.event_type, EventType::Viewing);
        assert_eq!(entry.metadata.account_id, "acct-1");
    }

    #[test]
    fn content_falls_back_to_summary() {
        let entry = StoredTimelineEntry::from_canonical("user-1", "acct-1", &sample_event(None));
        assert_eq!(entry.content, "Open home");
    }
}
