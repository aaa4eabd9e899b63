//! Calendar event types
//!
//! `RawCalendarEvent` is what a provider adapter hands back after decoding the
//! wire format; `CanonicalEvent` is the classified, provider-agnostic shape the
//! storage sink persists. Both only live for the duration of one sync pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Business type inferred from an event's free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Viewing,
    Appraisal,
    Meeting,
    Auction,
    Settlement,
    Other,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Appraisal => "appraisal",
            Self::Meeting => "meeting",
            Self::Auction => "auction",
            Self::Settlement => "settlement",
            Self::Other => "other",
        }
    }
}

/// Start or end of a provider event: a precise instant or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    At(DateTime<Utc>),
    AllDay(NaiveDate),
}

impl EventTime {
    /// All-day dates resolve to midnight UTC.
    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            Self::At(instant) => instant,
            Self::AllDay(date) => date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
        }
    }

    pub fn is_all_day(self) -> bool {
        matches!(self, Self::AllDay(_))
    }
}

/// Raw calendar event from a provider API, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

/// Provider-agnostic calendar event produced by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Provider-assigned identifier, stable per provider and account.
    pub external_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub event_type: EventType,
    pub property_reference: Option<String>,
}
