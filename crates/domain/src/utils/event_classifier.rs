//! Deterministic event classification.
//!
//! Infers a business [`EventType`] from an event's free text and pulls out a
//! best-effort property address. Both are advisory metadata: false positives
//! and misses are acceptable, nothing downstream keys on them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::UNTITLED_EVENT_SUMMARY;
use crate::types::event::{CanonicalEvent, EventType, RawCalendarEvent};

/// Keyword families checked in order. The first family with a hit wins, so
/// more specific categories come before the generic meeting bucket.
const KEYWORD_RULES: &[(EventType, &[&str])] = &[
    (EventType::Viewing, &["viewing", "inspection", "open home", "open house", "showing"]),
    (EventType::Appraisal, &["appraisal", "valuation", "market assessment"]),
    (EventType::Auction, &["auction", "bidding"]),
    (EventType::Settlement, &["settlement", "closing", "exchange of contracts"]),
    (EventType::Meeting, &["meeting", "client", "consultation", "catch up"]),
];

static STREET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d+[a-z]?(?:/\d+)?\s+(?:[a-z']+\s+){1,4}(?:street|st|road|rd|avenue|ave|drive|dr|lane|ln|court|ct|place|pl|crescent|cres|parade|pde|boulevard|blvd|way|terrace|tce|highway|hwy|close|circuit|cct)\b\.?",
    )
    .expect("STREET_ADDRESS should compile - this is a bug")
});

/// Infer the business type of an event from its text fields.
pub fn infer_event_type(
    summary: &str,
    description: Option<&str>,
    location: Option<&str>,
) -> EventType {
    let haystack = combined_text(summary, description, location).to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| haystack.contains(keyword)))
        .map_or(EventType::Other, |(event_type, _)| *event_type)
}

/// Extract a property address reference.
///
/// The first "<number> <words> <street-type>" match in the combined text
/// wins. Failing that, a location containing a digit is used verbatim.
pub fn extract_property_reference(
    summary: &str,
    description: Option<&str>,
    location: Option<&str>,
) -> Option<String> {
    let haystack = combined_text(summary, description, location);

    if let Some(found) = STREET_ADDRESS.find(&haystack) {
        return Some(found.as_str().trim().to_string());
    }

    location
        .map(str::trim)
        .filter(|loc| loc.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Turn a raw provider event into its canonical, classified form.
pub fn classify_event(raw: RawCalendarEvent) -> CanonicalEvent {
    let summary = if raw.summary.trim().is_empty() {
        UNTITLED_EVENT_SUMMARY.to_string()
    } else {
        raw.summary
    };
    let description = raw.description.filter(|d| !d.trim().is_empty());
    let location = raw.location.filter(|l| !l.trim().is_empty());

    let event_type = infer_event_type(&summary, description.as_deref(), location.as_deref());
    let property_reference =
        extract_property_reference(&summary, description.as_deref(), location.as_deref());

    CanonicalEvent {
        external_id: raw.id,
        summary,
        description,
        start: raw.start.to_utc(),
        end: raw.end.to_utc(),
        location,
        attendees: raw.attendees,
        event_type,
        property_reference,
    }
}

fn combined_text(summary: &str, description: Option<&str>, location: Option<&str>) -> String {
    [Some(summary), description, location].into_iter().flatten().collect::<Vec<_>>().join(" ")
}
