//! Microsoft Graph calendar adapter
//!
//! Both backfill and incremental sync filter on event start time, unlike the
//! Google adapter. Edits to events that started before the cursor are not
//! picked up.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use realtysync_core::{AccessToken, EventSource};
use realtysync_domain::constants::{MAX_EVENTS_PER_SYNC, UNTITLED_EVENT_SUMMARY};
use realtysync_domain::{EventTime, FetchWindow, ProviderKind, RawCalendarEvent, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::http::{fetch_json, parse_instant, validate_and_log_email};

const OUTLOOK_TIMEZONE_HEADER: &str = r#"outlook.timezone="UTC""#;

/// Microsoft Calendar provider
#[derive(Clone)]
pub struct MicrosoftCalendarSource {
    client: Client,
    base_url: String,
    max_events: usize,
}

impl MicrosoftCalendarSource {
    pub fn new(client: Client, base_url: &str, max_events: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_events: max_events.clamp(1, MAX_EVENTS_PER_SYNC),
        }
    }

    fn base_query(&self, window: FetchWindow) -> Vec<(&'static str, String)> {
        let since: DateTime<Utc> = match window {
            FetchWindow::Backfill { time_min } => time_min,
            FetchWindow::Since { cursor } => cursor,
        };

        vec![
            ("$orderby", "start/dateTime".to_string()),
            ("$top", self.max_events.to_string()),
            (
                "$filter",
                format!(
                    "start/dateTime ge '{}'",
                    since.to_rfc3339_opts(SecondsFormat::Secs, true)
                ),
            ),
        ]
    }
}

#[async_trait]
impl EventSource for MicrosoftCalendarSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Microsoft
    }

    #[instrument(skip(self, token), fields(provider = "microsoft"))]
    async fn fetch_events(
        &self,
        token: &AccessToken,
        window: FetchWindow,
    ) -> Result<Vec<RawCalendarEvent>> {
        let first_page = format!("{}/me/events", self.base_url);

        let mut events = Vec::new();
        let mut next_link: Option<String> = None;

        loop {
            // nextLink already carries the full query string.
            let request = match &next_link {
                Some(link) => self.client.get(link),
                None => self.client.get(&first_page).query(&self.base_query(window)),
            }
            .bearer_auth(token.secret())
            .header("Prefer", OUTLOOK_TIMEZONE_HEADER);

            let page: MicrosoftEventsResponse = fetch_json(request, "Microsoft").await?;
            events.extend(page.value.into_iter().filter_map(MicrosoftCalendarEvent::into_raw));

            if events.len() >= self.max_events {
                break;
            }
            match page.next_link {
                Some(link) => next_link = Some(link),
                None => break,
            }
        }

        events.truncate(self.max_events);
        debug!(count = events.len(), "fetched Microsoft events");
        Ok(events)
    }
}

#[derive(Debug, Deserialize)]
struct MicrosoftEventsResponse {
    #[serde(default)]
    value: Vec<MicrosoftCalendarEvent>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MicrosoftCalendarEvent {
    id: String,
    subject: Option<String>,
    #[serde(rename = "bodyPreview")]
    body_preview: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
    #[serde(rename = "isAllDay", default)]
    is_all_day: bool,
    location: Option<MicrosoftLocation>,
    attendees: Option<Vec<MicrosoftAttendee>>,
}

#[derive(Debug, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct MicrosoftLocation {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MicrosoftAttendee {
    #[serde(rename = "emailAddress")]
    email_address: Option<EmailAddress>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    address: Option<String>,
}

impl EventDateTime {
    /// Graph returns naive timestamps in the zone named by the `Prefer`
    /// header, which is always UTC here.
    fn to_event_time(&self, all_day: bool) -> Option<EventTime> {
        let instant = parse_instant(&self.date_time)?;
        Some(if all_day { EventTime::AllDay(instant.date_naive()) } else { EventTime::At(instant) })
    }
}

impl MicrosoftCalendarEvent {
    fn into_raw(self) -> Option<RawCalendarEvent> {
        let all_day = self.is_all_day;
        let start = self.start.as_ref().and_then(|t| t.to_event_time(all_day));
        let end = self.end.as_ref().and_then(|t| t.to_event_time(all_day));
        let (Some(start), Some(end)) = (start, end) else {
            warn!(event_id = %self.id, "skipping Microsoft event with unparseable start/end");
            return None;
        };

        let attendees = self
            .attendees
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                let address = a.email_address.and_then(|e| e.address).unwrap_or_default();
                validate_and_log_email(&address, &self.id)
            })
            .collect();

        Some(RawCalendarEvent {
            summary: self
                .subject
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT_SUMMARY.to_string()),
            description: self.body_preview.filter(|b| !b.trim().is_empty()),
            location: self
                .location
                .and_then(|l| l.display_name)
                .filter(|name| !name.trim().is_empty()),
            start,
            end,
            attendees,
            id: self.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[test]
    fn naive_graph_times_are_utc() {
        let item: MicrosoftCalendarEvent = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "subject": "Appraisal",
            "start": { "dateTime": "2025-09-01T09:30:00.0000000", "timeZone": "UTC" },
            "end": { "dateTime": "2025-09-01T10:00:00.0000000", "timeZone": "UTC" },
            "location": { "displayName": "" },
            "attendees": [{ "emailAddress": { "address": "owner@example.com" } }]
        }))
        .unwrap();

        let raw = item.into_raw().unwrap();
        assert_eq!(raw.start, EventTime::At(Utc.with_ymd_and_hms(2025, 9, 1, 9, 30, 0).unwrap()));
        assert_eq!(raw.location, None);
        assert_eq!(raw.attendees, vec!["owner@example.com".to_string()]);
    }

    #[test]
    fn all_day_graph_event_keeps_date() {
        let item: MicrosoftCalendarEvent = serde_json::from_value(serde_json::json!({
            "id": "m2",
            "isAllDay": true,
            "start": { "dateTime": "2025-09-05T00:00:00.0000000" },
            "end": { "dateTime": "2025-09-06T00:00:00.0000000" }
        }))
        .unwrap();

        let raw = item.into_raw().unwrap();
        assert_eq!(raw.start, EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 9, 5).unwrap()));
        assert_eq!(raw.summary, UNTITLED_EVENT_SUMMARY);
    }

    #[test]
    fn incremental_window_still_filters_on_start() {
        let source = MicrosoftCalendarSource::new(Client::new(), "https://graph.test", 100);
        let cursor = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let query = source.base_query(FetchWindow::Since { cursor });

        let filter = "start/dateTime ge '2025-09-01T00:00:00Z'".to_string();
        assert!(query.contains(&("$filter", filter)));
        assert!(query.contains(&("$top", "100".to_string())));
    }
}
