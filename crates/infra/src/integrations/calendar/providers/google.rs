//! Google Calendar adapter
//!
//! Backfill filters on `timeMin` (event start); incremental sync filters on
//! `updatedMin`, so edits to past events are picked up too.

use async_trait::async_trait;
use chrono::SecondsFormat;
use realtysync_core::{AccessToken, EventSource};
use realtysync_domain::constants::{MAX_EVENTS_PER_SYNC, UNTITLED_EVENT_SUMMARY};
use realtysync_domain::{EventTime, FetchWindow, ProviderKind, RawCalendarEvent, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::http::{fetch_json, parse_date, parse_instant, validate_and_log_email};

/// Google Calendar provider
#[derive(Clone)]
pub struct GoogleCalendarSource {
    client: Client,
    base_url: String,
    max_events: usize,
}

impl GoogleCalendarSource {
    pub fn new(client: Client, base_url: &str, max_events: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_events: max_events.clamp(1, MAX_EVENTS_PER_SYNC),
        }
    }

    fn base_query(&self, window: FetchWindow) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", self.max_events.to_string()),
        ];
        match window {
            FetchWindow::Backfill { time_min } => {
                query.push(("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }
            FetchWindow::Since { cursor } => {
                query.push(("updatedMin", cursor.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }
        }
        query
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    #[instrument(skip(self, token), fields(provider = "google"))]
    async fn fetch_events(
        &self,
        token: &AccessToken,
        window: FetchWindow,
    ) -> Result<Vec<RawCalendarEvent>> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let query = self.base_query(window);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(token.secret()).query(&query);
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token)]);
            }

            let page: GoogleEventsResponse = fetch_json(request, "Google").await?;
            events.extend(page.items.into_iter().filter_map(GoogleCalendarEvent::into_raw));

            if events.len() >= self.max_events {
                break;
            }
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        events.truncate(self.max_events);
        debug!(count = events.len(), "fetched Google events");
        Ok(events)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
    attendees: Option<Vec<GoogleAttendee>>,
}

#[derive(Debug, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleAttendee {
    email: Option<String>,
}

impl EventDateTime {
    fn to_event_time(&self) -> Option<EventTime> {
        if let Some(date_time) = &self.date_time {
            return parse_instant(date_time).map(EventTime::At);
        }
        self.date.as_deref().and_then(parse_date).map(EventTime::AllDay)
    }
}

impl GoogleCalendarEvent {
    fn into_raw(self) -> Option<RawCalendarEvent> {
        let start = self.start.as_ref().and_then(EventDateTime::to_event_time);
        let end = self.end.as_ref().and_then(EventDateTime::to_event_time);
        let (Some(start), Some(end)) = (start, end) else {
            warn!(event_id = %self.id, "skipping Google event with unparseable start/end");
            return None;
        };

        let attendees = self
            .attendees
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                validate_and_log_email(a.email.as_deref().unwrap_or_default(), &self.id)
            })
            .collect();

        Some(RawCalendarEvent {
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT_SUMMARY.to_string()),
            description: self.description,
            location: self.location.filter(|l| !l.trim().is_empty()),
            start,
            end,
            attendees,
            id: self.id,
        })
    }
}
