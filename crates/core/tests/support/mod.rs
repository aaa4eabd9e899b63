//! Shared test helpers for `realtysync-core` integration tests.
//!
//! In-memory implementations of every core port so pipeline tests can focus
//! on behaviour instead of wiring.

#![allow(dead_code)]

pub mod providers;
pub mod repositories;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use realtysync_core::{ProviderRegistry, SyncDependencies, SyncEngine};
use realtysync_domain::{EventTime, RawCalendarEvent, SyncAccount, SyncConfig};

use self::providers::{RecordingNotifier, ScriptedEventSource, StaticTokenProvider};
use self::repositories::{InMemoryAccountRepository, InMemoryTimelineRepository};

/// Engine plus handles on every mock it was built from.
pub struct Harness {
    pub engine: Arc<SyncEngine>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub timeline: Arc<InMemoryTimelineRepository>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build an engine over the given accounts and adapters. Every account gets a
/// token unless listed in `without_tokens`.
pub fn harness(
    accounts: Vec<SyncAccount>,
    sources: Vec<Arc<ScriptedEventSource>>,
    without_tokens: &[&str],
) -> Harness {
    harness_with_config(accounts, sources, without_tokens, &SyncConfig::default())
}

pub fn harness_with_config(
    accounts: Vec<SyncAccount>,
    sources: Vec<Arc<ScriptedEventSource>>,
    without_tokens: &[&str],
    config: &SyncConfig,
) -> Harness {
    let tokens = StaticTokenProvider::new(
        accounts
            .iter()
            .filter(|account| !without_tokens.contains(&account.id.as_str()))
            .map(|account| account.id.as_str()),
    );
    let accounts = Arc::new(InMemoryAccountRepository::new(accounts));
    let timeline = Arc::new(InMemoryTimelineRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let mut registry = ProviderRegistry::new();
    for source in sources {
        registry.register(source);
    }

    let deps = SyncDependencies {
        accounts: accounts.clone(),
        timeline: timeline.clone(),
        tokens: Arc::new(tokens),
        providers: Arc::new(registry),
        notifier: notifier.clone(),
    };
    let engine = Arc::new(SyncEngine::new(deps, config));

    Harness { engine, accounts, timeline, notifier }
}

/// Raw event starting at a fixed instant.
pub fn raw_event(id: &str, summary: &str, location: Option<&str>) -> RawCalendarEvent {
    let start = Utc.with_ymd_and_hms(2025, 9, 1, 9, 30, 0).unwrap();
    RawCalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: None,
        start: EventTime::At(start),
        end: EventTime::At(start + chrono::Duration::hours(1)),
        location: location.map(str::to_string),
        attendees: vec!["buyer@example.com".to_string()],
    }
}
