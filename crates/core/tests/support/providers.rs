//! Mock provider adapter, token provider, and notifier

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use realtysync_core::{AccessToken, EventSource, SyncNotifier, TokenProvider};
use realtysync_domain::{
    FetchWindow, ProviderKind, RawCalendarEvent, RealtySyncError, Result as DomainResult,
    SyncNotification,
};
use tokio::sync::Notify;

/// Pauses a fetch until the test releases it.
#[derive(Default, Clone)]
pub struct FetchGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Adapter returning a fixed event list, optionally preceded by scripted
/// failures (one per call).
pub struct ScriptedEventSource {
    kind: ProviderKind,
    events: Vec<RawCalendarEvent>,
    failures: Mutex<VecDeque<RealtySyncError>>,
    windows: Mutex<Vec<FetchWindow>>,
    calls: AtomicUsize,
    gate: Option<FetchGate>,
    panics: bool,
}

impl ScriptedEventSource {
    pub fn new(kind: ProviderKind, events: Vec<RawCalendarEvent>) -> Self {
        Self {
            kind,
            events,
            failures: Mutex::new(VecDeque::new()),
            windows: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
            panics: false,
        }
    }

    pub fn failing_first(self, failures: Vec<RealtySyncError>) -> Self {
        *self.failures.lock().unwrap() = failures.into();
        self
    }

    pub fn gated(mut self, gate: FetchGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<FetchWindow> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch_events(
        &self,
        token: &AccessToken,
        window: FetchWindow,
    ) -> DomainResult<Vec<RawCalendarEvent>> {
        assert!(token.secret().starts_with("token-"), "worker passed the wrong token");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push(window);

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.panics {
            panic!("adapter crashed");
        }

        let failure = self.failures.lock().unwrap().pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(self.events.clone()),
        }
    }
}

/// Hands out `token-<account id>` for known accounts.
pub struct StaticTokenProvider {
    known: HashSet<String>,
}

impl StaticTokenProvider {
    pub fn new<'a>(account_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self { known: account_ids.into_iter().map(str::to_string).collect() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self, account_id: &str) -> DomainResult<AccessToken> {
        if self.known.contains(account_id) {
            Ok(AccessToken::new(format!("token-{account_id}")))
        } else {
            Err(RealtySyncError::Auth(format!("no credentials stored for {account_id}")))
        }
    }
}

/// Collects every notification for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<SyncNotification>>,
}

impl RecordingNotifier {
    pub fn received(&self) -> Vec<SyncNotification> {
        self.received.lock().unwrap().clone()
    }
}

impl SyncNotifier for RecordingNotifier {
    fn notify(&self, notification: SyncNotification) {
        self.received.lock().unwrap().push(notification);
    }
}
