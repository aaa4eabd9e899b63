//! End-to-end sync over SQLite and a mocked Google Calendar API
//!
//! **Purpose**: exercise the path account row → token → adapter → HTTP →
//! classifier → timeline upsert → cursor update with real infra pieces.
//!
//! **Infrastructure:**
//! - SQLite database in a tempdir with the schema applied
//! - WireMock HTTP server standing in for Google Calendar
//! - BroadcastNotifier subscriber for emitted notifications

#[path = "support.rs"]
mod support;

use std::sync::Arc;

use realtysync_core::{ProviderRegistry, SyncAccountRepository, SyncDependencies, SyncEngine};
use realtysync_domain::{
    EventType, ProviderKind, SyncAccount, SyncConfig, SyncNotification, SyncStatus,
};
use realtysync_infra::database::{SqliteSyncAccountRepository, SqliteTimelineRepository};
use realtysync_infra::integrations::calendar::GoogleCalendarSource;
use realtysync_infra::BroadcastNotifier;
use serde_json::json;
use support::{google_item, FixedTokens, TestDatabase};
use wiremock::matchers::{method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Stack {
    _db: TestDatabase,
    engine: SyncEngine,
    accounts: Arc<SqliteSyncAccountRepository>,
    timeline: Arc<SqliteTimelineRepository>,
    notifier: BroadcastNotifier,
}

fn stack(server: &MockServer) -> Stack {
    let db = TestDatabase::new();
    let accounts = Arc::new(SqliteSyncAccountRepository::new(Arc::clone(&db.manager)));
    let timeline = Arc::new(SqliteTimelineRepository::new(Arc::clone(&db.manager)));
    let notifier = BroadcastNotifier::default();

    accounts
        .upsert_account(&SyncAccount::new("acct-g", "agent-1", ProviderKind::Google))
        .expect("account should insert");

    let providers = ProviderRegistry::new().with_source(Arc::new(GoogleCalendarSource::new(
        reqwest::Client::new(),
        &server.uri(),
        250,
    )));

    // Zero-second backoff keeps the retry path fast.
    let config =
        SyncConfig { backoff_schedule_secs: vec![0], max_retries: 1, ..Default::default() };

    let deps = SyncDependencies {
        accounts: accounts.clone(),
        timeline: timeline.clone(),
        tokens: Arc::new(FixedTokens),
        providers: Arc::new(providers),
        notifier: Arc::new(notifier.clone()),
    };

    Stack { _db: db, engine: SyncEngine::new(deps, &config), accounts, timeline, notifier }
}

#[tokio::test(flavor = "multi_thread")]
async fn backfill_then_incremental_upserts_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param_is_missing("updatedMin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                google_item(
                    "evt-view",
                    "Open home 12 Banksia Road",
                    "2025-09-06T00:00:00Z",
                    "2025-09-06T00:30:00Z"
                ),
                google_item(
                    "evt-auction",
                    "Auction",
                    "2025-09-20T01:00:00Z",
                    "2025-09-20T02:00:00Z"
                )
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param_is_missing("timeMin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [google_item(
                "evt-auction",
                "Auction postponed",
                "2025-09-27T01:00:00Z",
                "2025-09-27T02:00:00Z"
            )]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stack = stack(&server);

    let first = stack.engine.run_pass().await.unwrap();
    assert_eq!(first.succeeded(), 1);
    assert_eq!(first.events_processed(), 2);

    // Cursor is persisted at millisecond precision.
    let cursor = stack.accounts.find_by_id("acct-g").await.unwrap().unwrap().last_sync_at;
    assert_eq!(
        cursor.map(|c| c.timestamp_millis()),
        Some(first.started_at.timestamp_millis())
    );

    let second = stack.engine.run_pass().await.unwrap();
    assert_eq!(second.result_for("acct-g").map(|r| r.status), Some(SyncStatus::Completed));

    let entries = stack.timeline.list_for_user("agent-1").unwrap();
    assert_eq!(entries.len(), 2);

    let auction = entries.iter().find(|e| e.entity_id == "evt-auction").unwrap();
    assert_eq!(auction.summary, "Auction postponed");
    assert_eq!(auction.metadata.event_type, EventType::Auction);
    assert_eq!(auction.metadata.account_id, "acct-g");

    let viewing = entries.iter().find(|e| e.entity_id == "evt-view").unwrap();
    assert_eq!(viewing.metadata.event_type, EventType::Viewing);
    assert_eq!(viewing.metadata.property_reference.as_deref(), Some("12 Banksia Road"));
}

#[tokio::test(flavor = "multi_thread")]
async fn transient_503_is_retried_within_the_pass() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try again"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [google_item(
                "evt-1",
                "Client catch up",
                "2025-09-02T00:00:00Z",
                "2025-09-02T01:00:00Z"
            )]
        })))
        .mount(&server)
        .await;

    let stack = stack(&server);
    let result = stack.engine.trigger_manual_sync("acct-g").await;

    assert!(result.success(), "expected success, got {:?}", result);
    assert_eq!(result.events_processed, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(stack.engine.worker().retry().attempts("acct-g"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_fails_without_moving_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;

    let stack = stack(&server);
    let result = stack.engine.trigger_manual_sync("acct-g").await;

    assert_eq!(result.status, SyncStatus::Failed);
    assert!(result.error.as_deref().unwrap_or_default().contains("401"));
    let account = stack.accounts.find_by_id("acct-g").await.unwrap().unwrap();
    assert_eq!(account.last_sync_at, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn subscribers_see_account_and_pass_notifications() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let stack = stack(&server);
    let mut receiver = stack.notifier.subscribe();

    stack.engine.run_pass().await.unwrap();

    match receiver.recv().await.unwrap() {
        SyncNotification::AccountSynced { account_id, user_id, events_processed, .. } => {
            assert_eq!(account_id, "acct-g");
            assert_eq!(user_id, "agent-1");
            assert_eq!(events_processed, 0);
        }
        other => panic!("expected AccountSynced, got {:?}", other),
    }
    match receiver.recv().await.unwrap() {
        SyncNotification::PassCompleted(report) => assert_eq!(report.succeeded(), 1),
        other => panic!("expected PassCompleted, got {:?}", other),
    }
}
