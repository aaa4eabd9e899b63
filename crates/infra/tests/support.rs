//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use realtysync_core::{AccessToken, TokenProvider};
use realtysync_domain::{RealtySyncError, Result};
use realtysync_infra::database::DbManager;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Token provider handing out `token-<account id>` for every account.
pub struct FixedTokens;

#[async_trait]
impl TokenProvider for FixedTokens {
    async fn access_token(&self, account_id: &str) -> Result<AccessToken> {
        if account_id.is_empty() {
            return Err(RealtySyncError::Auth("empty account id".into()));
        }
        Ok(AccessToken::new(format!("token-{account_id}")))
    }
}

/// Google Calendar event item with a timed start.
pub fn google_item(id: &str, summary: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "summary": summary,
        "start": { "dateTime": start },
        "end": { "dateTime": end },
        "attendees": [{ "email": "buyer@example.com" }]
    })
}

/// Microsoft Graph event item with UTC wall-clock times.
pub fn graph_item(id: &str, subject: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "subject": subject,
        "bodyPreview": "",
        "isAllDay": false,
        "start": { "dateTime": start, "timeZone": "UTC" },
        "end": { "dateTime": end, "timeZone": "UTC" },
        "attendees": [{ "emailAddress": { "address": "vendor@example.com" } }]
    })
}
