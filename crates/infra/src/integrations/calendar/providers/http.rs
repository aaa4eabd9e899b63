//! HTTP plumbing shared by the provider adapters

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use realtysync_domain::{RealtySyncError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::errors::InfraError;

/// Build the client shared by all adapters.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RealtySyncError::Config(format!("failed to build HTTP client: {e}")))
}

/// Validate a configured API base URL.
pub fn parse_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RealtySyncError::Config(format!("invalid provider base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RealtySyncError::Config(format!("unsupported URL scheme in '{raw}'")));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Send `request` and decode a JSON body.
///
/// Non-2xx responses become `Provider { status, message }` carrying the body
/// text, so the retry controller can see the status.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
) -> Result<T> {
    let response = request.send().await.map_err(InfraError::from)?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        warn!(provider, status = status.as_u16(), "provider API returned an error");
        return Err(RealtySyncError::Provider { status: status.as_u16(), message: error_text });
    }

    let body = response.text().await.map_err(InfraError::from)?;
    serde_json::from_str(&body).map_err(|e| {
        RealtySyncError::InvalidInput(format!("Failed to parse {provider} response: {e}"))
    })
}

/// Validate email address and log warnings for malformed emails
///
/// Returns None only for empty emails. Malformed emails (missing @) are logged
/// but kept, as provider data is canonical.
pub(crate) fn validate_and_log_email(email: &str, event_id: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        warn!(event_id, email, "empty attendee email");
        return None;
    }
    if !trimmed.contains('@') {
        warn!(event_id, email, "attendee email missing @ symbol");
    }
    Some(trimmed.to_string())
}

/// Parse an RFC 3339 instant, or a naive timestamp taken to be UTC.
pub(crate) fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|naive| naive.and_utc())
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
