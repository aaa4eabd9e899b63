//! Calendar provider adapters
//!
//! One [`EventSource`](realtysync_core::EventSource) implementation per
//! provider (Google Calendar, Microsoft Graph). Each pages internally and
//! hands back a flat list capped at the configured event limit.

pub mod google;
pub mod http;
pub mod microsoft;

use std::sync::Arc;

use realtysync_core::ProviderRegistry;
use realtysync_domain::{Config, Result};

pub use google::GoogleCalendarSource;
pub use microsoft::MicrosoftCalendarSource;

/// Registry with both adapters built from `config`.
pub fn build_registry(config: &Config) -> Result<ProviderRegistry> {
    let client = http::build_client(config.sync.request_timeout())?;
    let google_base = http::parse_base_url(&config.providers.google_base_url)?;
    let microsoft_base = http::parse_base_url(&config.providers.microsoft_base_url)?;

    Ok(ProviderRegistry::new()
        .with_source(Arc::new(GoogleCalendarSource::new(
            client.clone(),
            &google_base,
            config.sync.max_events,
        )))
        .with_source(Arc::new(MicrosoftCalendarSource::new(
            client,
            &microsoft_base,
            config.sync.max_events,
        ))))
}
