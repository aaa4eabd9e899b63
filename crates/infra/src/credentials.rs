//! Access token lookup using the system keyring
use async_trait::async_trait;
use keyring::Entry;
use realtysync_core::{AccessToken, TokenProvider};
use realtysync_domain::{RealtySyncError, Result};
use tracing::debug;

use crate::errors::InfraError;

const SERVICE_NAME: &str = "realtysync";

/// Reads provider access tokens stored per account in the OS keychain.
///
/// Entries live under service `realtysync` with the account id as user.
/// Refreshing expired tokens is left to whatever wrote them.
#[derive(Debug, Clone, Default)]
pub struct KeyringTokenProvider {
    service: String,
}

impl KeyringTokenProvider {
    pub fn new() -> Self {
        Self { service: SERVICE_NAME.to_string() }
    }

    /// Use a different keychain service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, account_id: &str) -> Result<Entry> {
        Entry::new(&self.service, account_id).map_err(|e| InfraError::from(e).into())
    }

    /// Store (or replace) the token for an account.
    pub fn store_token(&self, account_id: &str, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(RealtySyncError::InvalidInput("access token must not be empty".into()));
        }
        self.entry(account_id)?.set_password(token).map_err(InfraError::from)?;
        debug!(account_id, "stored access token");
        Ok(())
    }

    /// Remove the stored token for an account.
    pub fn delete_token(&self, account_id: &str) -> Result<()> {
        self.entry(account_id)?.delete_credential().map_err(InfraError::from)?;
        Ok(())
    }
}

#[async_trait]
impl TokenProvider for KeyringTokenProvider {
    async fn access_token(&self, account_id: &str) -> Result<AccessToken> {
        let secret = self.entry(account_id)?.get_password().map_err(InfraError::from)?;
        Ok(AccessToken::new(secret))
    }
}
