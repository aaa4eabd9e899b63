//! Sync account model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RealtySyncError, Result};

/// External calendar provider backing a sync account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Microsoft,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = RealtySyncError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" | "outlook" => Ok(Self::Microsoft),
            other => Err(RealtySyncError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// One external calendar connection owned by a user.
///
/// `provider` keeps the tag exactly as stored so that an unknown tag only
/// fails the sync of this account instead of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAccount {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    pub sync_enabled: bool,
    /// `None` means the account has never synced and needs a full backfill.
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl SyncAccount {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            provider: provider.as_str().to_string(),
            sync_enabled: true,
            last_sync_at: None,
        }
    }

    /// Parse the stored provider tag.
    ///
    /// # Errors
    /// Returns `RealtySyncError::UnsupportedProvider` for unknown tags.
    pub fn provider_kind(&self) -> Result<ProviderKind> {
        self.provider.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_tags_parse_case_insensitively() {
        assert_eq!("Google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!(" MICROSOFT ".parse::<ProviderKind>().unwrap(), ProviderKind::Microsoft);
        assert_eq!("outlook".parse::<ProviderKind>().unwrap(), ProviderKind::Microsoft);
    }

    #[test]
    fn unknown_provider_tag_is_unsupported() {
        let account = SyncAccount {
            provider: "yahoo".into(),
            ..SyncAccount::new("acct-1", "user-1", ProviderKind::Google)
        };
        match account.provider_kind() {
            Err(RealtySyncError::UnsupportedProvider(tag)) => assert_eq!(tag, "yahoo"),
            other => panic!("expected unsupported provider, got {other:?}"),
        }
    }
}
