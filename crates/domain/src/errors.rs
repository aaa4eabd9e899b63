//! Error types used throughout the sync engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RealtySync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RealtySyncError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection reset, timeout, DNS, refused).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from a provider API. `message` carries the body text.
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RealtySyncError {
    /// Stable label suitable for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Provider { .. } => "provider",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status carried by a provider error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for RealtySync operations
pub type Result<T> = std::result::Result<T, RealtySyncError>;
