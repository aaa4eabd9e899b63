//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use realtysync_domain::RealtySyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RealtySyncError);

impl From<InfraError> for RealtySyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RealtySyncError> for InfraError {
    fn from(value: RealtySyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRealtySyncError {
    fn into_domain(self) -> RealtySyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → RealtySyncError */
/* -------------------------------------------------------------------------- */

impl IntoRealtySyncError for SqlError {
    fn into_domain(self) -> RealtySyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        RealtySyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        RealtySyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        RealtySyncError::Database("unique constraint violation".into())
                    }
                    _ => RealtySyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                RealtySyncError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                RealtySyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                RealtySyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => RealtySyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => RealtySyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → RealtySyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(RealtySyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → RealtySyncError */
/* -------------------------------------------------------------------------- */

impl IntoRealtySyncError for KeyringError {
    fn into_domain(self) -> RealtySyncError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => RealtySyncError::Auth("no credentials stored in keychain".into()),
            BadEncoding(_) => {
                RealtySyncError::Auth("credential in keychain is not valid UTF-8".into())
            }
            Ambiguous(entries) => RealtySyncError::Auth(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                RealtySyncError::Auth(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                RealtySyncError::Auth(format!("unable to access secure storage: {err}"))
            }
            _ => RealtySyncError::Auth(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RealtySyncError */
/* -------------------------------------------------------------------------- */

impl IntoRealtySyncError for HttpError {
    fn into_domain(self) -> RealtySyncError {
        if self.is_timeout() {
            return RealtySyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RealtySyncError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return RealtySyncError::InvalidInput(format!("undecodable response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message = status.canonical_reason().unwrap_or("unknown status").to_string();
            return RealtySyncError::Provider { status: code, message };
        }

        RealtySyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → RealtySyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(RealtySyncError::InvalidInput(format!("invalid JSON: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
