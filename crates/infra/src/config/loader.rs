//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `REALTYSYNC_DB_PATH` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. With no file anywhere, built-in defaults are used
//!
//! ## Environment Variables
//! - `REALTYSYNC_DB_PATH`: Database file path (required for env loading)
//! - `REALTYSYNC_DB_POOL_SIZE`: Connection pool size
//! - `REALTYSYNC_SYNC_INTERVAL`: Sync interval in seconds
//! - `REALTYSYNC_SYNC_ENABLED`: Whether sync is enabled (true/false)
//! - `REALTYSYNC_MAX_RETRIES`: Retries per account and pass
//! - `REALTYSYNC_BACKFILL_DAYS`: Days fetched on an account's first sync
//! - `REALTYSYNC_MAX_EVENTS`: Per-sync event cap (1..=250)
//! - `REALTYSYNC_GOOGLE_BASE_URL`: Google Calendar API base URL
//! - `REALTYSYNC_MICROSOFT_BASE_URL`: Microsoft Graph API base URL
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./realtysync.toml`, `./realtysync.json`, `./config.toml`,
//!    `./config.json` (current working directory)
//! 2. The same names in the parent directory
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use realtysync_domain::{Config, RealtySyncError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["realtysync.toml", "realtysync.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment loading is selected by the presence of `REALTYSYNC_DB_PATH`;
/// once selected, an invalid variable is an error rather than a fallback.
///
/// # Errors
/// Returns `RealtySyncError::Config` if a source is present but invalid, or
/// if the resulting configuration fails validation.
pub fn load() -> Result<Config> {
    let config = if std::env::var_os("REALTYSYNC_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        tracing::debug!("REALTYSYNC_DB_PATH not set, trying config file");
        match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::info!("No config file found, using built-in defaults");
                Config::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `REALTYSYNC_DB_PATH` must be present; every other variable falls back to
/// its default when unset.
///
/// # Errors
/// Returns `RealtySyncError::Config` if the path is missing or any variable
/// has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("REALTYSYNC_DB_PATH")?;
    if let Some(pool_size) = env_parse::<u32>("REALTYSYNC_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }

    if let Some(interval) = env_parse::<u64>("REALTYSYNC_SYNC_INTERVAL")? {
        config.sync.interval_seconds = interval;
    }
    config.sync.enabled = env_bool("REALTYSYNC_SYNC_ENABLED", config.sync.enabled);
    if let Some(max_retries) = env_parse::<u32>("REALTYSYNC_MAX_RETRIES")? {
        config.sync.max_retries = max_retries;
    }
    if let Some(days) = env_parse::<i64>("REALTYSYNC_BACKFILL_DAYS")? {
        config.sync.backfill_days = days;
    }
    if let Some(max_events) = env_parse::<usize>("REALTYSYNC_MAX_EVENTS")? {
        config.sync.max_events = max_events;
    }

    if let Ok(url) = std::env::var("REALTYSYNC_GOOGLE_BASE_URL") {
        config.providers.google_base_url = url;
    }
    if let Ok(url) = std::env::var("REALTYSYNC_MICROSOFT_BASE_URL") {
        config.providers.microsoft_base_url = url;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RealtySyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RealtySyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RealtySyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RealtySyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RealtySyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RealtySyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RealtySyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
            dirs.push(exe_dir.join(".."));
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RealtySyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| RealtySyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
