use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Careboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the SQLite database location.
pub const DB_PATH_ENV: &str = "CAREBOARD_DB_PATH";
/// Environment variable overriding the HTTP listen address.
pub const BIND_ADDR_ENV: &str = "CAREBOARD_BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DATABASE_FILE: &str = "careboard.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot determine home directory; set CAREBOARD_DB_PATH")]
    NoHomeDirectory,

    #[error("Invalid CAREBOARD_BIND_ADDR value {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,careboard_lib=debug"
}

/// Get the application data directory
/// ~/Careboard/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home.join(APP_NAME))
}

/// Default database path inside the application data directory.
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join(DATABASE_FILE))
}

/// Runtime configuration of the dashboard server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (env, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let raw_addr = lookup(BIND_ADDR_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { db_path, bind_addr })
    }
}
