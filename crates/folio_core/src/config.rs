//! Environment-driven runtime configuration.
//!
//! Recognized variables:
//! - `FOLIO_DB_PATH`: SQLite database file (default `folio.sqlite3`).
//! - `FOLIO_LOG_LEVEL`: `trace|debug|info|warn|error` (default per build mode).
//! - `FOLIO_LOG_DIR`: absolute directory for rolling log files; unset disables
//!   file logging.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FOLIO_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FOLIO_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FOLIO_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "folio.sqlite3";

/// Default level: `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Maps a user-supplied level name onto the `flexi_logger` spelling.
pub fn parse_log_level(value: &str) -> Result<&'static str, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl FolioConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = var(DB_PATH_VAR).unwrap_or_else(|| {
            info!("{DB_PATH_VAR} not set, using default: {DEFAULT_DB_PATH}");
            DEFAULT_DB_PATH.to_string()
        });

        let log_level = match var(LOG_LEVEL_VAR) {
            Some(level) => parse_log_level(&level).map_err(|message| {
                ConfigError::InvalidValue {
                    key: LOG_LEVEL_VAR,
                    message,
                }
            })?,
            None => {
                let level = default_log_level();
                info!("{LOG_LEVEL_VAR} not set, using default: {level}");
                level
            }
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            log_level,
            log_dir: var(LOG_DIR_VAR).map(PathBuf::from),
        })
    }
}
