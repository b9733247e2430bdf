//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database path and logging settings for binaries.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed ones are errors.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FULLDASH_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FULLDASH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FULLDASH_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "data/fulldash.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl DashConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|message| {
                ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    message,
                }
            })?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(normalize_log_dir(&dir).map_err(|message| {
                ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    message,
                }
            })?);
        }

        Ok(config)
    }
}
