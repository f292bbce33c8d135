//! Runtime configuration from environment variables.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Parsing never reads the process environment directly except through
//!   [`BoardConfig::from_env`].

use crate::logging::{default_log_level, LogLevel, LoggingError};
use crate::repo::payload::STORAGE_KEY;
use crate::service::persist_schedule::DEFAULT_SAVE_DEBOUNCE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "KANBAN_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "KANBAN_STORAGE_KEY";
pub const ENV_SAVE_DEBOUNCE_MS: &str = "KANBAN_SAVE_DEBOUNCE_MS";
pub const ENV_LOG_LEVEL: &str = "KANBAN_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "kanban_board.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    InvalidDebounce { value: String },
    InvalidLogLevel(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDebounce { value } => write!(
                f,
                "{ENV_SAVE_DEBOUNCE_MS} must be a whole number of milliseconds, got `{value}`"
            ),
            Self::InvalidLogLevel(err) => write!(f, "{ENV_LOG_LEVEL}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDebounce { .. } => None,
            Self::InvalidLogLevel(err) => Some(err),
        }
    }
}

/// Settings for opening a board session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub save_debounce: Duration,
    pub log_level: LogLevel,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: STORAGE_KEY.to_string(),
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            log_level: default_log_level(),
        }
    }
}

impl BoardConfig {
    /// Directory for rolling log files: `logs/` beside the database file.
    pub fn log_dir(&self) -> PathBuf {
        self.db_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir)
            .join("logs")
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = read(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        if let Some(value) = read(ENV_SAVE_DEBOUNCE_MS) {
            let millis = value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDebounce { value })?;
            config.save_debounce = Duration::from_millis(millis);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level.parse().map_err(ConfigError::InvalidLogLevel)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BoardConfig, ConfigError, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_SAVE_DEBOUNCE_MS,
        ENV_STORAGE_KEY,
    };
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = BoardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.save_debounce, Duration::from_millis(500));
        assert_eq!(config.storage_key, "kanban-board-data");
    }

    #[test]
    fn overrides_are_trimmed_and_blank_values_ignored() {
        let config = BoardConfig::from_lookup(lookup(&[
            (ENV_STORAGE_KEY, "  "),
            (ENV_SAVE_DEBOUNCE_MS, " 250 "),
            (ENV_LOG_LEVEL, "Warn"),
        ]))
        .unwrap();
        assert_eq!(config.storage_key, "kanban-board-data");
        assert_eq!(config.save_debounce, Duration::from_millis(250));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn log_dir_sits_beside_database() {
        let config =
            BoardConfig::from_lookup(lookup(&[(ENV_DB_PATH, "/var/lib/kanban/board.sqlite3")]))
                .unwrap();
        assert_eq!(config.log_dir(), PathBuf::from("/var/lib/kanban/logs"));

        let bare = BoardConfig::from_lookup(lookup(&[(ENV_DB_PATH, "board.sqlite3")])).unwrap();
        assert_eq!(bare.log_dir(), std::env::temp_dir().join("logs"));
    }

    #[test]
    fn non_numeric_debounce_is_rejected() {
        let err = BoardConfig::from_lookup(lookup(&[(ENV_SAVE_DEBOUNCE_MS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDebounce { ref value } if value == "soon"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = BoardConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(err.to_string().contains(ENV_LOG_LEVEL));
    }
}
