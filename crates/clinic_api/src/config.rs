//! Process configuration for hosting layers.
//!
//! # Responsibility
//! - Resolve store location, listening port and logging settings from
//!   environment variables.
//! - Open the configured record store.
//!
//! # Invariants
//! - Invalid values are reported with the variable name, never defaulted.

use clinic_core::db::{open_db, open_db_in_memory, DbResult};
use clinic_core::default_log_level;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CLINIC_DB_PATH";
pub const PORT_VAR: &str = "CLINIC_PORT";
pub const LOG_LEVEL_VAR: &str = "CLINIC_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CLINIC_LOG_DIR";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_FILE_NAME: &str = "clinic_records.sqlite3";
const MEMORY_LOCATION: &str = ":memory:";

/// Where the record store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl Display for StoreLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "{MEMORY_LOCATION}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub store: StoreLocation,
    /// Listening port handed to the hosting transport.
    pub port: u16,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { var, value, reason } => {
                write!(f, "invalid {var} value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ClinicConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &str| {
            lookup(var)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store = match read(DB_PATH_VAR) {
            Some(value) if value == MEMORY_LOCATION => StoreLocation::Memory,
            Some(value) => StoreLocation::File(PathBuf::from(value)),
            None => StoreLocation::File(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
        };

        let port = match read(PORT_VAR) {
            Some(value) => parse_port(&value)?,
            None => DEFAULT_PORT,
        };

        let log_level = read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            store,
            port,
            log_level,
            log_dir: read(LOG_DIR_VAR),
        })
    }

    /// Opens the configured store with the schema applied.
    pub fn open_store(&self) -> DbResult<Connection> {
        match &self.store {
            StoreLocation::Memory => open_db_in_memory(),
            StoreLocation::File(path) => open_db(path),
        }
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(0) => Err(ConfigError::Invalid {
            var: PORT_VAR,
            value: value.to_string(),
            reason: "port must be non-zero",
        }),
        Ok(port) => Ok(port),
        Err(_) => Err(ConfigError::Invalid {
            var: PORT_VAR,
            value: value.to_string(),
            reason: "expected an integer between 1 and 65535",
        }),
    }
}
