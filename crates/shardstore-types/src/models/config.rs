//! Store connection configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

const ENV_DATABASE_URL: &str = "SHARDSTORE_DATABASE_URL";
const ENV_DATABASE_URL_FALLBACK: &str = "DATABASE_URL";
const ENV_MAX_CONNECTIONS: &str = "SHARDSTORE_MAX_CONNECTIONS";
const ENV_MIN_CONNECTIONS: &str = "SHARDSTORE_MIN_CONNECTIONS";
const ENV_ACQUIRE_TIMEOUT_SECS: &str = "SHARDSTORE_ACQUIRE_TIMEOUT_SECS";
const ENV_IDLE_TIMEOUT_SECS: &str = "SHARDSTORE_IDLE_TIMEOUT_SECS";
const ENV_BUSY_TIMEOUT_MS: &str = "SHARDSTORE_BUSY_TIMEOUT_MS";
const ENV_RUN_MIGRATIONS: &str = "SHARDSTORE_RUN_MIGRATIONS";

/// Database backend selected by the connection URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StoreBackend {
    /// PostgreSQL server, row-level locking
    Postgres,
    /// SQLite database file, database-level locking
    Sqlite {
        /// Path of the database file
        path: PathBuf,
    },
}

/// Connection settings for a shard store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StoreConfig {
    /// `postgres://...` or `sqlite://<path>`
    #[validate(length(min = 1))]
    pub database_url: String,
    /// Upper bound of the PostgreSQL pool
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    #[validate(range(min = 1))]
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Seconds before an idle pooled connection is closed
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// SQLite busy handler timeout in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Apply the schema when connecting
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_run_migrations() -> bool {
    true
}

impl StoreConfig {
    /// Create a config with default pool settings.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
            run_migrations: default_run_migrations(),
        }
    }

    /// Load config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL)
            .or_else(|| lookup(ENV_DATABASE_URL_FALLBACK))
            .ok_or_else(|| ConfigError::Missing { key: ENV_DATABASE_URL.to_string() })?;

        let mut config = Self::new(database_url);
        if let Some(value) = parse_var(&lookup, ENV_MAX_CONNECTIONS)? {
            config.max_connections = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MIN_CONNECTIONS)? {
            config.min_connections = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_ACQUIRE_TIMEOUT_SECS)? {
            config.acquire_timeout_secs = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_IDLE_TIMEOUT_SECS)? {
            config.idle_timeout_secs = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_BUSY_TIMEOUT_MS)? {
            config.busy_timeout_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_RUN_MIGRATIONS)? {
            config.run_migrations = value;
        }

        config.check()?;
        Ok(config)
    }

    /// Run field validation plus cross-field checks.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|e| ConfigError::from_validation_errors(&e))?;
        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "min_connections".to_string(),
                message: format!(
                    "must not exceed max_connections ({} > {})",
                    self.min_connections, self.max_connections
                ),
            });
        }
        self.backend().map(|_| ())
    }

    /// Classify `database_url` into a backend.
    pub fn backend(&self) -> Result<StoreBackend, ConfigError> {
        let url = self.database_url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(StoreBackend::Postgres);
        }

        let sqlite_path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"));
        match sqlite_path {
            Some(path) if path.is_empty() || path.starts_with(":memory:") => {
                Err(ConfigError::ValidationError {
                    field: "database_url".to_string(),
                    message: "sqlite store requires a database file path".to_string(),
                })
            },
            Some(path) => Ok(StoreBackend::Sqlite { path: PathBuf::from(path) }),
            None => Err(ConfigError::ValidationError {
                field: "database_url".to_string(),
                message: "unsupported scheme, expected postgres:// or sqlite://".to_string(),
            }),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::ParseError {
            message: format!("{key}={raw}: {e}"),
        }),
    }
}
