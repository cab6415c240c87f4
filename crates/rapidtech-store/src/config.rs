//! Storefront configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                | Default                 |
//! |-------------------------|-------------------------|
//! | `STORE_BACKEND`         | `sqlite`                |
//! | `DATABASE_PATH`         | `./rapidtech.db`        |
//! | `DB_MAX_CONNECTIONS`    | `5`                     |
//! | `JWT_SECRET`            | development secret      |
//! | `JWT_LIFETIME_SECS`     | `86400` (24 h, max 1 y) |
//! | `STORE_OP_TIMEOUT_SECS` | `10`                    |
//! | `ADMIN_EMAIL`           | `admin@rapidtech.local` |
//! | `ADMIN_FULL_NAME`       | `Admin`                 |
//! | `ADMIN_PASSWORD`        | `Admin123!`             |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rapidtech_core::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_FULL_NAME, DEFAULT_ADMIN_PASSWORD};
use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

/// Longest accepted token lifetime: one year.
pub const MAX_JWT_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Which Store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Memory,
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            _ => Err(ConfigError::InvalidValue("STORE_BACKEND".to_string())),
        }
    }
}

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: BackendKind,

    /// SQLite database file
    pub database_path: PathBuf,

    pub db_max_connections: u32,

    /// HS256 signing secret
    pub jwt_secret: String,

    /// Token (and session) lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Deadline applied to every storefront operation
    pub op_timeout_secs: u64,

    pub admin_email: String,
    pub admin_full_name: String,
    pub admin_password: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = StoreConfig {
            backend: var("STORE_BACKEND", "sqlite").parse()?,

            database_path: PathBuf::from(var("DATABASE_PATH", "./rapidtech.db")),

            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            // In production, this MUST be set via environment variable
            jwt_secret: var("JWT_SECRET", "rapidtech-dev-secret-change-in-production"),

            jwt_lifetime_secs: var("JWT_LIFETIME_SECS", "86400")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            op_timeout_secs: var("STORE_OP_TIMEOUT_SECS", "10")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STORE_OP_TIMEOUT_SECS".to_string()))?,

            admin_email: var("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            admin_full_name: var("ADMIN_FULL_NAME", DEFAULT_ADMIN_FULL_NAME),
            admin_password: var("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if !(1..=MAX_JWT_LIFETIME_SECS).contains(&config.jwt_lifetime_secs) {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }

    /// Pool settings for the SQLite backend.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
