//! Server configuration.
//!
//! Loaded from environment variables with development defaults.

use std::env;

use thiserror::Error;

/// Stockroom server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// | Variable        | Default            |
    /// |-----------------|--------------------|
    /// | `PORT`          | `3000`             |
    /// | `DATABASE_PATH` | `./stockroom.db`   |
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./stockroom.db".to_string()),
        };

        Ok(config)
    }
}
