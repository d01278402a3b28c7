//! Server configuration.
//!
//! Loaded from environment variables with development-friendly defaults.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// Identifier of this terminal, used to key the cart snapshot.
    pub terminal_id: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable            | Default          |
    /// |---------------------|------------------|
    /// | `CAIXA_BIND_ADDR`   | `127.0.0.1:3000` |
    /// | `CAIXA_DB_PATH`     | `./caixa.db`     |
    /// | `CAIXA_TERMINAL_ID` | `terminal-1`     |
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            bind_addr: env::var("CAIXA_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            database_path: env::var("CAIXA_DB_PATH").unwrap_or_else(|_| "./caixa.db".to_string()),
            terminal_id: env::var("CAIXA_TERMINAL_ID")
                .unwrap_or_else(|_| "terminal-1".to_string()),
        };

        if config.terminal_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("CAIXA_TERMINAL_ID".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
