//! Server configuration: defaults, optional TOML file, then environment.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the bind host.
pub const ENV_HOST: &str = "MEMORY_HOST";
/// Environment variable overriding the bind port.
pub const ENV_PORT: &str = "MEMORY_PORT";
/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "MEMORY_DB_PATH";

/// Settings for the HTTP server and its store.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,
    /// Port to bind.
    port: u16,
    /// SQLite database file.
    db_path: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            db_path: "memory_game.db".to_string(),
            log_filter: "info,memory_server=debug".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads defaults, then the TOML file if given, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment value is malformed.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        info!(host = %config.host, port = config.port, db_path = %config.db_path, "Server config loaded");
        Ok(config)
    }

    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Applies overrides from `lookup` (normally the process environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the port override is not a number.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(ENV_HOST) {
            debug!(host = %host, "Host overridden from environment");
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|e| {
                warn!(value = %port, "Invalid port override");
                ConfigError::new(format!("Invalid {}: {}", ENV_PORT, e))
            })?;
        }
        if let Some(db_path) = lookup(ENV_DB_PATH) {
            debug!(db_path = %db_path, "Database path overridden from environment");
            self.db_path = db_path;
        }
        Ok(())
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "port = 8080\n").expect("write");

        let config = ServerConfig::from_file(&path).expect("parse");
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.db_path(), "memory_game.db");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [(ENV_PORT, "9000"), (ENV_DB_PATH, "/tmp/x.db")].into();
        let mut config = ServerConfig::default().with_host("0.0.0.0");
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .expect("valid env");

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.db_path(), "/tmp/x.db");
    }

    #[test]
    fn test_bad_port_override_fails() {
        let mut config = ServerConfig::default();
        let result = config.apply_env(|k| (k == ENV_PORT).then(|| "http".to_string()));
        assert!(result.is_err());
    }
}
