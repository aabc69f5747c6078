//! Configuration loading and management

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token signing secret. Must be set, either here or via
    /// CREWDESK_TOKEN_SECRET; the server refuses to start without one.
    #[serde(default)]
    pub token_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Set the Secure attribute on the session cookie. Disable only for
    /// local development over plain HTTP.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
    /// Shared secret gating self-registration; unset disables registration.
    #[serde(default)]
    pub register_secret: Option<String>,
    /// Include failure detail in auth responses.
    #[serde(default)]
    pub dev_mode: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8300
}

fn default_db_path() -> String {
    "./data/crewdesk.db".to_string()
}

fn default_token_ttl_hours() -> i64 {
    8
}

fn default_secure_cookies() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            secure_cookies: default_secure_cookies(),
            register_secret: None,
            dev_mode: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Validate invariants that would otherwise surface as runtime auth
    /// failures. Run after CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_secret.is_empty() {
            bail!(
                "auth.token_secret is not set; refusing to start \
                 (set it in the config file or via CREWDESK_TOKEN_SECRET)"
            );
        }
        if self.auth.token_ttl_hours <= 0 {
            bail!("auth.token_ttl_hours must be positive");
        }
        if !self.auth.secure_cookies {
            warn!("secure_cookies is disabled; session cookies will travel over plain HTTP");
        }
        if self.auth.dev_mode {
            warn!("dev_mode is enabled; auth responses will carry failure detail");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8300);
        assert_eq!(config.auth.token_ttl_hours, 8);
        assert!(config.auth.secure_cookies);
        assert!(config.auth.register_secret.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [auth]
            token_secret = "s3cret"
            secure_cookies = false
            register_secret = "letmein"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.token_secret, "s3cret");
        assert!(!config.auth.secure_cookies);
        assert_eq!(config.auth.register_secret.as_deref(), Some("letmein"));
        assert_eq!(config.database.path, "./data/crewdesk.db");
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.token_secret = "something".to_string();
        assert!(config.validate().is_ok());

        config.auth.token_ttl_hours = 0;
        assert!(config.validate().is_err());
    }
}
