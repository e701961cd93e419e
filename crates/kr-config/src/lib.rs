//! Keyring Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use kr_common::LoggingOptions;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Config file not found: {}", .0.display())]
    NotFound(std::path::PathBuf),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub roles: RolesConfig,
    pub cache: CacheConfig,
    pub logging: LoggingOptions,
    pub seed: SeedConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. "sqlite://./data/keyring.db?mode=rwc"
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/keyring.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

/// Role policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Reject roles that end up with an empty permission set
    pub role_must_contain_permission: bool,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            role_must_contain_permission: true,
        }
    }
}

/// Permission cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache entry holding the role → permissions map
    pub permission_key: String,
    /// Staleness bound for cached entries
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            permission_key: "permission-cache".to_string(),
            ttl_seconds: 86_400,
        }
    }
}

/// Development seed data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
    pub permissions: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permissions: vec![
                "view backend".to_string(),
                "edit-post".to_string(),
                "publish-post".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.cache.permission_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.permission_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Keyring Configuration
# Environment variables (KEYRING_*) override these settings

[database]
url = "sqlite://./data/keyring.db?mode=rwc"
max_connections = 5

[roles]
role_must_contain_permission = true

[cache]
permission_key = "permission-cache"
ttl_seconds = 86400

[logging]
format = "text"  # text or json
level = "info"

[seed]
enabled = true
permissions = ["view backend", "edit-post", "publish-post"]
"#
        .to_string()
    }
}
