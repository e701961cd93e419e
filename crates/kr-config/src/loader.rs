//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use kr_common::LogFormat;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "keyring.toml",
    "config.toml",
    "./config/keyring.toml",
    "/etc/keyring/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup)? {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        Self::apply_env_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    /// An explicitly given path must exist. The env var and the standard
    /// paths are only searched when none was given.
    fn find_config_file<F>(&self, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.clone()));
            }
            return Ok(Some(path.clone()));
        }

        if let Some(path) = lookup("KEYRING_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            warn!(?path, "KEYRING_CONFIG points to a missing file, searching defaults");
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }

    fn apply_env_overrides<F>(config: &mut AppConfig, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        if let Some(val) = lookup("KEYRING_DATABASE_URL") {
            config.database.url = val;
        }
        if let Some(val) = lookup("KEYRING_DATABASE_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                config.database.max_connections = n;
            }
        }

        // Roles
        if let Some(val) = lookup("KEYRING_ROLE_MUST_CONTAIN_PERMISSION") {
            if let Some(flag) = parse_bool(&val) {
                config.roles.role_must_contain_permission = flag;
            } else {
                warn!(value = %val, "Ignoring unparseable KEYRING_ROLE_MUST_CONTAIN_PERMISSION");
            }
        }

        // Cache
        if let Some(val) = lookup("KEYRING_CACHE_PERMISSION_KEY") {
            config.cache.permission_key = val;
        }
        if let Some(val) = lookup("KEYRING_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = val.parse() {
                config.cache.ttl_seconds = ttl;
            }
        }

        // Logging
        if let Some(val) = lookup("KEYRING_LOG_FORMAT") {
            config.logging.format = LogFormat::parse(&val);
        }
        if let Some(val) = lookup("KEYRING_LOG_LEVEL") {
            config.logging.level = val;
        }

        // Seed
        if let Some(val) = lookup("KEYRING_SEED_ENABLED") {
            config.seed.enabled = parse_bool(&val).unwrap_or(config.seed.enabled);
        }
        if let Some(val) = lookup("KEYRING_SEED_PERMISSIONS") {
            config.seed.permissions = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[roles]\nrole_must_contain_permission = false").unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[]))
            .unwrap();

        assert!(!config.roles.role_must_contain_permission);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[roles]\nrole_must_contain_permission = false").unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[
                ("KEYRING_ROLE_MUST_CONTAIN_PERMISSION", "true"),
                ("KEYRING_DATABASE_URL", "sqlite::memory:"),
                ("KEYRING_SEED_PERMISSIONS", "a, b,,c"),
                ("KEYRING_LOG_FORMAT", "json"),
            ]))
            .unwrap();

        assert!(config.roles.role_must_contain_permission);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.seed.permissions, vec!["a", "b", "c"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let result = ConfigLoader::with_path(&missing).load_with(lookup_from(&[]));

        assert!(matches!(result, Err(ConfigError::NotFound(ref path)) if *path == missing));
    }

    #[test]
    fn test_unparseable_flag_is_ignored() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[("KEYRING_ROLE_MUST_CONTAIN_PERMISSION", "maybe")]))
            .unwrap();

        assert!(config.roles.role_must_contain_permission);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[("KEYRING_CACHE_PERMISSION_KEY", "  ")]));

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("2"), None);
    }
}
