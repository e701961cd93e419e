//! Configuration Access
//!
//! Use cases read policy flags through [`ConfigProvider`] so tests and
//! embedding applications can substitute their own source.

use tracing::debug;

use kr_config::AppConfig;

/// Key of the "every role needs a permission" policy flag.
pub const ROLE_MUST_CONTAIN_PERMISSION: &str = "roles.role_must_contain_permission";

/// Read-only access to boolean configuration flags.
pub trait ConfigProvider: Send + Sync {
    /// Value of `key`. Unknown keys read as `false`.
    fn get_bool(&self, key: &str) -> bool;
}

impl ConfigProvider for AppConfig {
    fn get_bool(&self, key: &str) -> bool {
        match key {
            ROLE_MUST_CONTAIN_PERMISSION => self.roles.role_must_contain_permission,
            "seed.enabled" => self.seed.enabled,
            _ => {
                debug!(key, "Unknown boolean config key");
                false
            }
        }
    }
}
