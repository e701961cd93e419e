//! Development Data Seeder
//!
//! Creates the permissions roles can be granted on a fresh database. Safe to
//! run on every startup.

use sqlx::SqlitePool;
use tracing::info;

use crate::role::PermissionRepository;
use crate::shared::error::Result;

pub struct DevDataSeeder {
    permissions: PermissionRepository,
}

impl DevDataSeeder {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            permissions: PermissionRepository::new(pool),
        }
    }

    /// Ensure every name in `permissions` exists. Returns how many were created.
    pub async fn seed(&self, permissions: &[String]) -> Result<usize> {
        info!("=== DEV DATA SEEDER ===");

        let mut created = 0;
        for name in permissions {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if self.permissions.ensure(name).await?.1 {
                info!("Created permission: {}", name);
                created += 1;
            }
        }

        info!(created, total = permissions.len(), "Development data seeded");
        Ok(created)
    }
}
