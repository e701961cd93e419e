//! Permission Repository

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::cache::RolePermissionMap;
use crate::role::entity::Permission;
use crate::role::repository::timestamp;
use crate::shared::error::{PlatformError, Result};

pub struct PermissionRepository {
    pool: SqlitePool,
}

impl PermissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, name: &str) -> Result<Permission> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query("INSERT INTO permissions (name, created_at) VALUES (?, ?)")
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| PlatformError::from_write(e, "Permission", "name", name))?;

        Ok(Permission {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            created_at: timestamp(now)?,
        })
    }

    /// Return the named permission, creating it first if it does not exist.
    /// The flag is `true` when a row was created.
    pub async fn ensure(&self, name: &str) -> Result<(Permission, bool)> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok((existing, false));
        }
        let created = self.insert(name).await?;
        debug!(permission = name, "Created permission");
        Ok((created, true))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Permission>> {
        let row = sqlx::query("SELECT id, name, created_at FROM permissions WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::parse_row).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<Permission>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM permissions ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::parse_row).collect()
    }

    /// Every role name with the names of the permissions it grants. Roles
    /// without permissions map to an empty set.
    pub async fn load_role_permission_map(&self) -> Result<RolePermissionMap> {
        let rows = sqlx::query(
            "SELECT r.name AS role_name, p.name AS permission_name FROM roles r \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id \
             LEFT JOIN permissions p ON p.id = rp.permission_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut map = RolePermissionMap::new();
        for row in &rows {
            let role: String = row.get("role_name");
            let permission: Option<String> = row.get("permission_name");
            let entry = map.entry(role).or_default();
            if let Some(permission) = permission {
                entry.insert(permission);
            }
        }
        Ok(map)
    }

    fn parse_row(row: &SqliteRow) -> Result<Permission> {
        Ok(Permission {
            id: row.get("id"),
            name: row.get("name"),
            created_at: timestamp(row.get("created_at"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let repo = PermissionRepository::new(setup().await);

        let (first, created) = repo.ensure("edit-post").await.unwrap();
        assert!(created);
        let (second, created) = repo.ensure("edit-post").await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate() {
        let repo = PermissionRepository::new(setup().await);
        repo.insert("edit-post").await.unwrap();
        assert!(matches!(
            repo.insert("edit-post").await,
            Err(PlatformError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_role_permission_map() {
        let pool = setup().await;
        let repo = PermissionRepository::new(pool.clone());
        let edit = repo.insert("edit-post").await.unwrap();

        sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (1, 'Editor', 0, 0), (2, 'Guest', 0, 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES (1, ?)")
            .bind(edit.id)
            .execute(&pool)
            .await
            .unwrap();

        let map = repo.load_role_permission_map().await.unwrap();
        assert_eq!(map.len(), 2);
        assert!(map["Editor"].contains("edit-post"));
        assert!(map["Guest"].is_empty());
    }
}
