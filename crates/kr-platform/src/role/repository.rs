//! Role Repository
//!
//! Reads go through [`RoleRepository`] on the pool. Writes go through a
//! [`RoleTransaction`] opened by the unit of work so they commit together with
//! the domain event.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::role::entity::Role;
use crate::shared::error::{PlatformError, Result};
use crate::usecase::SqliteTransaction;

/// Role writes available inside an open transaction.
#[async_trait]
pub trait RoleTransaction: Send {
    /// The role as this transaction sees it, with permissions and users.
    async fn load_role(&mut self, id: i64) -> Result<Option<Role>>;

    /// Insert a new role row and return it with its assigned id.
    async fn insert_role(&mut self, name: &str) -> Result<Role>;

    /// Rename `role`. Returns `false` when no row was updated.
    async fn update_role_name(&mut self, role: &mut Role, name: &str) -> Result<bool>;

    /// Grant `permissions` in addition to the ones `role` already has.
    async fn attach_permissions(&mut self, role: &mut Role, permissions: &[String]) -> Result<()>;

    /// Replace the permission set of `role` with exactly `permissions`.
    async fn sync_permissions(&mut self, role: &mut Role, permissions: &[String]) -> Result<()>;
}

#[async_trait]
impl RoleTransaction for SqliteTransaction {
    async fn load_role(&mut self, id: i64) -> Result<Option<Role>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.inner)
            .await?;

        match row {
            Some(row) => Ok(Some(hydrate_role(&mut *self.inner, &row).await?)),
            None => Ok(None),
        }
    }

    async fn insert_role(&mut self, name: &str) -> Result<Role> {
        let now = now_millis()?;
        let result = sqlx::query("INSERT INTO roles (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now.timestamp_millis())
            .bind(now.timestamp_millis())
            .execute(&mut *self.inner)
            .await
            .map_err(|e| PlatformError::from_write(e, "Role", "name", name))?;

        let id = result.last_insert_rowid();
        debug!(role_id = id, name, "Inserted role");

        Ok(Role {
            id,
            name: name.to_string(),
            permissions: BTreeSet::new(),
            user_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_role_name(&mut self, role: &mut Role, name: &str) -> Result<bool> {
        let now = now_millis()?;
        let result = sqlx::query("UPDATE roles SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(now.timestamp_millis())
            .bind(role.id)
            .execute(&mut *self.inner)
            .await
            .map_err(|e| PlatformError::from_write(e, "Role", "name", name))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        role.name = name.to_string();
        role.updated_at = now;
        Ok(true)
    }

    async fn attach_permissions(&mut self, role: &mut Role, permissions: &[String]) -> Result<()> {
        let resolved = resolve_permissions(&mut *self.inner, permissions).await?;

        for (permission_id, name) in resolved {
            sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                .bind(role.id)
                .bind(permission_id)
                .execute(&mut *self.inner)
                .await?;
            role.permissions.insert(name);
        }

        debug!(role_id = role.id, count = role.permissions.len(), "Attached permissions");
        Ok(())
    }

    async fn sync_permissions(&mut self, role: &mut Role, permissions: &[String]) -> Result<()> {
        let resolved = resolve_permissions(&mut *self.inner, permissions).await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
            .bind(role.id)
            .execute(&mut *self.inner)
            .await?;

        let mut synced = BTreeSet::new();
        for (permission_id, name) in resolved {
            sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                .bind(role.id)
                .bind(permission_id)
                .execute(&mut *self.inner)
                .await?;
            synced.insert(name);
        }
        role.permissions = synced;

        debug!(role_id = role.id, count = role.permissions.len(), "Synced permissions");
        Ok(())
    }
}

/// Look up permission ids by name. Any unknown name fails the whole lookup.
async fn resolve_permissions(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<Vec<(i64, String)>> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM permissions WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        match id {
            Some(id) => resolved.push((id, name.clone())),
            None => return Err(PlatformError::PermissionNotFound { name: name.clone() }),
        }
    }
    Ok(resolved)
}

/// Build a [`Role`] from its row, loading permission names and user ids.
async fn hydrate_role(conn: &mut SqliteConnection, row: &SqliteRow) -> Result<Role> {
    let id: i64 = row.get("id");

    let permissions: Vec<String> = sqlx::query_scalar(
        "SELECT p.name FROM role_permissions rp \
         JOIN permissions p ON p.id = rp.permission_id \
         WHERE rp.role_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let user_ids: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM role_users WHERE role_id = ?")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Role {
        id,
        name: row.get("name"),
        permissions: permissions.into_iter().collect(),
        user_ids: user_ids.into_iter().collect(),
        created_at: timestamp(row.get("created_at"))?,
        updated_at: timestamp(row.get("updated_at"))?,
    })
}

fn now_millis() -> Result<DateTime<Utc>> {
    timestamp(Utc::now().timestamp_millis())
}

pub(crate) fn timestamp(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| PlatformError::internal(format!("Invalid timestamp {}", ms)))
}

/// Read access to roles with their permissions and users loaded.
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Role>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id_or_fail(&self, id: i64) -> Result<Role> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Role", id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name, created_at, updated_at FROM roles ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in &rows {
            roles.push(self.hydrate(row).await?);
        }
        Ok(roles)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Give `user_id` the role. Assigning twice is a no-op.
    pub async fn assign_user(&self, role_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO role_users (role_id, user_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn hydrate(&self, row: &SqliteRow) -> Result<Role> {
        let mut conn = self.pool.acquire().await?;
        hydrate_role(&mut *conn, row).await
    }
}
