//! Audit Log Repository

use sqlx::{SqliteConnection, SqlitePool};

use crate::audit::AuditLog;
use crate::shared::error::Result;

pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Entries for one entity, newest first.
    pub async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>> {
        let rows = sqlx::query(
            "SELECT id, entity_type, entity_id, operation, operation_json, principal_id, performed_at \
             FROM audit_logs WHERE entity_type = ? AND entity_id = ? \
             ORDER BY performed_at DESC, rowid DESC LIMIT ?",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(AuditLog::from_row).collect()
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub(crate) async fn insert(conn: &mut SqliteConnection, log: &AuditLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO audit_logs (id, entity_type, entity_id, operation, operation_json, principal_id, performed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&log.id)
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.operation)
        .bind(&log.operation_json)
        .bind(&log.principal_id)
        .bind(log.performed_at.timestamp_millis())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
