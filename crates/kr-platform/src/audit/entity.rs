//! Audit Log Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,

    /// Entity type affected (e.g. "Role")
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Command type name, e.g. "CreateRoleCommand"
    pub operation: String,

    /// Full command payload as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        operation: impl Into<String>,
        operation_json: Option<String>,
        principal_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_type: entity_type.into(),
            entity_id,
            operation: operation.into(),
            operation_json,
            principal_id,
            performed_at: Utc::now(),
        }
    }

    pub fn with_performed_at(mut self, performed_at: DateTime<Utc>) -> Self {
        self.performed_at = performed_at;
        self
    }

    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let performed_ms: i64 = row.get("performed_at");
        let performed_at = DateTime::from_timestamp_millis(performed_ms).ok_or_else(|| {
            PlatformError::internal(format!("Invalid audit timestamp {}", performed_ms))
        })?;

        Ok(Self {
            id: row.get("id"),
            entity_type: row.get("entity_type"),
            entity_id: row.get("entity_id"),
            operation: row.get("operation"),
            operation_json: row.get("operation_json"),
            principal_id: row.get("principal_id"),
            performed_at,
        })
    }
}
