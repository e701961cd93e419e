//! Event Entity
//!
//! CloudEvents-shaped record of a committed domain event. Immutable once
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::shared::error::{PlatformError, Result};
use crate::usecase::DomainEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,

    /// Format: {app}:{domain}:{aggregate}:{action}
    #[serde(rename = "type")]
    pub event_type: String,

    pub spec_version: String,
    pub source: String,
    pub subject: String,

    /// Events sharing a message group are delivered in order
    pub message_group: String,

    pub execution_id: String,
    pub correlation_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    pub principal_id: String,

    /// Full serialized domain event
    pub data: serde_json::Value,

    pub time: DateTime<Utc>,
}

impl Event {
    /// Capture a domain event for storage.
    pub fn from_domain_event<E>(event: &E) -> Result<Self>
    where
        E: DomainEvent + Serialize,
    {
        Ok(Self {
            id: event.event_id().to_string(),
            event_type: event.event_type().to_string(),
            spec_version: event.spec_version().to_string(),
            source: event.source().to_string(),
            subject: event.subject().to_string(),
            message_group: event.message_group().to_string(),
            execution_id: event.execution_id().to_string(),
            correlation_id: event.correlation_id().to_string(),
            causation_id: event.causation_id().map(String::from),
            principal_id: event.principal_id().to_string(),
            data: serde_json::to_value(event)?,
            time: event.time(),
        })
    }

    /// Aggregate type named by the subject, e.g. `Role` for `keyring.role.7`.
    pub fn aggregate_type(&self) -> String {
        self.subject
            .split('.')
            .nth(1)
            .map(|s| {
                let mut chars = s.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Aggregate ID named by the subject.
    pub fn aggregate_id(&self) -> Option<String> {
        self.subject.split('.').nth(2).map(String::from)
    }

    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let time_ms: i64 = row.get("time");
        let time = DateTime::from_timestamp_millis(time_ms)
            .ok_or_else(|| PlatformError::internal(format!("Invalid event time {}", time_ms)))?;
        let data: String = row.get("data");

        Ok(Self {
            id: row.get("id"),
            event_type: row.get("event_type"),
            spec_version: row.get("spec_version"),
            source: row.get("source"),
            subject: row.get("subject"),
            message_group: row.get("message_group"),
            execution_id: row.get("execution_id"),
            correlation_id: row.get("correlation_id"),
            causation_id: row.get("causation_id"),
            principal_id: row.get("principal_id"),
            data: serde_json::from_str(&data)?,
            time,
        })
    }
}
