//! Event Repository

use sqlx::{SqliteConnection, SqlitePool};

use crate::event::Event;
use crate::shared::error::Result;

const SELECT_COLUMNS: &str = "SELECT id, event_type, spec_version, source, subject, message_group, \
     execution_id, correlation_id, causation_id, principal_id, data, time FROM domain_events";

pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Event::from_row).transpose()
    }

    /// Events for one aggregate, oldest first.
    pub async fn find_by_subject(&self, subject: &str) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!("{} WHERE subject = ? ORDER BY time ASC, rowid ASC", SELECT_COLUMNS))
            .bind(subject)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Event::from_row).collect()
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domain_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Write an event on an open connection, normally inside a transaction.
    pub(crate) async fn insert(conn: &mut SqliteConnection, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO domain_events (id, event_type, spec_version, source, subject, message_group, \
             execution_id, correlation_id, causation_id, principal_id, data, time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.event_type)
        .bind(&event.spec_version)
        .bind(&event.source)
        .bind(&event.subject)
        .bind(&event.message_group)
        .bind(&event.execution_id)
        .bind(&event.correlation_id)
        .bind(&event.causation_id)
        .bind(&event.principal_id)
        .bind(serde_json::to_string(&event.data)?)
        .bind(event.time.timestamp_millis())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
