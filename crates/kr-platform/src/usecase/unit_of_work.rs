//! Unit of Work
//!
//! Atomic commit of aggregate changes, the domain event and the audit log
//! within a single SQLite transaction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, error, warn};

use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::event_publisher::EventPublisher;
use super::result::UseCaseResult;
use crate::audit::{AuditLog, AuditLogRepository};
use crate::event::{Event, EventRepository};
use crate::shared::error::{PlatformError, Result};

/// Unit of Work for atomic role operations.
///
/// **This is the ONLY way to create a successful `UseCaseResult`.**
/// `UseCaseResult::success()` is crate-private, so a use case that reports
/// success has necessarily stored its event and audit entry together with
/// its changes.
///
/// # Usage in a use case:
///
/// ```ignore
/// let mut tx = match self.unit_of_work.begin().await { ... };
///
/// // Aggregate writes go through the open transaction
/// let role = tx.insert_role(&name).await?;
///
/// let event = RoleCreated::new(&ctx, &role);
///
/// // Atomic commit - only way to return success
/// self.unit_of_work.commit(tx, event, &command).await
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Open transaction handed to the use case for its aggregate writes.
    type Transaction: Send;

    /// Open a new transaction.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Finish the transaction opened by [`begin`](Self::begin).
    ///
    /// Within the transaction:
    /// 1. Stores the domain event in `domain_events`
    /// 2. Creates the audit log entry for `command`
    /// 3. Commits everything written through `tx`
    ///
    /// After a successful commit the stored event is published. If any step
    /// fails the entire transaction is rolled back and nothing is published.
    async fn commit<E, C>(
        &self,
        tx: Self::Transaction,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + Sync + 'static,
        C: Serialize + Send + Sync;

    /// Discard every write made through `tx`.
    async fn rollback(&self, tx: Self::Transaction);
}

/// Open SQLite transaction.
///
/// Dropping it without committing rolls back, so an early return can never
/// leak partial writes.
pub struct SqliteTransaction {
    pub(crate) inner: sqlx::Transaction<'static, Sqlite>,
}

impl SqliteTransaction {
    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}

/// SQLite implementation of [`UnitOfWork`].
#[derive(Clone)]
pub struct SqliteUnitOfWork {
    pool: SqlitePool,
    publisher: Arc<dyn EventPublisher>,
}

impl SqliteUnitOfWork {
    pub fn new(pool: SqlitePool, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { pool, publisher }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Audit entry naming the command type and the principal behind it.
    fn create_audit_log<C: Serialize>(event: &Event, command: &C) -> AuditLog {
        let command_name = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        let operation_json = serde_json::to_string(command).ok();

        AuditLog::new(
            event.aggregate_type(),
            event.aggregate_id(),
            command_name,
            operation_json,
            Some(event.principal_id.clone()),
        )
        .with_performed_at(event.time)
    }

    async fn write_and_commit<C: Serialize + Sync>(
        mut tx: SqliteTransaction,
        stored: &Event,
        command: &C,
    ) -> Result<()> {
        EventRepository::insert(&mut *tx.inner, stored).await?;

        let audit_log = Self::create_audit_log(stored, command);
        AuditLogRepository::insert(&mut *tx.inner, &audit_log).await?;

        tx.inner.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    type Transaction = SqliteTransaction;

    async fn begin(&self) -> Result<SqliteTransaction> {
        let inner = self.pool.begin().await?;
        Ok(SqliteTransaction { inner })
    }

    async fn commit<E, C>(
        &self,
        tx: SqliteTransaction,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + Sync + 'static,
        C: Serialize + Send + Sync,
    {
        let stored = match Event::from_domain_event(&event) {
            Ok(stored) => stored,
            Err(e) => {
                self.rollback(tx).await;
                error!("Failed to serialize event: {}", e);
                return UseCaseResult::failure(commit_failed(e));
            }
        };

        // A failed write drops `tx`, which rolls it back
        if let Err(e) = Self::write_and_commit(tx, &stored, command).await {
            error!(event_type = %stored.event_type, "Failed to commit transaction: {}", e);
            return UseCaseResult::failure(commit_failed(e));
        }

        debug!(
            event_id = %stored.id,
            event_type = %stored.event_type,
            "Successfully committed transaction"
        );

        self.publisher.publish(&stored);

        UseCaseResult::success(event)
    }

    async fn rollback(&self, tx: SqliteTransaction) {
        if let Err(e) = tx.rollback().await {
            warn!("Failed to roll back transaction: {}", e);
        }
    }
}

fn commit_failed(err: PlatformError) -> UseCaseError {
    UseCaseError::persistence("COMMIT_FAILED", format!("Failed to commit changes: {}", err))
}
