//! SQLite Database Setup
//!
//! Pool construction and schema initialization for the role store.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use kr_config::DatabaseConfig;
use crate::shared::error::{PlatformError, Result};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_permissions (
        role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        permission_id INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
        PRIMARY KEY (role_id, permission_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_users (
        role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL,
        PRIMARY KEY (role_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS domain_events (
        id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        spec_version TEXT NOT NULL,
        source TEXT NOT NULL,
        subject TEXT NOT NULL,
        message_group TEXT NOT NULL,
        execution_id TEXT NOT NULL,
        correlation_id TEXT NOT NULL,
        causation_id TEXT,
        principal_id TEXT NOT NULL,
        data TEXT NOT NULL,
        time INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_domain_events_subject ON domain_events(subject)",
    r#"
    CREATE TABLE IF NOT EXISTS audit_logs (
        id TEXT PRIMARY KEY,
        entity_type TEXT NOT NULL,
        entity_id TEXT,
        operation TEXT NOT NULL,
        operation_json TEXT,
        principal_id TEXT,
        performed_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_entity ON audit_logs(entity_type, entity_id)",
];

/// Open a connection pool for the configured database.
///
/// In-memory databases live and die with their connection, so they are
/// pinned to a single connection that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    if config.url.trim().is_empty() {
        return Err(PlatformError::configuration("database url is empty"));
    }

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(&config.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    info!(url = %config.url, "Connected to role database");
    Ok(pool)
}

/// Create all tables and indexes. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = SCHEMA.len(), "Schema initialized");
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
