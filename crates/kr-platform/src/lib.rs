//! Keyring Platform
//!
//! Role-based access control core:
//! - Role create/update with a configurable "needs a permission" policy
//! - Role and permission links written in one SQLite transaction
//! - Domain events stored with the change and published after commit
//! - Audit log entry for every committed command
//! - Permission cache invalidated after every successful write
//!
//! ## Module Organization
//!
//! - `role` - entities, repositories, operations and the `RoleService`
//! - `event` / `audit` - stored events and audit trail
//! - `cache` - permission cache
//! - `usecase` - result/error types, domain events, unit of work
//! - `shared` - platform errors, database setup, config access
//! - `seed` - development data

pub mod role;
pub mod event;
pub mod audit;
pub mod cache;
pub mod seed;
pub mod shared;
pub mod usecase;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::{ConfigProvider, ROLE_MUST_CONTAIN_PERMISSION};

// Re-export use case infrastructure
pub use usecase::{
    UseCaseResult, UseCaseError, DomainEvent, ExecutionContext,
    UnitOfWork, SqliteUnitOfWork, SqliteTransaction,
    EventPublisher, BroadcastEventPublisher,
};
// Note: impl_domain_event! and details! are exported at crate root via #[macro_export]

// Re-export main types
pub use role::entity::{Permission, Role};
pub use role::operations::{CreateRoleCommand, UpdateRoleCommand, RoleCreated, RoleUpdated};
pub use role::{RoleRepository, RoleTransaction, PermissionRepository, RoleService};
pub use event::{Event, EventRepository};
pub use audit::{AuditLog, AuditLogRepository};
pub use cache::{InMemoryPermissionCache, PermissionCache, RolePermissionMap, PERMISSION_CACHE_KEY};
pub use seed::DevDataSeeder;
