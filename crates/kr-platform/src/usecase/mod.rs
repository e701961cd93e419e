//! Use Case Infrastructure
//!
//! Building blocks shared by every operation:
//! - `UseCaseResult<T>` - sealed result type for use case outcomes
//! - `UseCaseError` - categorized error types for consistent handling
//! - `DomainEvent` - trait for domain events with CloudEvents structure
//! - `ExecutionContext` - principal and correlation context for one execution
//! - `UnitOfWork` - atomic commit of entity changes + event + audit log
//! - `EventPublisher` - post-commit fan-out of stored events

pub mod result;
pub mod error;
pub mod domain_event;
pub mod execution_context;
pub mod event_publisher;
pub mod unit_of_work;

pub use result::UseCaseResult;
pub use error::UseCaseError;
pub use domain_event::{DomainEvent, EventMetadata};
pub use execution_context::ExecutionContext;
pub use event_publisher::{EventPublisher, BroadcastEventPublisher};
pub use unit_of_work::{UnitOfWork, SqliteUnitOfWork, SqliteTransaction};
