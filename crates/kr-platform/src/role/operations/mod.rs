//! Role Operations
//!
//! Use cases for role management.

pub mod events;
pub mod validation;
pub mod create;
pub mod update;

pub use events::*;
pub use create::{CreateRoleCommand, CreateRoleUseCase};
pub use update::{UpdateRoleCommand, UpdateRoleUseCase};

use tracing::error;

use crate::usecase::{UnitOfWork, UseCaseError, UseCaseResult};

/// Roll back `tx` and report `error` as the outcome.
pub(crate) async fn abort<U, T>(
    unit_of_work: &U,
    tx: U::Transaction,
    error: UseCaseError,
) -> UseCaseResult<T>
where
    U: UnitOfWork,
{
    error!(code = error.code(), "Role operation failed, rolling back: {}", error.message());
    unit_of_work.rollback(tx).await;
    UseCaseResult::failure(error)
}
