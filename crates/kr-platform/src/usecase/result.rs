//! Use Case Result Type
//!
//! Success can only be created by a [`UnitOfWork`](super::UnitOfWork) commit,
//! so a successful outcome always means the changes, the stored event and the
//! audit entry were committed together.

use super::error::UseCaseError;

/// Result of a use case execution.
///
/// ```ignore
/// if name.is_empty() {
///     return UseCaseResult::failure(UseCaseError::validation("ROLE_NAME_REQUIRED", "..."));
/// }
///
/// unit_of_work.commit(tx, event, &command).await
/// ```
pub enum UseCaseResult<T> {
    Success(T),
    Failure(UseCaseError),
}

impl<T> UseCaseResult<T> {
    /// Any code may report a failure.
    pub fn failure(error: UseCaseError) -> Self {
        UseCaseResult::Failure(error)
    }

    /// Only the unit of work reports success.
    pub(crate) fn success(value: T) -> Self {
        UseCaseResult::Success(value)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UseCaseResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UseCaseResult::Failure(_))
    }

    /// Borrow the error, if any.
    pub fn error(&self) -> Option<&UseCaseError> {
        match self {
            UseCaseResult::Success(_) => None,
            UseCaseResult::Failure(e) => Some(e),
        }
    }

    /// Get the success value, panicking on failure. Intended for tests.
    pub fn unwrap(self) -> T {
        match self {
            UseCaseResult::Success(v) => v,
            UseCaseResult::Failure(e) => panic!("Called unwrap on a Failure: {}", e),
        }
    }

    /// Get the error, panicking on success. Intended for tests.
    pub fn unwrap_err(self) -> UseCaseError {
        match self {
            UseCaseResult::Success(_) => panic!("Called unwrap_err on a Success"),
            UseCaseResult::Failure(e) => e,
        }
    }

    pub fn map<U, F>(self, f: F) -> UseCaseResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            UseCaseResult::Success(v) => UseCaseResult::Success(f(v)),
            UseCaseResult::Failure(e) => UseCaseResult::Failure(e),
        }
    }

    pub fn into_result(self) -> Result<T, UseCaseError> {
        match self {
            UseCaseResult::Success(v) => Ok(v),
            UseCaseResult::Failure(e) => Err(e),
        }
    }
}

impl<T> From<UseCaseResult<T>> for Result<T, UseCaseError> {
    fn from(result: UseCaseResult<T>) -> Self {
        result.into_result()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for UseCaseResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UseCaseResult::Success(v) => f.debug_tuple("Success").field(v).finish(),
            UseCaseResult::Failure(e) => f.debug_tuple("Failure").field(e).finish(),
        }
    }
}
