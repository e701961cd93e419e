//! Use Case Errors
//!
//! Errors are categorized so callers can translate them into a
//! protocol-appropriate response without inspecting messages.
//!
//! ```ignore
//! use kr_platform::usecase::UseCaseError;
//! use kr_platform::details;
//!
//! UseCaseError::validation("ROLE_NAME_REQUIRED", "Role name is required");
//!
//! UseCaseError::persistence_with_details(
//!     "PERMISSION_NOT_FOUND",
//!     "There is no permission named 'edit-post'",
//!     details! { "permission" => "edit-post" },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::PlatformError;

/// Macro for creating error detail maps.
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// - `ValidationError` -> 400, user-correctable, nothing was written
/// - `NotFoundError` -> 404, the referenced entity does not exist
/// - `PersistenceError` -> 500, a write failed and the transaction was rolled back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    PersistenceError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn persistence(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn persistence_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::PersistenceError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. }
            | Self::NotFoundError { code, .. }
            | Self::PersistenceError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. }
            | Self::NotFoundError { message, .. }
            | Self::PersistenceError { message, .. } => message,
        }
    }

    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::ValidationError { details, .. }
            | Self::NotFoundError { details, .. }
            | Self::PersistenceError { details, .. } => details,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundError { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::PersistenceError { .. })
    }

    /// Suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::NotFoundError { .. } => 404,
            Self::PersistenceError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

impl From<PlatformError> for UseCaseError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound { entity_type, id } => UseCaseError::NotFoundError {
                code: format!("{}_NOT_FOUND", entity_type.to_uppercase()),
                message: format!("{} with ID '{}' not found", entity_type, id),
                details: details! { "id" => id },
            },
            PlatformError::Duplicate { entity_type, field, value } => {
                UseCaseError::persistence_with_details(
                    format!("{}_{}_TAKEN", entity_type.to_uppercase(), field.to_uppercase()),
                    format!("A {} with {} '{}' already exists", entity_type.to_lowercase(), field, value),
                    details! { field.as_str() => value },
                )
            }
            PlatformError::PermissionNotFound { name } => UseCaseError::persistence_with_details(
                "PERMISSION_NOT_FOUND",
                format!("There is no permission named '{}'", name),
                details! { "permission" => name },
            ),
            other => UseCaseError::persistence("PERSISTENCE_FAILED", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = UseCaseError::validation("ROLE_NAME_REQUIRED", "Role name is required");
        assert_eq!(err.code(), "ROLE_NAME_REQUIRED");
        assert_eq!(err.message(), "Role name is required");
        assert_eq!(err.http_status_code(), 400);
        assert!(err.is_validation());
    }

    #[test]
    fn test_display() {
        let err = UseCaseError::persistence("PERSISTENCE_FAILED", "disk full");
        assert_eq!(err.to_string(), "[PERSISTENCE_FAILED] disk full");
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_from_not_found() {
        let err: UseCaseError = PlatformError::not_found("Role", 9).into();
        assert!(err.is_not_found());
        assert_eq!(err.code(), "ROLE_NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.details().get("id"), Some(&serde_json::json!("9")));
    }

    #[test]
    fn test_from_duplicate() {
        let err: UseCaseError = PlatformError::duplicate("Role", "name", "Editor").into();
        assert!(err.is_persistence());
        assert_eq!(err.code(), "ROLE_NAME_TAKEN");
        assert_eq!(err.details().get("name"), Some(&serde_json::json!("Editor")));
    }

    #[test]
    fn test_from_missing_permission() {
        let err: UseCaseError = PlatformError::PermissionNotFound { name: "fly".to_string() }.into();
        assert_eq!(err.code(), "PERMISSION_NOT_FOUND");
        assert!(err.message().contains("fly"));
    }

    #[test]
    fn test_serialized_with_type_tag() {
        let err = UseCaseError::not_found("ROLE_NOT_FOUND", "missing");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "NotFoundError");
        assert_eq!(json["code"], "ROLE_NOT_FOUND");
    }

    #[test]
    fn test_details_macro() {
        let empty: HashMap<String, serde_json::Value> = details!();
        assert!(empty.is_empty());

        let details = details! { "role" => "Editor", "count" => 2 };
        assert_eq!(details.get("role"), Some(&serde_json::json!("Editor")));
        assert_eq!(details.get("count"), Some(&serde_json::json!(2)));
    }
}
