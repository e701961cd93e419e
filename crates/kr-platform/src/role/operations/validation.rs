//! Shared input checks for role create and update.

use std::collections::HashSet;

use tracing::warn;

use crate::shared::{ConfigProvider, ROLE_MUST_CONTAIN_PERMISSION};
use crate::usecase::UseCaseError;
use crate::details;

/// Role input after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRoleInput {
    /// Trimmed, non-empty
    pub name: String,
    /// Deduplicated, first occurrence wins
    pub permissions: Vec<String>,
}

pub fn validate_role_input(
    name: &str,
    permissions: &[String],
    config: &dyn ConfigProvider,
) -> Result<ValidRoleInput, UseCaseError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UseCaseError::validation(
            "ROLE_NAME_REQUIRED",
            "Role name is required",
        ));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(permissions.len());
    let unique: Vec<String> = permissions
        .iter()
        .filter(|permission| seen.insert(permission.as_str()))
        .cloned()
        .collect();

    if unique.is_empty() && config.get_bool(ROLE_MUST_CONTAIN_PERMISSION) {
        warn!(role = name, "Rejected role without permissions");
        return Err(UseCaseError::validation_with_details(
            "ROLE_NEEDS_PERMISSION",
            "role needs a permission",
            details! { "role" => name },
        ));
    }

    Ok(ValidRoleInput {
        name: name.to_string(),
        permissions: unique,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flag(bool);

    impl ConfigProvider for Flag {
        fn get_bool(&self, key: &str) -> bool {
            key == ROLE_MUST_CONTAIN_PERMISSION && self.0
        }
    }

    fn perms(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = validate_role_input("   ", &perms(&["a"]), &Flag(false)).unwrap_err();
        assert_eq!(err.code(), "ROLE_NAME_REQUIRED");
    }

    #[test]
    fn test_policy_requires_permission() {
        let err = validate_role_input("Editor", &[], &Flag(true)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.code(), "ROLE_NEEDS_PERMISSION");
        assert_eq!(err.message(), "role needs a permission");
    }

    #[test]
    fn test_empty_allowed_when_flag_off() {
        let input = validate_role_input("Editor", &[], &Flag(false)).unwrap();
        assert!(input.permissions.is_empty());
    }

    #[test]
    fn test_trims_and_dedupes() {
        let input = validate_role_input(" Editor ", &perms(&["b", "a", "b"]), &Flag(true)).unwrap();
        assert_eq!(input.name, "Editor");
        assert_eq!(input.permissions, perms(&["b", "a"]));
    }

    #[test]
    fn test_dedupes_large_list_in_order() {
        let names: Vec<String> = (0..5_000).map(|i| format!("perm-{}", i % 1_000)).collect();
        let input = validate_role_input("Editor", &names, &Flag(true)).unwrap();
        assert_eq!(input.permissions.len(), 1_000);
        assert_eq!(input.permissions[0], "perm-0");
        assert_eq!(input.permissions[999], "perm-999");
    }
}
