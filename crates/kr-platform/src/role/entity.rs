//! Role and Permission Entities
//!
//! Authorization model for role-based access control.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission definition, referenced from roles by its unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,

    /// Permission name (e.g., "edit-post")
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Role: a named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Assigned by the store on insert
    pub id: i64,

    /// Unique role name
    pub name: String,

    /// Names of the granted permissions
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// IDs of the users holding this role
    #[serde(default)]
    pub user_ids: BTreeSet<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Check if role grants a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_assigned(&self) -> bool {
        !self.user_ids.is_empty()
    }

    /// Permissions in `self` that `before` lacks, and those `before` had that
    /// `self` no longer grants.
    pub fn permission_diff(&self, before: &Role) -> (Vec<String>, Vec<String>) {
        let added = self.permissions.difference(&before.permissions).cloned().collect();
        let removed = before.permissions.difference(&self.permissions).cloned().collect();
        (added, removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: &[&str]) -> Role {
        let now = Utc::now();
        Role {
            id: 1,
            name: "Editor".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            user_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_permission() {
        let role = role(&["edit-post", "publish-post"]);
        assert!(role.has_permission("edit-post"));
        assert!(!role.has_permission("view backend"));
        assert_eq!(role.permission_count(), 2);
        assert!(!role.is_assigned());
    }

    #[test]
    fn test_permission_diff() {
        let before = role(&["a", "b"]);
        let after = role(&["b", "c"]);
        let (added, removed) = after.permission_diff(&before);
        assert_eq!(added, vec!["c".to_string()]);
        assert_eq!(removed, vec!["a".to_string()]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(role(&["a"])).unwrap();
        assert!(json.get("userIds").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["permissions"], serde_json::json!(["a"]));
    }
}
