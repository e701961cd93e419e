//! Create Role Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::abort;
use super::events::RoleCreated;
use super::validation::validate_role_input;
use crate::cache::{PermissionCache, PERMISSION_CACHE_KEY};
use crate::role::repository::RoleTransaction;
use crate::shared::ConfigProvider;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};

/// Command for creating a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleCommand {
    pub name: String,

    /// Names of the permissions to grant
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateRoleCommand {
    pub fn new(name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }
}

/// Use case for creating a new role.
pub struct CreateRoleUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
    config: Arc<dyn ConfigProvider>,
    cache: Arc<dyn PermissionCache>,
    cache_key: String,
}

impl<U> CreateRoleUseCase<U>
where
    U: UnitOfWork,
    U::Transaction: RoleTransaction,
{
    pub fn new(
        unit_of_work: Arc<U>,
        config: Arc<dyn ConfigProvider>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            unit_of_work,
            config,
            cache,
            cache_key: PERMISSION_CACHE_KEY.to_string(),
        }
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    pub async fn execute(
        &self,
        command: CreateRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleCreated> {
        // Validation: nothing is written when it fails
        let input = match validate_role_input(&command.name, &command.permissions, self.config.as_ref()) {
            Ok(input) => input,
            Err(e) => return UseCaseResult::failure(e),
        };

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!("Failed to begin transaction: {}", e);
                return UseCaseResult::failure(e.into());
            }
        };

        let mut role = match tx.insert_role(&input.name).await {
            Ok(role) => role,
            Err(e) => return abort(self.unit_of_work.as_ref(), tx, e.into()).await,
        };

        if !input.permissions.is_empty() {
            if let Err(e) = tx.attach_permissions(&mut role, &input.permissions).await {
                return abort(self.unit_of_work.as_ref(), tx, e.into()).await;
            }
        }

        let event = RoleCreated::new(&ctx, &role);

        // Atomic commit
        let result = self.unit_of_work.commit(tx, event, &command).await;

        if result.is_success() {
            self.cache.invalidate(&self.cache_key);
            info!(
                role_id = role.id,
                role = %role.name,
                permissions = role.permissions.len(),
                principal = %ctx.principal_id,
                "Role created"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_defaults_permissions() {
        let cmd: CreateRoleCommand = serde_json::from_str(r#"{"name":"Editor"}"#).unwrap();
        assert_eq!(cmd.name, "Editor");
        assert!(cmd.permissions.is_empty());
    }

    #[test]
    fn test_command_serialization() {
        let cmd = CreateRoleCommand::new("Editor", vec!["edit-post".to_string()]);
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("Editor"));
        assert!(json.contains("edit-post"));
    }
}
