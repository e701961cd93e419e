//! Update Role Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::abort;
use super::events::RoleUpdated;
use super::validation::validate_role_input;
use crate::cache::{PermissionCache, PERMISSION_CACHE_KEY};
use crate::details;
use crate::role::repository::{RoleRepository, RoleTransaction};
use crate::shared::{ConfigProvider, PlatformError};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

/// Command for updating a role.
///
/// An empty permission list leaves the current permissions in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleCommand {
    pub name: String,

    /// Full replacement permission set
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl UpdateRoleCommand {
    pub fn new(name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }
}

/// Use case for updating an existing role.
pub struct UpdateRoleUseCase<U: UnitOfWork> {
    role_repo: Arc<RoleRepository>,
    unit_of_work: Arc<U>,
    config: Arc<dyn ConfigProvider>,
    cache: Arc<dyn PermissionCache>,
    cache_key: String,
}

impl<U> UpdateRoleUseCase<U>
where
    U: UnitOfWork,
    U::Transaction: RoleTransaction,
{
    pub fn new(
        role_repo: Arc<RoleRepository>,
        unit_of_work: Arc<U>,
        config: Arc<dyn ConfigProvider>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            role_repo,
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
        role_id: i64,
        command: UpdateRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleUpdated> {
        // Fetch existing role before opening a transaction
        if let Err(e) = self.role_repo.find_by_id_or_fail(role_id).await {
            return UseCaseResult::failure(e.into());
        }

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

        // The event diff is taken against the state this transaction sees
        let before = match tx.load_role(role_id).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                let failure = PlatformError::not_found("Role", role_id).into();
                return abort(self.unit_of_work.as_ref(), tx, failure).await;
            }
            Err(e) => return abort(self.unit_of_work.as_ref(), tx, e.into()).await,
        };

        let mut role = before.clone();
        match tx.update_role_name(&mut role, &input.name).await {
            Ok(true) => {}
            Ok(false) => {
                let failure = UseCaseError::persistence_with_details(
                    "ROLE_UPDATE_FAILED",
                    format!("Role '{}' could not be updated", before.name),
                    details! { "id" => role_id },
                );
                return abort(self.unit_of_work.as_ref(), tx, failure).await;
            }
            Err(e) => return abort(self.unit_of_work.as_ref(), tx, e.into()).await,
        }

        if !input.permissions.is_empty() {
            if let Err(e) = tx.sync_permissions(&mut role, &input.permissions).await {
                return abort(self.unit_of_work.as_ref(), tx, e.into()).await;
            }
        }

        let event = RoleUpdated::new(&ctx, &before, &role);
        let added = event.permissions_added.len();
        let removed = event.permissions_removed.len();

        // Atomic commit
        let result = self.unit_of_work.commit(tx, event, &command).await;

        if result.is_success() {
            self.cache.invalidate(&self.cache_key);
            info!(
                role_id,
                role = %role.name,
                added,
                removed,
                principal = %ctx.principal_id,
                "Role updated"
            );
        }

        result
    }
}
