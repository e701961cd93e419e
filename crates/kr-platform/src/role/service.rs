//! Role Service
//!
//! Entry point for callers: creates and updates roles through the use cases
//! and returns the resulting [`Role`].

use std::sync::Arc;

use crate::cache::PermissionCache;
use crate::role::entity::Role;
use crate::role::operations::{
    CreateRoleCommand, CreateRoleUseCase, UpdateRoleCommand, UpdateRoleUseCase,
};
use crate::role::repository::{RoleRepository, RoleTransaction};
use crate::shared::ConfigProvider;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError};

pub struct RoleService<U: UnitOfWork> {
    roles: Arc<RoleRepository>,
    create: CreateRoleUseCase<U>,
    update: UpdateRoleUseCase<U>,
}

impl<U> RoleService<U>
where
    U: UnitOfWork,
    U::Transaction: RoleTransaction,
{
    pub fn new(
        roles: Arc<RoleRepository>,
        unit_of_work: Arc<U>,
        config: Arc<dyn ConfigProvider>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            create: CreateRoleUseCase::new(
                Arc::clone(&unit_of_work),
                Arc::clone(&config),
                Arc::clone(&cache),
            ),
            update: UpdateRoleUseCase::new(Arc::clone(&roles), unit_of_work, config, cache),
            roles,
        }
    }

    /// Invalidate `cache_key` instead of the default permission cache key.
    pub fn with_cache_key(self, cache_key: impl Into<String>) -> Self {
        let cache_key = cache_key.into();
        Self {
            roles: self.roles,
            create: self.create.with_cache_key(cache_key.clone()),
            update: self.update.with_cache_key(cache_key),
        }
    }

    /// Create a role, granting the listed permissions.
    pub async fn create(
        &self,
        command: CreateRoleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Role, UseCaseError> {
        self.create
            .execute(command, ctx.clone())
            .await
            .map(|event| event.role)
            .into_result()
    }

    /// Rename a role and, for a non-empty list, replace its permissions.
    pub async fn update(
        &self,
        id: i64,
        command: UpdateRoleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Role, UseCaseError> {
        self.update
            .execute(id, command, ctx.clone())
            .await
            .map(|event| event.role)
            .into_result()
    }

    pub async fn find(&self, id: i64) -> Result<Role, UseCaseError> {
        Ok(self.roles.find_by_id_or_fail(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Role>, UseCaseError> {
        Ok(self.roles.find_all().await?)
    }
}
