//! Role Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::role::entity::Role;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "keyring:iam";

fn metadata(ctx: &ExecutionContext, event_type: &str, role_id: i64) -> EventMetadata {
    EventMetadata::for_context(
        ctx,
        event_type,
        SPEC_VERSION,
        SOURCE,
        format!("keyring.role.{}", role_id),
        format!("keyring:role:{}", role_id),
    )
}

/// Event emitted when a new role is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role: Role,
}

impl_domain_event!(RoleCreated);

impl RoleCreated {
    pub const EVENT_TYPE: &'static str = "keyring:iam:role:created";

    pub fn new(ctx: &ExecutionContext, role: &Role) -> Self {
        Self {
            metadata: metadata(ctx, Self::EVENT_TYPE, role.id),
            role: role.clone(),
        }
    }
}

/// Event emitted when a role is updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    /// Role state after the update
    pub role: Role,
    pub previous_name: String,
    pub permissions_added: Vec<String>,
    pub permissions_removed: Vec<String>,
}

impl_domain_event!(RoleUpdated);

impl RoleUpdated {
    pub const EVENT_TYPE: &'static str = "keyring:iam:role:updated";

    pub fn new(ctx: &ExecutionContext, before: &Role, after: &Role) -> Self {
        let (permissions_added, permissions_removed) = after.permission_diff(before);
        Self {
            metadata: metadata(ctx, Self::EVENT_TYPE, after.id),
            role: after.clone(),
            previous_name: before.name.clone(),
            permissions_added,
            permissions_removed,
        }
    }

    pub fn renamed(&self) -> bool {
        self.previous_name != self.role.name
    }
}
