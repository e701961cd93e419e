//! Role Aggregate
//!
//! Roles, their permission links and the service that creates and updates
//! them.

pub mod entity;
pub mod repository;
pub mod permission_repository;
pub mod operations;
pub mod service;

// Re-export main types
pub use entity::{Permission, Role};
pub use repository::{RoleRepository, RoleTransaction};
pub use permission_repository::PermissionRepository;
pub use service::RoleService;
