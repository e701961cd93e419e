//! Audit Trail
//!
//! One audit row per committed command, naming the command and the principal
//! that issued it.

pub mod entity;
pub mod repository;

pub use entity::AuditLog;
pub use repository::AuditLogRepository;
