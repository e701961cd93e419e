//! Shared Infrastructure
//!
//! Error types, database setup and injected configuration access.

pub mod error;
pub mod database;
pub mod config_provider;

pub use error::{PlatformError, Result};
pub use config_provider::{ConfigProvider, ROLE_MUST_CONTAIN_PERMISSION};
