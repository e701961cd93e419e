//! Keyring Common
//!
//! Utilities shared by every Keyring crate and binary.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingOptions};
