//! Stored Domain Events
//!
//! Every committed role change leaves one row in `domain_events`, written in
//! the same transaction as the change itself.

pub mod entity;
pub mod repository;

pub use entity::Event;
pub use repository::EventRepository;
