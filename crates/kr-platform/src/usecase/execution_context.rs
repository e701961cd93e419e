//! Execution Context
//!
//! Carries tracing IDs and the acting principal through one use case
//! execution. Domain event metadata is populated from it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain_event::DomainEvent;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique ID for this execution
    pub execution_id: String,
    /// ID for distributed tracing, usually from the original request
    pub correlation_id: String,
    /// ID of the event that caused this execution, if any
    pub causation_id: Option<String>,
    /// ID of the principal performing the action
    pub principal_id: String,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Context for a fresh request: correlation starts as the execution ID.
    pub fn create(principal_id: impl Into<String>) -> Self {
        let exec_id = new_execution_id();
        Self {
            execution_id: exec_id.clone(),
            correlation_id: exec_id,
            causation_id: None,
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    /// Context that continues an upstream correlation ID.
    pub fn with_correlation(
        principal_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: new_execution_id(),
            correlation_id: correlation_id.into(),
            causation_id: None,
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    /// Context for work triggered by `parent`.
    pub fn from_parent_event<E: DomainEvent>(parent: &E, principal_id: impl Into<String>) -> Self {
        Self {
            execution_id: new_execution_id(),
            correlation_id: parent.correlation_id().to_string(),
            causation_id: Some(parent.event_id().to_string()),
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    /// Same execution, acting on behalf of another principal.
    pub fn with_principal(&self, principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            ..self.clone()
        }
    }
}

fn new_execution_id() -> String {
    format!("exec-{}", Uuid::new_v4())
}
