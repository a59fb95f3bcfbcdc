//! Domain errors for UniFlow tasks

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Business rule violation: {rule}")]
    BusinessRuleViolation { rule: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    EntityNotFound { entity_type: String, id: String },

    #[error("Invalid timezone: {name}")]
    InvalidTimezone { name: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("External service error: {service} - {reason}")]
    ExternalServiceError { service: String, reason: String },
}

impl DomainError {
    /// Create a validation error for a field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a business rule violation
    pub fn rule(rule: impl Into<String>) -> Self {
        Self::BusinessRuleViolation { rule: rule.into() }
    }

    /// Create a task not-found error
    ///
    /// Used both for missing ids and for ids owned by another user.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity_type: "Task".to_string(),
            id: id.into(),
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
