//! Persistence Layer Error Types
//!
//! Error mapping to domain types

use thiserror::Error;
use uniflow_domain::errors::DomainError;

/// Service name reported in domain errors raised by storage
pub const STORE_SERVICE: &str = "task-store";

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Entity not found, or owned by another user
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Entity already exists
    #[error("Entity already exists: {entity_type} with id {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Backend cannot be built from the given configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PersistenceError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an already-exists error
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }
}

/// Convert persistence errors to domain errors
impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity_type, id } => DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            },
            PersistenceError::AlreadyExists { entity_type, id } => DomainError::BusinessRuleViolation {
                rule: format!("{} {} already exists", entity_type, id),
            },
            PersistenceError::Configuration(reason) => DomainError::InvalidConfiguration { reason },
            other => DomainError::ExternalServiceError {
                service: STORE_SERVICE.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = PersistenceError::not_found("Task", "task-123");
        assert!(err.to_string().contains("Task"));
        assert!(err.to_string().contains("task-123"));
    }

    #[test]
    fn test_error_conversion() {
        let domain_err: DomainError = PersistenceError::not_found("Task", "123").into();
        assert!(matches!(domain_err, DomainError::EntityNotFound { .. }));

        let domain_err: DomainError = PersistenceError::Database("boom".into()).into();
        assert!(matches!(
            domain_err,
            DomainError::ExternalServiceError { ref service, .. } if service == STORE_SERVICE
        ));
    }
}
