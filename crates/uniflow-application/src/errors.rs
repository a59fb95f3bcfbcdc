//! Application layer error types
//!
//! These errors represent application-level failures that are suitable
//! for API consumption. They wrap domain errors with additional context.

use thiserror::Error;
use uniflow_domain::errors::DomainError;

/// Application layer result type
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Application layer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplicationError {
    // === Validation Errors ===
    /// Input validation failed; never retried
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // === Not Found Errors ===
    /// Task missing, or owned by someone else
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // === Conflict Errors ===
    /// Task state forbids the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    // === Configuration Errors ===
    /// Unknown timezone or unusable setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === Infrastructure Errors ===
    /// Storage call failed
    #[error("Repository error during {operation}: {reason}")]
    Repository {
        operation: &'static str,
        reason: String,
    },

    /// Caller cancelled the request
    #[error("Operation cancelled")]
    Cancelled,

    /// Deadline elapsed before the operation finished
    #[error("Operation timed out: {operation}")]
    Timeout { operation: &'static str },
}

impl ApplicationError {
    /// Map a domain error raised by a repository call, keeping the operation name
    pub fn from_repository(operation: &'static str, err: DomainError) -> Self {
        match err {
            DomainError::ExternalServiceError { reason, .. } => {
                ApplicationError::Repository { operation, reason }
            }
            other => other.into(),
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError { field, reason } => {
                ApplicationError::ValidationFailed(format!("{}: {}", field, reason))
            }
            DomainError::BusinessRuleViolation { rule } => ApplicationError::Conflict(rule),
            DomainError::EntityNotFound { id, .. } => ApplicationError::TaskNotFound(id),
            DomainError::InvalidTimezone { name } => {
                ApplicationError::Configuration(format!("invalid timezone: {}", name))
            }
            DomainError::InvalidConfiguration { reason } => ApplicationError::Configuration(reason),
            DomainError::ExternalServiceError { service, reason } => ApplicationError::Repository {
                operation: "storage",
                reason: format!("{}: {}", service, reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ApplicationError::ValidationFailed("title is required".into());
        assert_eq!(err.to_string(), "Validation failed: title is required");
    }

    #[test]
    fn test_domain_error_mapping() {
        let not_found: ApplicationError = DomainError::task_not_found("t-1").into();
        assert_eq!(not_found, ApplicationError::TaskNotFound("t-1".into()));

        let conflict: ApplicationError = DomainError::rule("completed tasks cannot be deleted").into();
        assert!(matches!(conflict, ApplicationError::Conflict(_)));

        let tz: ApplicationError = DomainError::InvalidTimezone { name: "Mars/Base".into() }.into();
        assert!(matches!(tz, ApplicationError::Configuration(_)));
    }

    #[test]
    fn test_repository_errors_keep_operation() {
        let err = ApplicationError::from_repository(
            "update",
            DomainError::ExternalServiceError {
                service: "task-store".into(),
                reason: "connection reset".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Repository error during update: connection reset"
        );
    }
}
