//! Error types for todo operations.

use thiserror::Error;

/// Result type alias for todo operations.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Failure taxonomy for the data-access layer.
///
/// A missing record and a record owned by someone else are reported with the
/// same variant so callers cannot discover the existence of other users'
/// todos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// No caller identity could be resolved.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The record does not exist or is not owned by the caller.
    #[error("Todo not found or unauthorized")]
    NotFoundOrForbidden,

    /// Input rejected at the boundary (unknown priority, empty edited text, ...).
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl TodoError {
    /// Creates a `Validation` error for `field`.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_field() {
        let err = TodoError::validation("priority", "expected one of low, medium, high");
        assert_eq!(
            err.to_string(),
            "Invalid priority: expected one of low, medium, high"
        );
    }

    #[test]
    fn not_found_message_does_not_leak_ownership() {
        assert_eq!(
            TodoError::NotFoundOrForbidden.to_string(),
            "Todo not found or unauthorized"
        );
    }
}
