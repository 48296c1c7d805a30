//! # Error Types
//!
//! Validation errors for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//!   stockroom-core  ValidationError   input fails a declared rule
//!   stockroom-db    DbError           storage and constraint failures
//!   apps/server     ApiError          what the web client sees
//!
//!   Flow: ValidationError / DbError → ApiError → HTTP status + envelope
//! ```
//!
//! Validation runs entirely at the API boundary; a request that fails a
//! rule here never reaches a repository.

use thiserror::Error;

/// Input validation errors.
///
/// These occur when a request payload does not meet the declared rules
/// (required fields, length caps, numeric ranges).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value exceeds its length cap.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be at least one.
    #[error("{field} must be a positive integer")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a malformed id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = ValidationError::TooLong {
            field: "item_description".to_string(),
            max: 500,
        };
        assert_eq!(
            err.to_string(),
            "item_description must be at most 500 characters"
        );

        let err = ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: 365,
        };
        assert_eq!(err.to_string(), "days must be between 1 and 365");
    }
}
