//! # Validation Module
//!
//! Input validation rules for the Stockroom API boundary.
//!
//! ## Validation Strategy
//! ```text
//!   Layer 1: serde deserialization    field types, enum domains
//!   Layer 2: THIS MODULE              length caps, ranges, required fields
//!   Layer 3: SQLite schema            NOT NULL, UNIQUE, CHECK constraints
//! ```
//!
//! Repositories assume their inputs already passed layers 1 and 2; the
//! schema is the last line of defense, not the first.

use crate::error::{ValidationError, ValidationResult};
use crate::{
    MAX_AUDIT_WINDOW_DAYS, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_NOTES_LEN, MAX_QUERY_LIMIT,
    MAX_SERIAL_LEN,
};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name-like field (make name, model name, item name).
///
/// ## Rules
/// - must not be blank after trimming
/// - at most `max` characters
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_name;
/// use stockroom_core::MAX_NAME_LEN;
///
/// assert!(validate_name("ThinkPad X1", "model", MAX_NAME_LEN).is_ok());
/// assert!(validate_name("   ", "model", MAX_NAME_LEN).is_err());
/// ```
pub fn validate_name(value: &str, field: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional free-text field against a length cap.
///
/// Blank values are allowed; they are treated as absent by the caller.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max: usize,
) -> ValidationResult<()> {
    if let Some(value) = value {
        if value.trim().len() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(())
}

/// Validates a restock request description.
pub fn validate_description(value: &str) -> ValidationResult<()> {
    validate_name(value, "item_description", MAX_DESCRIPTION_LEN)
}

/// Validates restock request notes.
pub fn validate_notes(value: Option<&str>) -> ValidationResult<()> {
    validate_optional_text(value, "notes", MAX_NOTES_LEN)
}

/// Validates a list of serial number values prior to registration.
///
/// Blank entries are legal (they are skipped at insert time); non-blank
/// entries must fit the length cap.
pub fn validate_serial_numbers(values: &[String]) -> ValidationResult<()> {
    for value in values {
        if value.trim().len() > MAX_SERIAL_LEN {
            return Err(ValidationError::TooLong {
                field: "serial_numbers".to_string(),
                max: MAX_SERIAL_LEN,
            });
        }
    }
    Ok(())
}

/// Validates a search term.
pub fn validate_search_term(value: &str) -> ValidationResult<()> {
    validate_name(value, "search", MAX_NAME_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity. Quantities start at one; zero-quantity rows
/// are expressed by deleting the row or retiring the item.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an audit-trail look-back window in days.
///
/// The window is later turned into a bound timestamp parameter, never
/// interpolated into query text, but a bounded range keeps the API sane.
pub fn validate_days(days: i64) -> ValidationResult<()> {
    if !(1..=MAX_AUDIT_WINDOW_DAYS).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: MAX_AUDIT_WINDOW_DAYS,
        });
    }
    Ok(())
}

/// Validates a list-query row limit.
pub fn validate_limit(limit: i64) -> ValidationResult<()> {
    if !(1..=MAX_QUERY_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_QUERY_LIMIT,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_name("Dell", "make", MAX_NAME_LEN).is_ok());
        assert!(validate_name("", "make", MAX_NAME_LEN).is_err());
        assert!(validate_name("  \t ", "make", MAX_NAME_LEN).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1), "make", MAX_NAME_LEN).is_err());
        // exactly at the cap is fine
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN), "make", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn optional_text_allows_absent_and_blank() {
        assert!(validate_optional_text(None, "notes", MAX_NOTES_LEN).is_ok());
        assert!(validate_optional_text(Some(""), "notes", MAX_NOTES_LEN).is_ok());
        assert!(
            validate_optional_text(Some(&"x".repeat(MAX_NOTES_LEN + 1)), "notes", MAX_NOTES_LEN)
                .is_err()
        );
    }

    #[test]
    fn serial_number_length_cap() {
        let ok = vec!["SN-001".to_string(), "  ".to_string()];
        assert!(validate_serial_numbers(&ok).is_ok());

        let too_long = vec!["s".repeat(MAX_SERIAL_LEN + 1)];
        assert!(validate_serial_numbers(&too_long).is_err());
    }

    #[test]
    fn quantity_must_be_at_least_one() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(500).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn days_window_is_bounded() {
        assert!(validate_days(1).is_ok());
        assert!(validate_days(365).is_ok());
        assert!(validate_days(0).is_err());
        assert!(validate_days(366).is_err());
    }

    #[test]
    fn limit_is_bounded() {
        assert!(validate_limit(100).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }
}
