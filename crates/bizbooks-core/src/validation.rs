//! # Validation Module
//!
//! Field validation used by the record factories.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end forms                                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Record factories (Rust)                                      │
//! │  └── THIS MODULE: required fields, ranges, formats                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Embedded SQLite                                              │
//! │  └── NOT NULL on id and name-like columns                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizbooks_core::validation::{validate_gstin, validate_required};
//!
//! validate_required("name", "Acme").unwrap();
//! assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
//! assert!(validate_gstin("NOT-A-GSTIN").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted display name.
pub const MAX_NAME_LEN: usize = 200;

/// Length of a GST identification number.
pub const GSTIN_LEN: usize = 15;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name: required, at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    if value.trim().chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a GSTIN: 15 ASCII alphanumerics, state code digits first.
///
/// An empty value is accepted (GSTIN is optional everywhere).
pub fn validate_gstin(value: &str) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "gstin".to_string(),
        reason: reason.to_string(),
    };

    if value.len() != GSTIN_LEN {
        return Err(invalid("must be 15 characters"));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must contain only letters and digits"));
    }
    if !value.chars().take(2).all(|c| c.is_ascii_digit()) {
        return Err(invalid("must start with a 2-digit state code"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement quantity: finite and strictly positive.
pub fn validate_quantity(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage in `0..=100` (discounts, tax rates).
pub fn validate_percent(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
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
    fn test_validate_required() {
        assert!(validate_required("name", "Acme").is_ok());
        assert_eq!(
            validate_required("name", "  "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_name_length() {
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(matches!(
            validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("").is_ok());
        assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gstin("27AAPFU0939F1Z").is_err());
        assert!(validate_gstin("AAAAPFU0939F1ZV").is_err());
        assert!(validate_gstin("27AAPFU0939F1Z-").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 0.5).is_ok());
        assert!(validate_quantity("quantity", 0.0).is_err());
        assert!(validate_quantity("quantity", -1.0).is_err());
        assert!(validate_quantity("quantity", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("discountPercent", 0.0).is_ok());
        assert!(validate_percent("discountPercent", 100.0).is_ok());
        assert!(validate_percent("discountPercent", 100.5).is_err());
    }
}
