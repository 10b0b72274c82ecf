//! # Validation Module
//!
//! Input validation for the sale and ledger engines.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: Transport (whatever wraps the engines)                    │
//! │  ├── Basic format checks, immediate user feedback                   │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │  ├── Rejects before any write, fully local to the call              │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK / UNIQUE / foreign key constraints            │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_DESCRIPTION_LEN, MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: strictly positive, bounded.
///
/// ## Example
/// ```rust
/// use atlas_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-2).is_err());
/// assert!(validate_quantity(5000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a monetary amount that must be strictly positive
/// (payment amounts, movement amounts).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a discount or surcharge: zero is fine, negative is not.
pub fn validate_adjustment_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a session opening balance: zero is a legitimate empty drawer.
pub fn validate_opening_balance_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_balance".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates the line count of a sale being created.
pub fn validate_cart_size(line_count: usize) -> ValidationResult<()> {
    if line_count == 0 {
        return Err(ValidationError::EmptyCart);
    }
    if line_count > MAX_SALE_LINES {
        return Err(ValidationError::CartTooLarge {
            max: MAX_SALE_LINES,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a free-text movement description.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

/// Validates that an ID string is a well-formed UUID.
///
/// ## Example
/// ```rust
/// use atlas_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "not a valid UUID".to_string(),
    })?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount_cents("amount", 1).is_ok());
        assert!(validate_amount_cents("amount", 0).is_err());
        assert!(validate_amount_cents("amount", -500).is_err());
    }

    #[test]
    fn test_validate_adjustment() {
        assert!(validate_adjustment_cents("discount", 0).is_ok());
        assert!(validate_adjustment_cents("discount", 250).is_ok());
        assert!(validate_adjustment_cents("discount", -1).is_err());
    }

    #[test]
    fn test_validate_opening_balance() {
        assert!(validate_opening_balance_cents(0).is_ok());
        assert!(validate_opening_balance_cents(10_000).is_ok());
        assert!(validate_opening_balance_cents(-1).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(1).is_ok());
        assert!(validate_cart_size(MAX_SALE_LINES).is_ok());
        assert!(matches!(
            validate_cart_size(0),
            Err(ValidationError::EmptyCart)
        ));
        assert!(validate_cart_size(MAX_SALE_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("till float top-up").is_ok());
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(validate_description(&long).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("sale_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("sale_id", "").is_err());
        assert!(validate_uuid("sale_id", "nope").is_err());
    }
}
