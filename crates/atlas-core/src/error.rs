//! # Error Types
//!
//! Domain-specific error types for atlas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  atlas-core errors (this file)                                      │
//! │  ├── CoreError        - Business conflicts, surfaced verbatim       │
//! │  └── ValidationError  - Input rejected before any write             │
//! │                                                                     │
//! │  atlas-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── EngineError      - Core(CoreError) | Db(DbError)               │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → EngineError → caller           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (variation id, status, ...)
//! 3. Errors are enum variants, never String
//! 4. A caller can always tell which constraint failed without re-deriving
//!    business logic

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are conflicts and not-found conditions, surfaced to the caller
/// verbatim. The engines never retry them; a caller may retry
/// `InsufficientStock` after user action.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Variation cannot be found in the catalog surface.
    #[error("Variation not found: {0}")]
    VariationNotFound(String),

    /// Insufficient stock to reserve the requested quantity.
    ///
    /// The check and the decrement happen as one atomic step, so two
    /// concurrent reservations can never both succeed past the available
    /// quantity; the loser receives this error.
    #[error("Insufficient stock for {variation_id}: available {available}, requested {requested}")]
    InsufficientStock {
        variation_id: String,
        available: i64,
        requested: i64,
    },

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Sale is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Adding a payment to a cancelled sale
    /// - Cancelling an already-cancelled sale
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// Cash session not found.
    #[error("Cash session not found: {0}")]
    SessionNotFound(String),

    /// Cash session is closed; no movement may be posted or deleted.
    ///
    /// When raised from inside a payment operation, the whole operation
    /// aborts: a sale must never show paid money with no ledger entry.
    #[error("Cash session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// Session is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Closing an already-closed session
    /// - Reopening a session that is open or already reopened
    #[error("Cash session {session_id} is {current_status}, cannot perform operation")]
    InvalidSessionStatus {
        session_id: String,
        current_status: String,
    },

    /// Movement is linked to a sale payment and may not be deleted.
    ///
    /// Only manually entered kinds (withdrawal, expense, manual-in) are
    /// deletable; SALE movements keep the 1:1 link with the sale's payment
    /// trail intact.
    #[error("Movement {movement_id} is linked to a sale and cannot be deleted")]
    SaleLinkedMovement { movement_id: String },

    /// Acting user lacks the capability for this operation.
    #[error("Actor {actor_id} is not permitted to {action}")]
    NotPermitted { actor_id: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Raised before
/// any write, fully local to the call.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (zero is fine).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, malformed decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A sale needs at least one line item.
    #[error("sale must contain at least one item")]
    EmptyCart,

    /// A sale has too many line items.
    #[error("sale cannot have more than {max} items")]
    CartTooLarge { max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            variation_id: "var-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for var-1: available 3, requested 5"
        );

        let err = CoreError::SessionClosed {
            session_id: "sess-1".to_string(),
        };
        assert_eq!(err.to_string(), "Cash session sess-1 is closed");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");

        let err = ValidationError::EmptyCart;
        assert_eq!(err.to_string(), "sale must contain at least one item");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "store_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
