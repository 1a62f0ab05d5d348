//! # Error Types
//!
//! Domain-specific error types for counter-core.
//!
//! ## Error Hierarchy
//! ```text
//! counter-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! counter-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! counter-pos errors (service crate)
//! └── CheckoutError    - Rejected / partial checkout outcomes
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product code, operator id, ...)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are caught by the service layer and reported to the initiating
/// caller; none of them is fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted without a selected client.
    #[error("no client selected for checkout")]
    MissingClient,

    /// Checkout was attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The cash handed over does not cover the sale total.
    #[error("insufficient payment: tendered {tendered_cents} against total {total_cents}")]
    InsufficientTendered {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// Stock would go negative.
    ///
    /// Raised when the conditional stock debit is refused by the store,
    /// e.g. another sale consumed the units between cart and checkout.
    #[error("insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Installment count outside the permitted range.
    #[error("invalid installment count {requested}, must be between 1 and {max}")]
    InvalidInstallmentCount { requested: u32, max: u32 },

    /// The operator already has an open cash register.
    #[error("operator {operator_id} already has an open cash register")]
    RegisterAlreadyOpen { operator_id: String },

    /// A ledger operation needs an open register and the operator has none.
    #[error("operator {operator_id} has no open cash register")]
    NoOpenRegister { operator_id: String },

    /// The paid transition was requested twice for the same installment.
    #[error("installment {id} is already paid")]
    InstallmentAlreadyPaid { id: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input does not meet requirements. Used for early
/// validation before any business logic runs or any write is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. bad product code, bad UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
            code: "PRD-00042".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for PRD-00042: available 3, requested 5"
        );

        let err = CoreError::InsufficientTendered {
            total_cents: 1500,
            tendered_cents: 1000,
        };
        assert_eq!(
            err.to_string(),
            "insufficient payment: tendered 1000 against total 1500"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
