//! # Validation Module
//!
//! Input validation utilities for Counter POS.
//!
//! Validators run before any business logic or store write, so a rejected
//! input never leaves a partial trace. The store's own constraints (UNIQUE,
//! CHECK, foreign keys) remain the last line of defense behind these.

use crate::error::ValidationError;
use crate::MAX_INSTALLMENT_COUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a client name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 120 characters
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "client name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "client name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "product name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 32 characters
/// - Only letters, numbers, hyphens, and underscores
///
/// ## Example
/// ```rust
/// use counter_core::validation::validate_product_code;
///
/// assert!(validate_product_code("PRD-00042").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("has space").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "product code".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "product code".to_string(),
            max: 32,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "product code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// Zero is allowed (giveaway items); negative prices are not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity value (cart lines, stock adjustments at receipt).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an installment count.
///
/// ## Rules
/// - At least 1
/// - At most [`MAX_INSTALLMENT_COUNT`]
pub fn validate_installment_count(count: u32) -> ValidationResult<()> {
    if count == 0 || count > MAX_INSTALLMENT_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "installment count".to_string(),
            min: 1,
            max: MAX_INSTALLMENT_COUNT as i64,
        });
    }

    Ok(())
}

/// Validates a cash movement amount (deposits, withdrawals, payments).
pub fn validate_cash_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a register's initial balance.
///
/// An empty drawer (zero) is a normal way to open a shift.
pub fn validate_initial_balance(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "initial balance".to_string(),
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
    fn test_validate_client_name() {
        assert!(validate_client_name("Maria Souza").is_ok());
        assert!(validate_client_name("").is_err());
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Rice 5kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("PRD-00042").is_ok());
        assert!(validate_product_code("abc_123").is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_installment_count() {
        assert!(validate_installment_count(1).is_ok());
        assert!(validate_installment_count(12).is_ok());
        assert!(validate_installment_count(MAX_INSTALLMENT_COUNT).is_ok());

        assert!(validate_installment_count(0).is_err());
        assert!(validate_installment_count(MAX_INSTALLMENT_COUNT + 1).is_err());
    }

    #[test]
    fn test_validate_cash_amount() {
        assert!(validate_cash_amount(100).is_ok());
        assert!(validate_cash_amount(0).is_err());
        assert!(validate_cash_amount(-50).is_err());
    }

    #[test]
    fn test_validate_initial_balance() {
        assert!(validate_initial_balance(0).is_ok());
        assert!(validate_initial_balance(10000).is_ok());
        assert!(validate_initial_balance(-1).is_err());
    }
}
