//! # Validation Module
//!
//! Input validation for catalog mutations, cart quantities and rule policies.
//!
//! The engine trusts what the presentation layer feeds it only as far as
//! these checks go; anything they let through is arithmetic-safe.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_product_id, validate_quantity};
//!
//! validate_product_id("p1").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Rate, BPS_SCALE};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product id".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (free items are allowed)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate.
///
/// ## Rules
/// - Must be between 0% and 100%
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.bps() > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: BPS_SCALE as i64,
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
    fn test_validate_product_id() {
        assert!(validate_product_id("p1").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_won(10_000)).is_ok());
        assert!(validate_price(Money::from_won(-1)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("rate", Rate::zero()).is_ok());
        assert!(validate_rate("rate", Rate::from_percent(100)).is_ok());
        assert!(validate_rate("rate", Rate::from_bps(10_001)).is_err());
    }
}
