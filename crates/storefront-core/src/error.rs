//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Catalog / cart operation failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-promo errors (separate crate)                              │
//! │  └── PromoError       - Scheduler and config failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PromoError → host                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! - An unknown product id inside a calculation: the line is skipped and
//!   reported in `CartCalculationResult::skipped_product_ids`.
//! - A zero subtotal: the discount rate is reported as 0.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Catalog and cart operation errors.
///
/// The presentation layer maps these to user-facing notifications; the core
/// never shows anything itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No product with this id exists in the catalog.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Stock change would take the product below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Click "+" on cart line (speaker, 10 in cart, 0 left)
    ///      │
    ///      ▼
    /// adjust_stock("p5", -1)
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "p5", available: 0, requested: 1 }
    ///      │
    ///      ▼
    /// UI shows: "Not enough stock."  (catalog left untouched)
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: u32,
        requested: u32,
    },

    /// The product is not in the cart.
    #[error("Product {0} not in cart")]
    NotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Thresholds or tiers that must be ordered are not.
    #[error("{field} is not ordered: {reason}")]
    NotOrdered { field: String, reason: String },
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
            product_id: "p5".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for p5: available 0, requested 1"
        );
        assert_eq!(
            CoreError::InvalidProduct("p9".to_string()).to_string(),
            "Invalid product: p9"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: quantity must be positive");
    }
}
