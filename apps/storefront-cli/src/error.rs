//! # CLI Error Type
//!
//! One error type for everything the host reports. With `--json` it is
//! printed as `{"code": "...", "message": "..."}` so a wrapping UI can branch
//! on the code.

use serde::Serialize;
use storefront_core::CoreError;
use storefront_promo::PromoError;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct CliError {
    /// Machine-readable error code.
    pub code: ErrorCode,

    /// Human-readable message.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown product id.
    NotFound,

    /// Bad argument or config value.
    ValidationError,

    /// Not enough stock for the requested quantity.
    InsufficientStock,

    /// Cart operation on a product that is not in the cart.
    CartError,

    /// Config file could not be read or written.
    ConfigError,

    /// Anything else.
    Internal,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidProduct(id) => {
                CliError::new(ErrorCode::NotFound, format!("Product not found: {}", id))
            }
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => CliError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Not enough stock for {}: {} available, {} requested",
                    product_id, available, requested
                ),
            ),
            CoreError::NotInCart(id) => {
                CliError::new(ErrorCode::CartError, format!("{} is not in the cart", id))
            }
            CoreError::Validation(e) => CliError::validation(e.to_string()),
        }
    }
}

impl From<PromoError> for CliError {
    fn from(err: PromoError) -> Self {
        match err {
            PromoError::Core(e) => e.into(),
            e if e.is_config_error() => CliError::new(ErrorCode::ConfigError, e.to_string()),
            e => CliError::internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Failed to encode output: {}", err))
    }
}
