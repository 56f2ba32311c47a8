//! # Promotion Error Types
//!
//! Error types for the scheduler and configuration loading.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Promotion Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Scheduler     │  │     Catalog             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  ShuttingDown   │  │  Core (CoreError)       │ │
//! │  │  ConfigLoad     │  │  ChannelError   │  │  StoreUnavailable       │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for promotion operations.
pub type PromoResult<T> = Result<T, PromoError>;

/// Promotion and configuration errors.
#[derive(Debug, Error)]
pub enum PromoError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid storefront configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// A catalog or cart operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The shared store lock is poisoned.
    #[error("Store unavailable: a previous holder panicked")]
    StoreUnavailable,

    // =========================================================================
    // Scheduler Errors
    // =========================================================================
    /// Scheduler is shutting down.
    #[error("Promotion scheduler is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for PromoError {
    fn from(err: ValidationError) -> Self {
        PromoError::InvalidConfig(err.to_string())
    }
}

impl From<std::io::Error> for PromoError {
    fn from(err: std::io::Error) -> Self {
        PromoError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for PromoError {
    fn from(err: toml::de::Error) -> Self {
        PromoError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for PromoError {
    fn from(err: toml::ser::Error) -> Self {
        PromoError::ConfigSaveFailed(err.to_string())
    }
}

impl PromoError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PromoError::InvalidConfig(_)
                | PromoError::ConfigLoadFailed(_)
                | PromoError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_config_error() {
        let err: PromoError = ValidationError::MustBePositive {
            field: "promotions.flash.interval_secs".to_string(),
        }
        .into();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: PromoError = CoreError::InvalidProduct("p9".to_string()).into();
        assert_eq!(err.to_string(), "Invalid product: p9");
        assert!(!err.is_config_error());
    }
}
