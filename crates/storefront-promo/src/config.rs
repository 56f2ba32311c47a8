//! # Storefront Configuration
//!
//! Configuration for the pricing rules, loyalty rules and promotion timers.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_SPECIAL_DAYS=tue,sat                                    │
//! │     STOREFRONT_FLASH_ENABLED=false                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Rule tables of the storefront as shipped                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! Rates are basis points (1000 = 10%).
//! ```toml
//! # storefront.toml
//! [pricing]
//! item_threshold = 10
//! bulk_threshold = 30
//! bulk_rate = 2500
//! special_days = ["Tue"]
//! special_rate = 1000
//!
//! [pricing.item_rates]
//! p1 = 1000
//! p5 = 2500
//!
//! [loyalty]
//! points_unit = 1000
//! special_multiplier = 2
//!
//! [promotions]
//! seed = 42
//!
//! [promotions.flash]
//! rate = 2000
//! interval_secs = 30
//! max_initial_delay_secs = 10
//!
//! [promotions.suggestion]
//! enabled = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use storefront_core::validation::validate_rate;
use storefront_core::{DiscountPolicy, LoyaltyPolicy, Rate};
use tracing::{debug, info, warn};

use crate::error::{PromoError, PromoResult};

// =============================================================================
// Promotion Settings
// =============================================================================

/// Longest accepted promotion period (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Longest accepted random start delay (one hour).
pub const MAX_INITIAL_DELAY_SECS: u64 = 3_600;

/// Flash sale timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashSaleSettings {
    pub enabled: bool,
    /// Taken off the list price.
    pub rate: Rate,
    pub interval_secs: u64,
    /// First tick fires after a random delay in `0..=max_initial_delay_secs`.
    pub max_initial_delay_secs: u64,
}

impl Default for FlashSaleSettings {
    fn default() -> Self {
        FlashSaleSettings {
            enabled: true,
            rate: Rate::from_percent(20),
            interval_secs: 30,
            max_initial_delay_secs: 10,
        }
    }
}

/// Suggested-item timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    pub enabled: bool,
    /// Taken off the current price.
    pub rate: Rate,
    pub interval_secs: u64,
    pub max_initial_delay_secs: u64,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        SuggestionSettings {
            enabled: true,
            rate: Rate::from_percent(5),
            interval_secs: 60,
            max_initial_delay_secs: 20,
        }
    }
}

/// The `[promotions]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionSettings {
    /// Fixed RNG seed for reproducible picks; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub flash: FlashSaleSettings,

    #[serde(default)]
    pub suggestion: SuggestionSettings,
}

impl FlashSaleSettings {
    /// Timer period, clamped to `1..=MAX_INTERVAL_SECS`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

impl SuggestionSettings {
    /// Timer period, clamped to `1..=MAX_INTERVAL_SECS`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

// =============================================================================
// Storefront Config
// =============================================================================

/// Complete storefront configuration.
///
/// ## Example
/// ```rust
/// use storefront_promo::StorefrontConfig;
///
/// let config: StorefrontConfig = toml::from_str("[pricing]\nbulk_threshold = 40").unwrap();
/// assert_eq!(config.pricing.bulk_threshold, 40);
/// assert_eq!(config.pricing.item_threshold, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Discount rules.
    #[serde(default)]
    pub pricing: DiscountPolicy,

    /// Points rules.
    #[serde(default)]
    pub loyalty: LoyaltyPolicy,

    /// Promotion timers.
    #[serde(default)]
    pub promotions: PromotionSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> PromoResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> PromoResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| PromoError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PromoResult<()> {
        self.pricing.validate()?;
        self.loyalty.validate()?;

        let flash = &self.promotions.flash;
        let suggestion = &self.promotions.suggestion;
        validate_rate("promotions.flash.rate", flash.rate)?;
        validate_rate("promotions.suggestion.rate", suggestion.rate)?;

        let timers = [
            ("flash", flash.interval_secs, flash.max_initial_delay_secs),
            ("suggestion", suggestion.interval_secs, suggestion.max_initial_delay_secs),
        ];
        for (name, interval_secs, max_delay_secs) in timers {
            if !(1..=MAX_INTERVAL_SECS).contains(&interval_secs) {
                return Err(PromoError::InvalidConfig(format!(
                    "promotions.{}.interval_secs must be between 1 and {}",
                    name, MAX_INTERVAL_SECS
                )));
            }
            if max_delay_secs > MAX_INITIAL_DELAY_SECS {
                return Err(PromoError::InvalidConfig(format!(
                    "promotions.{}.max_initial_delay_secs must be at most {}",
                    name, MAX_INITIAL_DELAY_SECS
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup (the environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Special days, shared by discount and loyalty rules
        if let Some(days) = lookup("STOREFRONT_SPECIAL_DAYS") {
            match parse_weekdays(&days) {
                Some(parsed) => {
                    debug!(days = %days, "Overriding special days from environment");
                    self.pricing.special_days = parsed.clone();
                    self.loyalty.special_days = parsed;
                }
                None => warn!(days = %days, "Unknown weekday in STOREFRONT_SPECIAL_DAYS"),
            }
        }

        if let Some(enabled) = lookup("STOREFRONT_FLASH_ENABLED").and_then(|v| parse_bool(&v)) {
            self.promotions.flash.enabled = enabled;
        }

        if let Some(enabled) =
            lookup("STOREFRONT_SUGGESTION_ENABLED").and_then(|v| parse_bool(&v))
        {
            self.promotions.suggestion.enabled = enabled;
        }

        if let Some(secs) = lookup("STOREFRONT_FLASH_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            debug!(secs, "Overriding flash sale interval from environment");
            self.promotions.flash.interval_secs = secs;
        }

        if let Some(secs) =
            lookup("STOREFRONT_SUGGESTION_INTERVAL_SECS").and_then(|v| v.parse().ok())
        {
            debug!(secs, "Overriding suggestion interval from environment");
            self.promotions.suggestion.interval_secs = secs;
        }

        if let Some(seed) = lookup("STOREFRONT_PROMO_SEED").and_then(|v| v.parse().ok()) {
            self.promotions.seed = Some(seed);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

/// Parses a comma-separated weekday list such as `"tue,sat"`.
fn parse_weekdays(value: &str) -> Option<Vec<Weekday>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Weekday>().ok())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
