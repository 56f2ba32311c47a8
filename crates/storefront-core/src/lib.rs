//! # storefront-core: Pricing & Loyalty Engine
//!
//! This crate is the **heart** of the storefront cart. It turns cart line
//! items plus calendar and promotion state into a final charge, a discount
//! breakdown and a loyalty-points breakdown, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Cart Widget (presentation, JS)                   │   │
//! │  │    Product Select ──► Cart Lines ──► Order Summary ──► Points   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (ts-rs bindings)                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────────┐ │   │
//! │  │  │ catalog  │ │   cart   │ │  discount  │ │     loyalty      │ │   │
//! │  │  │ Product  │ │ LineItem │ │ rule       │ │ base / combo /   │ │   │
//! │  │  │ stock    │ │ session  │ │ pipeline   │ │ quantity tiers   │ │   │
//! │  │  └──────────┘ └──────────┘ └────────────┘ └──────────────────┘ │   │
//! │  │                 ┌──────────────┐                                │   │
//! │  │                 │  calculator  │ orchestrates catalog+discount  │   │
//! │  │                 └──────────────┘                                │   │
//! │  │   NO I/O • NO TIMERS • PURE FUNCTIONS                           │   │
//! │  └─────────────────────────────▲───────────────────────────────────┘   │
//! │                                │ mutates sale flags                     │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │             storefront-promo (Promotion Scheduler)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, LineItem, sale flags and badges
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - Product store with whole-record mutations
//! - [`cart`] - Cart session (add / change quantity / remove with stock bookkeeping)
//! - [`discount`] - Discount rule pipeline
//! - [`calculator`] - Cart calculation orchestration
//! - [`loyalty`] - Points rules
//! - [`stock`] - Stock warnings
//! - [`summary`] - Order summary data for the presentation layer
//! - [`clock`] - Calendar source
//! - [`store`] - Catalog + cart owned together
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use storefront_core::{ids, CartCalculator, Catalog, LineItem, LoyaltyRules};
//!
//! let catalog = Catalog::seeded();
//! let items = vec![LineItem::new(ids::KEYBOARD, 1), LineItem::new(ids::MOUSE, 1)];
//!
//! // 2026-10-15 is a Thursday
//! let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
//! let result = CartCalculator::default().calculate_on(&catalog, &items, today);
//! assert_eq!(result.total.won(), 30_000);
//!
//! let points = LoyaltyRules::default()
//!     .compute_points_on(result.total, result.item_count, &items, today);
//! assert_eq!(points.total_points, 30 + 50);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod cart;
pub mod catalog;
pub mod clock;
pub mod discount;
pub mod error;
pub mod loyalty;
pub mod money;
pub mod stock;
pub mod store;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{CartCalculationResult, CartCalculator};
pub use cart::{Cart, CartChange};
pub use catalog::{ids, Catalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use discount::{
    AppliedRule, DiscountBranch, DiscountContext, DiscountOutcome, DiscountPolicy, DiscountRule,
    DiscountRules, ItemDiscount, RuleEffect,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use loyalty::{LoyaltyPolicy, LoyaltyResult, LoyaltyRules, QuantityTier};
pub use money::{Money, Rate};
pub use stock::{StockLevel, StockReport, StockWarning};
pub use store::{SharedStore, Store};
pub use summary::OrderSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in the cart.
///
/// ## Business Reason
/// Guards the integer arithmetic against absurd inputs; no real cart line
/// gets anywhere near it.
pub const MAX_ITEM_QUANTITY: u32 = 9_999;
