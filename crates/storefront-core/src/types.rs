//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │      Product        │   │    LineItem     │   │   SaleBadge     │   │
//! │  │  ─────────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id ("p1")          │   │  product_id     │   │  None           │   │
//! │  │  name               │   │  quantity > 0   │   │  Flash          │   │
//! │  │  current_price      │   └─────────────────┘   │  Suggested      │   │
//! │  │  original_price     │                         │  Super (both)   │   │
//! │  │  stock              │   ┌─────────────────┐   └─────────────────┘   │
//! │  │  on_flash_sale      │   │  SaleFlagUpdate │                         │
//! │  │  on_suggested_sale  │   │  Option<bool> × 2│                        │
//! │  └─────────────────────┘   └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! `Product` records are owned by [`crate::Catalog`] and replaced whole on
//! every mutation. `LineItem`s are ephemeral, built per calculation call.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};

// =============================================================================
// Product
// =============================================================================

/// A product available in the storefront.
///
/// ## Invariants
/// - `current_price == original_price` unless a sale flag is set
/// - `stock` is unsigned, so it can never go negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Catalog identifier ("p1".."p5" in the seed).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Price charged right now.
    pub current_price: Money,

    /// List price before any sale.
    pub original_price: Money,

    /// Units available.
    pub stock: u32,

    /// Flash sale currently running on this product.
    pub on_flash_sale: bool,

    /// Suggested-item discount currently running on this product.
    pub on_suggested_sale: bool,
}

impl Product {
    /// Creates a product at list price with no sale running.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            current_price: price,
            original_price: price,
            stock,
            on_flash_sale: false,
            on_suggested_sale: false,
        }
    }

    /// Checks if at least one unit is available.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks if any sale flag is set.
    #[inline]
    pub fn is_discounted(&self) -> bool {
        self.on_flash_sale || self.on_suggested_sale
    }

    /// Which sale badge the product carries.
    pub fn sale_badge(&self) -> SaleBadge {
        match (self.on_flash_sale, self.on_suggested_sale) {
            (true, true) => SaleBadge::Super,
            (true, false) => SaleBadge::Flash,
            (false, true) => SaleBadge::Suggested,
            (false, false) => SaleBadge::None,
        }
    }

    /// Checks the price invariant.
    pub fn price_consistent(&self) -> bool {
        self.is_discounted() || self.current_price == self.original_price
    }
}

// =============================================================================
// Sale Badge
// =============================================================================

/// The sale label shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SaleBadge {
    /// List price.
    #[default]
    None,
    /// Flash sale only.
    Flash,
    /// Suggested-item discount only.
    Suggested,
    /// Flash sale and suggested discount stacked.
    Super,
}

impl SaleBadge {
    /// The advertised rate for this badge, given the two promotion rates.
    ///
    /// A super sale advertises the sum of both rates, even though the price
    /// itself compounds them.
    pub fn advertised_rate(&self, flash: Rate, suggested: Rate) -> Rate {
        match self {
            SaleBadge::None => Rate::zero(),
            SaleBadge::Flash => flash,
            SaleBadge::Suggested => suggested,
            SaleBadge::Super => flash + suggested,
        }
    }
}

// =============================================================================
// Sale Flag Update
// =============================================================================

/// Partial update for the sale flags. `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleFlagUpdate {
    pub on_flash_sale: Option<bool>,
    pub on_suggested_sale: Option<bool>,
}

impl SaleFlagUpdate {
    pub fn flash(on: bool) -> Self {
        SaleFlagUpdate {
            on_flash_sale: Some(on),
            on_suggested_sale: None,
        }
    }

    pub fn suggested(on: bool) -> Self {
        SaleFlagUpdate {
            on_flash_sale: None,
            on_suggested_sale: Some(on),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A (product, quantity) pair fed into a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Priced Cart
// =============================================================================

/// A line item resolved against the catalog at the current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolvedLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// unit_price × quantity.
    pub line_total: Money,
}

/// Line items priced against the catalog, before any discount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricedCart {
    /// Lines whose product exists, in input order.
    pub lines: Vec<ResolvedLine>,
    /// Ids of lines left out of the totals; see [`crate::Catalog::price_lines`].
    pub skipped_product_ids: Vec<String>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Sum of quantities over resolved lines.
    pub item_count: u32,
}

impl PricedCart {
    /// Checks whether the resolved lines include `product_id`.
    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> Product {
        Product::new("p1", "Keyboard", Money::from_won(10_000), 50)
    }

    #[test]
    fn test_new_product_is_at_list_price() {
        let product = keyboard();
        assert_eq!(product.current_price, product.original_price);
        assert!(!product.is_discounted());
        assert!(product.price_consistent());
        assert_eq!(product.sale_badge(), SaleBadge::None);
    }

    #[test]
    fn test_sale_badges() {
        let mut product = keyboard();
        product.on_flash_sale = true;
        assert_eq!(product.sale_badge(), SaleBadge::Flash);
        product.on_suggested_sale = true;
        assert_eq!(product.sale_badge(), SaleBadge::Super);
        product.on_flash_sale = false;
        assert_eq!(product.sale_badge(), SaleBadge::Suggested);
    }

    #[test]
    fn test_advertised_rate_sums_for_super_sale() {
        let flash = Rate::from_percent(20);
        let suggested = Rate::from_percent(5);
        assert_eq!(SaleBadge::Super.advertised_rate(flash, suggested), Rate::from_percent(25));
        assert_eq!(SaleBadge::None.advertised_rate(flash, suggested), Rate::zero());
    }

    #[test]
    fn test_price_inconsistency_detected() {
        let mut product = keyboard();
        product.current_price = Money::from_won(9_000);
        assert!(!product.price_consistent());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(keyboard()).unwrap();
        assert_eq!(json["currentPrice"], 10_000);
        assert_eq!(json["onFlashSale"], false);
    }
}
