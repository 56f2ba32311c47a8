//! # Cart Calculator
//!
//! Orchestrates catalog lookup and the discount pipeline into a single
//! [`CartCalculationResult`].
//!
//! ## Flow
//! ```text
//! line items ──► Catalog::price_lines ──► PricedCart
//!                  (unknown ids skipped)      │
//!                                             ▼
//!                 clock.today() ──────► DiscountRules::evaluate
//!                                             │
//!                                             ▼
//!                                  CartCalculationResult
//! ```
//!
//! The calculator only reads the catalog. Results are rebuilt from scratch on
//! every call, so two calls over the same catalog and items are identical.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::discount::{DiscountBranch, DiscountRules, ItemDiscount};
use crate::money::{Money, Rate};
use crate::types::{LineItem, ResolvedLine};

/// The priced and discounted cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartCalculationResult {
    /// Sum of line totals at current prices, never rounded.
    pub subtotal: Money,
    pub item_count: u32,
    pub per_item_discounts: Vec<ItemDiscount>,
    pub bulk_discount_applied: bool,
    pub bulk_rate: Option<Rate>,
    pub special_day_applied: bool,
    pub is_special_day: bool,
    /// `(subtotal − total) / subtotal` in `0..=1`.
    pub discount_rate: f64,
    /// Amount charged, rounded half-up to whole won.
    pub total: Money,
    /// Same as `subtotal`; kept for the presentation layer.
    pub original_total: Money,
    /// Product ids of lines left out of the calculation (unknown product or
    /// quantity out of range).
    pub skipped_product_ids: Vec<String>,
    pub lines: Vec<ResolvedLine>,
}

impl CartCalculationResult {
    /// Amount taken off the subtotal.
    pub fn saved_amount(&self) -> Money {
        self.original_total - self.total
    }

    pub fn has_discount(&self) -> bool {
        self.discount_rate > 0.0
    }
}

/// Computes cart totals against a catalog.
#[derive(Clone)]
pub struct CartCalculator {
    rules: DiscountRules,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CartCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartCalculator")
            .field("rules", &self.rules)
            .field("today", &self.clock.today())
            .finish()
    }
}

impl Default for CartCalculator {
    fn default() -> Self {
        CartCalculator::new(DiscountRules::default(), Arc::new(SystemClock))
    }
}

impl CartCalculator {
    pub fn new(rules: DiscountRules, clock: Arc<dyn Clock>) -> Self {
        CartCalculator { rules, clock }
    }

    pub fn rules(&self) -> &DiscountRules {
        &self.rules
    }

    /// Today's date according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Calculates the cart using the injected clock.
    pub fn calculate(&self, catalog: &Catalog, items: &[LineItem]) -> CartCalculationResult {
        self.calculate_on(catalog, items, self.clock.today())
    }

    /// Calculates the cart as of `today`.
    pub fn calculate_on(
        &self,
        catalog: &Catalog,
        items: &[LineItem],
        today: NaiveDate,
    ) -> CartCalculationResult {
        let priced = catalog.price_lines(items);
        let outcome = self.rules.evaluate(&priced, today);

        debug!(
            subtotal = priced.subtotal.won(),
            total = outcome.total.won(),
            item_count = priced.item_count,
            branch = ?outcome.branch,
            special_day = outcome.special_day_applied,
            "Cart calculated"
        );

        CartCalculationResult {
            subtotal: priced.subtotal,
            item_count: priced.item_count,
            per_item_discounts: outcome.per_item_discounts,
            bulk_discount_applied: outcome.branch == DiscountBranch::Bulk,
            bulk_rate: outcome.bulk_rate,
            special_day_applied: outcome.special_day_applied,
            is_special_day: outcome.is_special_day,
            discount_rate: outcome.discount_rate,
            total: outcome.total,
            original_total: outcome.original_total,
            skipped_product_ids: priced.skipped_product_ids,
            lines: priced.lines,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
