//! # Discount Rules
//!
//! Turns a priced cart and a calendar date into a discount decision.
//!
//! ## Rule Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Discount Pipeline                                │
//! │                                                                         │
//! │   running = subtotal                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────┐  line qty ≥ 10: Σ (subtotal × item rate)            │
//! │   │ PerItemRule  │──────────────────────────────► Replace(total)        │
//! │   └──────┬───────┘                                                      │
//! │          ▼                                                              │
//! │   ┌──────────────┐  item count ≥ 30: subtotal × 75%                    │
//! │   │  BulkRule    │──────────────────────────────► Replace(total)        │
//! │   └──────┬───────┘  (per-item result discarded)                         │
//! │          ▼                                                              │
//! │   ┌──────────────┐  Tuesday and running > 0: running × 90%            │
//! │   │SpecialDayRule│──────────────────────────────► Replace(total)        │
//! │   └──────┬───────┘                                                      │
//! │          ▼                                                              │
//! │   rate = (subtotal − total) / subtotal   (0 when subtotal is 0)        │
//! │   total rounded half-up to whole ₩, once                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rule returns either [`RuleEffect::NoEffect`] or a replacement total.
//! Amounts stay in [`ExactAmount`] until the very end, so the reported rate is
//! always recomputed from the final total, never accumulated.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{ids, Catalog};
use crate::clock::is_one_of;
use crate::error::ValidationError;
use crate::money::{ExactAmount, Money, Rate};
use crate::types::{LineItem, PricedCart};
use crate::validation::{validate_rate, ValidationResult};

// =============================================================================
// Policy
// =============================================================================

/// Thresholds and rates for the discount rules.
///
/// Loaded from the `[pricing]` table of the host config; every field has a
/// default so a partial table is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountPolicy {
    /// Minimum quantity on a single line for its per-item rate to apply.
    pub item_threshold: u32,

    /// Minimum total item count for the bulk rate.
    pub bulk_threshold: u32,

    /// Flat rate on the subtotal once the bulk threshold is met.
    pub bulk_rate: Rate,

    /// Weekdays on which the special-day multiplier runs.
    pub special_days: Vec<Weekday>,

    /// Extra multiplicative reduction on special days.
    pub special_rate: Rate,

    /// Per-product rates, keyed by product id. Absent products get 0%.
    pub item_rates: BTreeMap<String, Rate>,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        let item_rates = [
            (ids::KEYBOARD, 10),
            (ids::MOUSE, 15),
            (ids::MONITOR_ARM, 20),
            (ids::LAPTOP_POUCH, 5),
            (ids::SPEAKER, 25),
        ]
        .into_iter()
        .map(|(id, pct)| (id.to_string(), Rate::from_percent(pct)))
        .collect();

        DiscountPolicy {
            item_threshold: 10,
            bulk_threshold: 30,
            bulk_rate: Rate::from_percent(25),
            special_days: vec![Weekday::Tue],
            special_rate: Rate::from_percent(10),
            item_rates,
        }
    }
}

impl DiscountPolicy {
    /// The per-item rate for a product, 0% when it has none.
    pub fn item_rate(&self, product_id: &str) -> Rate {
        self.item_rates.get(product_id).copied().unwrap_or_default()
    }

    /// Checks whether `date` is a special day under this policy.
    pub fn is_special_day(&self, date: NaiveDate) -> bool {
        is_one_of(date, &self.special_days)
    }

    /// Validates the policy.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.item_threshold == 0 {
            return Err(ValidationError::MustBePositive {
                field: "pricing.item_threshold".to_string(),
            });
        }
        if self.bulk_threshold == 0 {
            return Err(ValidationError::MustBePositive {
                field: "pricing.bulk_threshold".to_string(),
            });
        }
        for (id, rate) in &self.item_rates {
            validate_rate(&format!("pricing.item_rates.{}", id), *rate)?;
        }
        validate_rate("pricing.bulk_rate", self.bulk_rate)?;
        validate_rate("pricing.special_rate", self.special_rate)?;
        Ok(())
    }
}

// =============================================================================
// Rule Interface
// =============================================================================

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub cart: &'a PricedCart,
    pub subtotal: ExactAmount,
    pub today: NaiveDate,
}

/// What a rule did to the running total.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEffect {
    NoEffect,
    Replace { total: ExactAmount, applied: AppliedRule },
}

/// Which rule produced a replacement total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedRule {
    PerItem(Vec<ItemDiscount>),
    Bulk(Rate),
    SpecialDay(Rate),
}

/// A single step of the discount pipeline.
pub trait DiscountRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates the rule against the running total.
    fn evaluate(&self, ctx: &DiscountContext<'_>, running: ExactAmount) -> RuleEffect;
}

/// A per-item discount that fired for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemDiscount {
    pub product_id: String,
    pub name: String,
    /// Whole-percent rate as shown to the shopper (10 = 10%).
    pub rate_percent: u32,
    pub rate: Rate,
}

// =============================================================================
// Built-in Rules
// =============================================================================

/// Per-product rates for lines at or above the quantity threshold.
///
/// Each rate is taken off the full subtotal and the reductions are summed.
#[derive(Debug, Clone)]
pub struct PerItemRule {
    pub threshold: u32,
    pub rates: BTreeMap<String, Rate>,
}

impl DiscountRule for PerItemRule {
    fn name(&self) -> &'static str {
        "per_item"
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>, _running: ExactAmount) -> RuleEffect {
        let discounts: Vec<ItemDiscount> = ctx
            .cart
            .lines
            .iter()
            .filter(|line| line.quantity >= self.threshold)
            .filter_map(|line| {
                let rate = self.rates.get(&line.product_id).copied()?;
                if rate.is_zero() {
                    return None;
                }
                Some(ItemDiscount {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    rate_percent: rate.bps() / 100,
                    rate,
                })
            })
            .collect();

        if discounts.is_empty() {
            return RuleEffect::NoEffect;
        }

        let reduction: ExactAmount = discounts.iter().map(|d| ctx.subtotal.portion(d.rate)).sum();
        let total = if reduction > ctx.subtotal {
            ExactAmount::zero()
        } else {
            ctx.subtotal - reduction
        };

        RuleEffect::Replace {
            total,
            applied: AppliedRule::PerItem(discounts),
        }
    }
}

/// Flat rate on the subtotal once the cart holds enough items.
#[derive(Debug, Clone, Copy)]
pub struct BulkRule {
    pub threshold: u32,
    pub rate: Rate,
}

impl DiscountRule for BulkRule {
    fn name(&self) -> &'static str {
        "bulk"
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>, _running: ExactAmount) -> RuleEffect {
        if ctx.cart.item_count < self.threshold {
            return RuleEffect::NoEffect;
        }
        RuleEffect::Replace {
            total: ctx.subtotal.scaled_by_complement(self.rate),
            applied: AppliedRule::Bulk(self.rate),
        }
    }
}

/// Multiplicative reduction on configured weekdays.
#[derive(Debug, Clone)]
pub struct SpecialDayRule {
    pub days: Vec<Weekday>,
    pub rate: Rate,
}

impl DiscountRule for SpecialDayRule {
    fn name(&self) -> &'static str {
        "special_day"
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>, running: ExactAmount) -> RuleEffect {
        if !is_one_of(ctx.today, &self.days) || !running.is_positive() {
            return RuleEffect::NoEffect;
        }
        RuleEffect::Replace {
            total: running.scaled_by_complement(self.rate),
            applied: AppliedRule::SpecialDay(self.rate),
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Which reduction branch fired before the special-day step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountBranch {
    #[default]
    None,
    PerItem,
    Bulk,
}

/// The discount decision for one cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountOutcome {
    pub branch: DiscountBranch,
    /// Per-item discounts; always empty when the bulk branch fired.
    pub per_item_discounts: Vec<ItemDiscount>,
    pub bulk_rate: Option<Rate>,
    pub special_day_applied: bool,
    /// The weekday check alone, regardless of whether the multiplier ran.
    pub is_special_day: bool,
    /// The subtotal before any discount.
    pub original_total: Money,
    /// The final total, rounded half-up once.
    pub total: Money,
    /// `(original − final) / original`, computed before rounding; 0 for an
    /// empty subtotal.
    pub discount_rate: f64,
}

// =============================================================================
// Discount Rules
// =============================================================================

/// The ordered discount pipeline built from a [`DiscountPolicy`].
#[derive(Clone)]
pub struct DiscountRules {
    policy: DiscountPolicy,
    rules: Vec<Arc<dyn DiscountRule>>,
}

impl fmt::Debug for DiscountRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscountRules")
            .field("policy", &self.policy)
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Default for DiscountRules {
    fn default() -> Self {
        DiscountRules::new(DiscountPolicy::default())
    }
}

impl DiscountRules {
    /// Builds the standard pipeline: per-item, bulk, special day.
    pub fn new(policy: DiscountPolicy) -> Self {
        let rules: Vec<Arc<dyn DiscountRule>> = vec![
            Arc::new(PerItemRule {
                threshold: policy.item_threshold,
                rates: policy.item_rates.clone(),
            }),
            Arc::new(BulkRule {
                threshold: policy.bulk_threshold,
                rate: policy.bulk_rate,
            }),
            Arc::new(SpecialDayRule {
                days: policy.special_days.clone(),
                rate: policy.special_rate,
            }),
        ];
        DiscountRules { policy, rules }
    }

    /// Builds a pipeline from explicit rules, evaluated in order.
    pub fn with_rules(policy: DiscountPolicy, rules: Vec<Arc<dyn DiscountRule>>) -> Self {
        DiscountRules { policy, rules }
    }

    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    /// Prices `items` against `catalog` and runs the pipeline.
    pub fn compute_discount(
        &self,
        items: &[LineItem],
        catalog: &Catalog,
        today: NaiveDate,
    ) -> DiscountOutcome {
        self.evaluate(&catalog.price_lines(items), today)
    }

    /// Runs the pipeline over an already-priced cart.
    pub fn evaluate(&self, cart: &PricedCart, today: NaiveDate) -> DiscountOutcome {
        let subtotal = ExactAmount::from_money(cart.subtotal);
        let ctx = DiscountContext { cart, subtotal, today };

        let mut running = subtotal;
        let mut branch = DiscountBranch::None;
        let mut per_item_discounts = Vec::new();
        let mut bulk_rate = None;
        let mut special_day_applied = false;

        for rule in &self.rules {
            match rule.evaluate(&ctx, running) {
                RuleEffect::NoEffect => {}
                RuleEffect::Replace { total, applied } => {
                    running = total;
                    match applied {
                        AppliedRule::PerItem(discounts) => {
                            branch = DiscountBranch::PerItem;
                            per_item_discounts = discounts;
                        }
                        AppliedRule::Bulk(rate) => {
                            branch = DiscountBranch::Bulk;
                            per_item_discounts.clear();
                            bulk_rate = Some(rate);
                        }
                        AppliedRule::SpecialDay(_) => {
                            special_day_applied = true;
                        }
                    }
                }
            }
        }

        DiscountOutcome {
            branch,
            per_item_discounts,
            bulk_rate,
            special_day_applied,
            is_special_day: self.policy.is_special_day(today),
            original_total: cart.subtotal,
            total: running.round_half_up(),
            discount_rate: (subtotal - running).ratio_to(subtotal),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-10-15 is a Thursday, 2026-10-20 a Tuesday
    fn thursday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    fn discount(items: &[LineItem], today: NaiveDate) -> DiscountOutcome {
        DiscountRules::default().compute_discount(items, &Catalog::seeded(), today)
    }

    #[test]
    fn test_small_cart_has_no_discount() {
        let outcome = discount(
            &[LineItem::new(ids::KEYBOARD, 9), LineItem::new(ids::MOUSE, 9)],
            thursday(),
        );
        assert_eq!(outcome.branch, DiscountBranch::None);
        assert_eq!(outcome.total, outcome.original_total);
        assert_eq!(outcome.total, Money::from_won(270_000));
        assert_eq!(outcome.discount_rate, 0.0);
    }

    #[test]
    fn test_single_item_rate_applies_to_full_subtotal() {
        // mouse ×10 hits 15%; keyboard ×2 rides along on the subtotal
        let outcome = discount(
            &[LineItem::new(ids::MOUSE, 10), LineItem::new(ids::KEYBOARD, 2)],
            thursday(),
        );
        assert_eq!(outcome.branch, DiscountBranch::PerItem);
        assert_eq!(outcome.original_total, Money::from_won(220_000));
        assert_eq!(outcome.total, Money::from_won(187_000));
        assert!((outcome.discount_rate - 0.15).abs() < 1e-9);
        assert_eq!(outcome.per_item_discounts.len(), 1);
        assert_eq!(outcome.per_item_discounts[0].product_id, ids::MOUSE);
        assert_eq!(outcome.per_item_discounts[0].rate_percent, 15);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let at = discount(&[LineItem::new(ids::KEYBOARD, 10)], thursday());
        let below = discount(&[LineItem::new(ids::KEYBOARD, 9)], thursday());
        assert_eq!(at.branch, DiscountBranch::PerItem);
        assert_eq!(below.branch, DiscountBranch::None);
    }

    #[test]
    fn test_multiple_item_rates_are_summed() {
        // keyboard 10% + monitor arm 20% on 400_000
        let outcome = discount(
            &[LineItem::new(ids::KEYBOARD, 10), LineItem::new(ids::MONITOR_ARM, 10)],
            thursday(),
        );
        assert_eq!(outcome.per_item_discounts.len(), 2);
        assert_eq!(outcome.total, Money::from_won(280_000));
    }

    #[test]
    fn test_bulk_overrides_per_item() {
        let outcome = discount(
            &[LineItem::new(ids::SPEAKER, 10), LineItem::new(ids::KEYBOARD, 20)],
            thursday(),
        );
        assert_eq!(outcome.branch, DiscountBranch::Bulk);
        assert!(outcome.per_item_discounts.is_empty());
        assert_eq!(outcome.bulk_rate, Some(Rate::from_percent(25)));
        // (250_000 + 200_000) × 0.75
        assert_eq!(outcome.total, Money::from_won(337_500));
        assert!((outcome.discount_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_tuesday_multiplier_composes() {
        let outcome = discount(&[LineItem::new(ids::KEYBOARD, 30)], tuesday());
        assert!(outcome.is_special_day);
        assert!(outcome.special_day_applied);
        // 300_000 × 0.75 × 0.9
        assert_eq!(outcome.total, Money::from_won(202_500));
        assert!((outcome.discount_rate - 0.325).abs() < 1e-9);
    }

    #[test]
    fn test_tuesday_multiplier_on_per_item_total() {
        let outcome = discount(&[LineItem::new(ids::MOUSE, 10)], tuesday());
        assert_eq!(outcome.branch, DiscountBranch::PerItem);
        assert!(outcome.special_day_applied);
        assert_eq!(outcome.per_item_discounts.len(), 1);
        // 200_000 × 0.85 × 0.9
        assert_eq!(outcome.total, Money::from_won(153_000));
        assert!((outcome.discount_rate - 0.235).abs() < 1e-9);
    }

    #[test]
    fn test_rate_recomputed_not_accumulated() {
        let rules = DiscountRules::default();
        let cart = Catalog::seeded().price_lines(&[LineItem::new(ids::MOUSE, 3)]);
        let first = rules.evaluate(&cart, tuesday());
        let second = rules.evaluate(&cart, tuesday());
        assert_eq!(first, second);
        assert!((first.discount_rate - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_special_day_skipped_for_empty_subtotal() {
        let outcome = discount(&[], tuesday());
        assert!(outcome.is_special_day);
        assert!(!outcome.special_day_applied);
        assert_eq!(outcome.total, Money::zero());
        assert_eq!(outcome.discount_rate, 0.0);
    }

    #[test]
    fn test_rounding_only_at_the_end() {
        let mut catalog = Catalog::seeded();
        catalog.set_price(ids::KEYBOARD, Money::from_won(10_005)).unwrap();
        let outcome = DiscountRules::default().compute_discount(
            &[LineItem::new(ids::KEYBOARD, 1)],
            &catalog,
            tuesday(),
        );
        // 10_005 × 0.9 = 9_004.5 → 9_005
        assert_eq!(outcome.total, Money::from_won(9_005));
    }

    #[test]
    fn test_custom_rule_pipeline() {
        struct Nothing;
        impl DiscountRule for Nothing {
            fn name(&self) -> &'static str {
                "nothing"
            }
            fn evaluate(&self, _: &DiscountContext<'_>, _: ExactAmount) -> RuleEffect {
                RuleEffect::NoEffect
            }
        }

        let rules = DiscountRules::with_rules(DiscountPolicy::default(), vec![Arc::new(Nothing)]);
        let items = [LineItem::new(ids::KEYBOARD, 40)];
        let outcome = rules.compute_discount(&items, &Catalog::seeded(), tuesday());
        assert_eq!(outcome.total, Money::from_won(400_000));
        assert_eq!(outcome.branch, DiscountBranch::None);
    }

    #[test]
    fn test_policy_validation() {
        assert!(DiscountPolicy::default().validate().is_ok());

        let mut policy = DiscountPolicy::default();
        policy.bulk_rate = Rate::from_bps(12_000);
        assert!(policy.validate().is_err());

        let mut policy = DiscountPolicy::default();
        policy.item_threshold = 0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_deserializes_partial_table() {
        let policy: DiscountPolicy = serde_json::from_str(r#"{"bulk_threshold": 40}"#).unwrap();
        assert_eq!(policy.bulk_threshold, 40);
        assert_eq!(policy.item_rate(ids::SPEAKER), Rate::from_percent(25));
        assert_eq!(policy.item_rate("nope"), Rate::zero());
    }
}
