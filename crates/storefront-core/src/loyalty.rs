//! # Loyalty Rules
//!
//! Points accrued for a finalized order.
//!
//! ```text
//! base        = floor(total / 1000)
//! special day : base contribution becomes base × 2 (replaces, never adds)
//! combos      : keyboard+mouse +50, keyboard+mouse+monitor arm a further +100
//! quantity    : highest tier wins, ≥30 +100 / ≥20 +50 / ≥10 +20
//! total       = adjusted base + combos + quantity
//! ```
//!
//! Detail lines come out in a fixed order (special day or base, combos,
//! quantity); the presentation layer joins them as-is.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::ids;
use crate::clock::{day_name, is_one_of, Clock, SystemClock};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::LineItem;
use crate::validation::ValidationResult;

// =============================================================================
// Policy
// =============================================================================

/// A quantity bonus tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityTier {
    /// Minimum total item count, inclusive.
    pub threshold: u32,
    pub bonus: u64,
}

/// Point rules, loaded from the `[loyalty]` table of the host config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyPolicy {
    /// ₩ per base point.
    pub points_unit: i64,
    /// Base-point multiplier on special days.
    pub special_multiplier: u64,
    pub special_days: Vec<Weekday>,
    /// Bonus for keyboard and mouse together.
    pub keyboard_mouse_bonus: u64,
    /// Further bonus for keyboard, mouse and monitor arm together.
    pub full_set_bonus: u64,
    pub quantity_tiers: Vec<QuantityTier>,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        LoyaltyPolicy {
            points_unit: 1_000,
            special_multiplier: 2,
            special_days: vec![Weekday::Tue],
            keyboard_mouse_bonus: 50,
            full_set_bonus: 100,
            quantity_tiers: vec![
                QuantityTier { threshold: 30, bonus: 100 },
                QuantityTier { threshold: 20, bonus: 50 },
                QuantityTier { threshold: 10, bonus: 20 },
            ],
        }
    }
}

impl LoyaltyPolicy {
    /// Validates the policy.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.points_unit <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "loyalty.points_unit".to_string(),
            });
        }
        if self.special_multiplier == 0 {
            return Err(ValidationError::MustBePositive {
                field: "loyalty.special_multiplier".to_string(),
            });
        }
        if self.quantity_tiers.iter().any(|t| t.threshold == 0) {
            return Err(ValidationError::MustBePositive {
                field: "loyalty.quantity_tiers.threshold".to_string(),
            });
        }

        // A higher tier must never pay less than a lower one.
        let mut tiers = self.quantity_tiers.clone();
        tiers.sort_by_key(|t| t.threshold);
        for pair in tiers.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            if lower.threshold == higher.threshold {
                return Err(ValidationError::NotOrdered {
                    field: "loyalty.quantity_tiers".to_string(),
                    reason: format!("threshold {} appears twice", higher.threshold),
                });
            }
            if higher.bonus < lower.bonus {
                return Err(ValidationError::NotOrdered {
                    field: "loyalty.quantity_tiers".to_string(),
                    reason: format!(
                        "{}+ items pays {}p, less than {}p at {}+",
                        higher.threshold, higher.bonus, lower.bonus, lower.threshold
                    ),
                });
            }
        }
        Ok(())
    }

    /// The highest tier `item_count` reaches, if any.
    pub fn tier_for(&self, item_count: u32) -> Option<QuantityTier> {
        self.quantity_tiers
            .iter()
            .filter(|t| item_count >= t.threshold)
            .max_by_key(|t| t.threshold)
            .copied()
    }
}

// =============================================================================
// Result
// =============================================================================

/// Points breakdown for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoyaltyResult {
    /// `floor(total / points_unit)`.
    pub base_points: u64,
    /// Extra points from the special-day multiplier.
    pub special_day_bonus: u64,
    pub combo_bonus: u64,
    pub quantity_bonus: u64,
    pub total_points: u64,
    pub detail_lines: Vec<String>,
}

// =============================================================================
// Loyalty Rules
// =============================================================================

/// Computes points for finalized orders.
#[derive(Clone)]
pub struct LoyaltyRules {
    policy: LoyaltyPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LoyaltyRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoyaltyRules").field("policy", &self.policy).finish()
    }
}

impl Default for LoyaltyRules {
    fn default() -> Self {
        LoyaltyRules::new(LoyaltyPolicy::default(), Arc::new(SystemClock))
    }
}

impl LoyaltyRules {
    pub fn new(policy: LoyaltyPolicy, clock: Arc<dyn Clock>) -> Self {
        LoyaltyRules { policy, clock }
    }

    pub fn policy(&self) -> &LoyaltyPolicy {
        &self.policy
    }

    /// Computes points using the injected clock.
    pub fn compute_points(
        &self,
        total: Money,
        item_count: u32,
        items: &[LineItem],
    ) -> LoyaltyResult {
        self.compute_points_on(total, item_count, items, self.clock.today())
    }

    /// Computes points as of `today`.
    ///
    /// An empty `items` slice yields all zeros, whatever `total` says.
    pub fn compute_points_on(
        &self,
        total: Money,
        item_count: u32,
        items: &[LineItem],
        today: NaiveDate,
    ) -> LoyaltyResult {
        if items.is_empty() {
            return LoyaltyResult::default();
        }

        let policy = &self.policy;
        let mut detail_lines = Vec::new();

        let base_points = u64::try_from(total.won().div_euclid(policy.points_unit)).unwrap_or(0);

        let special_day_bonus = if is_one_of(today, &policy.special_days) && base_points > 0 {
            let days: Vec<&str> = policy.special_days.iter().map(|d| day_name(*d)).collect();
            detail_lines.push(format!("{} {}x", days.join(", "), policy.special_multiplier));
            base_points.saturating_mul(policy.special_multiplier.saturating_sub(1))
        } else {
            if base_points > 0 {
                detail_lines.push(format!("base: {}p", base_points));
            }
            0
        };

        let has = |id: &str| items.iter().any(|item| item.product_id == id);
        let mut combo_bonus: u64 = 0;
        if has(ids::KEYBOARD) && has(ids::MOUSE) {
            combo_bonus = combo_bonus.saturating_add(policy.keyboard_mouse_bonus);
            detail_lines.push(format!("keyboard+mouse set +{}p", policy.keyboard_mouse_bonus));

            if has(ids::MONITOR_ARM) {
                combo_bonus = combo_bonus.saturating_add(policy.full_set_bonus);
                detail_lines.push(format!("full set +{}p", policy.full_set_bonus));
            }
        }

        let quantity_bonus = match policy.tier_for(item_count) {
            Some(tier) => {
                detail_lines.push(format!(
                    "bulk purchase ({}+ items) +{}p",
                    tier.threshold, tier.bonus
                ));
                tier.bonus
            }
            None => 0,
        };

        LoyaltyResult {
            base_points,
            special_day_bonus,
            combo_bonus,
            quantity_bonus,
            total_points: base_points
                .saturating_add(special_day_bonus)
                .saturating_add(combo_bonus)
                .saturating_add(quantity_bonus),
            detail_lines,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
