//! # Money Module
//!
//! Provides the `Money` type for handling ₩ amounts safely, the `Rate` type
//! for percentages, and `ExactAmount` for composing discounts without
//! losing precision before the final rounding.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  subtotal × 0.75 × 0.9 in floating point can land on 67499.99999...    │
//! │  and round the wrong way.                                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer ₩ + exact intermediates                          │
//! │    Money        whole won (i64)                                         │
//! │    Rate         basis points (1000 = 10%)                               │
//! │    ExactAmount  won × 10^8 (i128) while rules compose                  │
//! │    Only the final total is rounded (half-up) back to Money             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::{Money, Rate};
//!
//! let price = Money::from_won(10_000);
//! let line = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line.won(), 30_000);
//!
//! // 20% off, rounded half-up
//! assert_eq!(price.reduced_by(Rate::from_percent(20)).won(), 8_000);
//! assert_eq!(format!("{}", line), "₩30,000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// Basis points in 100%.
pub const BPS_SCALE: u32 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole won (₩ has no minor unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: saved-amount differences may be negative in arithmetic
/// - **Single field tuple struct**: serializes as a bare JSON number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole won.
    #[inline]
    pub const fn from_won(won: i64) -> Self {
        Money(won)
    }

    /// Returns the value in whole won.
    #[inline]
    pub const fn won(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_won(25_000);
    /// assert_eq!(unit_price.checked_mul_quantity(4).unwrap().won(), 100_000);
    /// assert!(Money::from_won(i64::MAX).checked_mul_quantity(2).is_none());
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(qty)).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns the price after taking `rate` off, rounded half-up to whole won.
    ///
    /// This is how sale prices are derived: `round(price × (100 − pct) / 100)`.
    ///
    /// ```rust
    /// use storefront_core::money::{Money, Rate};
    ///
    /// // 25,000 × 0.95 = 23,750
    /// assert_eq!(Money::from_won(25_000).reduced_by(Rate::from_percent(5)).won(), 23_750);
    /// // 15,010 × 0.95 = 14,259.5 → 14,260
    /// assert_eq!(Money::from_won(15_010).reduced_by(Rate::from_percent(5)).won(), 14_260);
    /// ```
    pub fn reduced_by(&self, rate: Rate) -> Money {
        ExactAmount::from_money(*self)
            .scaled_by_complement(rate)
            .round_half_up()
    }
}

/// Formats as `₩12,345` (thousands separators, as the widget displays it).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₩{}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. Every rate in the rule tables is a whole percent,
/// but basis points keep the door open for 12.5% promotions without floats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`10` → 10%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `100% − self`, saturating at zero.
    #[inline]
    pub const fn complement_bps(&self) -> u32 {
        BPS_SCALE.saturating_sub(self.0)
    }
}

impl Add for Rate {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Rate(self.0 + other.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{:.2}%", self.percent())
        }
    }
}

// =============================================================================
// Exact Amount
// =============================================================================

/// Units of `ExactAmount` per won.
const EXACT_SCALE: i128 = 100_000_000;

/// A ₩ amount carried at 10^-8 won precision while discount rules compose.
///
/// Two basis-point factors fit exactly into the scale, which covers every
/// rule combination the pipeline produces (one reduction step followed by the
/// special-day multiplier). Deeper chains round half-up at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ExactAmount(i128);

impl ExactAmount {
    /// Lifts whole won into the exact representation.
    #[inline]
    pub const fn from_money(money: Money) -> Self {
        ExactAmount(money.0 as i128 * EXACT_SCALE)
    }

    #[inline]
    pub const fn zero() -> Self {
        ExactAmount(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `self × rate`: the reduction a rate takes off this amount.
    pub fn portion(&self, rate: Rate) -> ExactAmount {
        ExactAmount(div_round_half_up(self.0 * rate.bps() as i128, BPS_SCALE as i128))
    }

    /// `self × (100% − rate)`.
    pub fn scaled_by_complement(&self, rate: Rate) -> ExactAmount {
        ExactAmount(div_round_half_up(
            self.0 * rate.complement_bps() as i128,
            BPS_SCALE as i128,
        ))
    }

    /// Rounds half-up to whole won.
    pub fn round_half_up(&self) -> Money {
        Money(div_round_half_up(self.0, EXACT_SCALE) as i64)
    }

    /// `self / other` as a display fraction; `0.0` when `other` is zero.
    pub fn ratio_to(&self, other: ExactAmount) -> f64 {
        if other.0 == 0 {
            return 0.0;
        }
        self.0 as f64 / other.0 as f64
    }
}

impl Sub for ExactAmount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        ExactAmount(self.0 - other.0)
    }
}

impl Add for ExactAmount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        ExactAmount(self.0 + other.0)
    }
}

impl Sum for ExactAmount {
    fn sum<I: Iterator<Item = ExactAmount>>(iter: I) -> Self {
        iter.fold(ExactAmount::zero(), Add::add)
    }
}

/// Integer division rounding half away from negative infinity (half-up).
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    (numerator + denominator / 2).div_euclid(denominator)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(format!("{}", Money::from_won(0)), "₩0");
        assert_eq!(format!("{}", Money::from_won(999)), "₩999");
        assert_eq!(format!("{}", Money::from_won(1_000)), "₩1,000");
        assert_eq!(format!("{}", Money::from_won(1_234_567)), "₩1,234,567");
        assert_eq!(format!("{}", Money::from_won(-45_000)), "-₩45,000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_won(1_000);
        let b = Money::from_won(500);

        assert_eq!((a + b).won(), 1_500);
        assert_eq!((a - b).won(), 500);
        assert_eq!(a.checked_mul_quantity(3).unwrap().won(), 3_000);
        assert_eq!(a.checked_add(b).unwrap().won(), 1_500);
        assert!(Money::from_won(i64::MAX).checked_add(b).is_none());
        assert_eq!(vec![a, b, b].into_iter().sum::<Money>().won(), 2_000);
    }

    #[test]
    fn test_reduced_by_rounds_half_up() {
        // 10,000 × 0.8
        assert_eq!(Money::from_won(10_000).reduced_by(Rate::from_percent(20)).won(), 8_000);
        // 12,345 × 0.8 = 9,876.0
        assert_eq!(Money::from_won(12_345).reduced_by(Rate::from_percent(20)).won(), 9_876);
        // 10 × 0.95 = 9.5 → 10
        assert_eq!(Money::from_won(10).reduced_by(Rate::from_percent(5)).won(), 10);
        // 30 × 0.95 = 28.5 → 29
        assert_eq!(Money::from_won(30).reduced_by(Rate::from_percent(5)).won(), 29);
    }

    #[test]
    fn test_rate_conversions() {
        let rate = Rate::from_percent(25);
        assert_eq!(rate.bps(), 2_500);
        assert!((rate.percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(rate.complement_bps(), 7_500);
        assert_eq!(format!("{}", rate), "25%");
        assert_eq!(format!("{}", Rate::from_bps(1_250)), "12.50%");
        assert_eq!((Rate::from_percent(20) + Rate::from_percent(5)).bps(), 2_500);
    }

    #[test]
    fn test_exact_amount_composes_without_drift() {
        // 90,000 × 0.75 × 0.9 = 60,750 exactly
        let subtotal = ExactAmount::from_money(Money::from_won(90_000));
        let bulk = subtotal.scaled_by_complement(Rate::from_percent(25));
        let tuesday = bulk.scaled_by_complement(Rate::from_percent(10));
        assert_eq!(tuesday.round_half_up().won(), 60_750);
    }

    #[test]
    fn test_exact_amount_rounding_boundary() {
        // 5 won × 0.9 = 4.5 → 5
        let five = ExactAmount::from_money(Money::from_won(5));
        assert_eq!(five.scaled_by_complement(Rate::from_percent(10)).round_half_up().won(), 5);
        // 3 won × 0.85 = 2.55 → 3
        let three = ExactAmount::from_money(Money::from_won(3));
        assert_eq!(three.scaled_by_complement(Rate::from_percent(15)).round_half_up().won(), 3);
    }

    #[test]
    fn test_ratio_guards_zero_denominator() {
        let amount = ExactAmount::from_money(Money::from_won(100));
        assert_eq!(amount.ratio_to(ExactAmount::zero()), 0.0);
        let half = ExactAmount::from_money(Money::from_won(50));
        assert!((half.ratio_to(amount) - 0.5).abs() < f64::EPSILON);
    }
}
