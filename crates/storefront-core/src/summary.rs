//! # Order Summary
//!
//! Display-ready data derived from a [`CartCalculationResult`]: cart lines,
//! discount lines and the "you saved" figures. No markup is produced here;
//! [`OrderSummary::to_text`] is a plain-text rendering for terminals and logs.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calculator::CartCalculationResult;
use crate::clock::day_name;
use crate::discount::DiscountPolicy;
use crate::money::{Money, Rate};

/// One cart line in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummaryLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: Money,
}

/// A labelled discount shown under the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountLine {
    pub label: String,
    pub rate: Rate,
}

/// Savings block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountInfo {
    pub has_discount: bool,
    pub saved_amount: Money,
    /// Rate × 100, rounded to one decimal.
    pub discount_percentage: f64,
}

/// Everything the order summary panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: Money,
    /// Bulk line when bulk applied, otherwise one line per item discount.
    pub discount_lines: Vec<DiscountLine>,
    pub special_day_line: Option<DiscountLine>,
    pub discount_info: DiscountInfo,
    pub total: Money,
}

impl OrderSummary {
    pub fn build(result: &CartCalculationResult, policy: &DiscountPolicy) -> Self {
        let lines = result
            .lines
            .iter()
            .map(|l| SummaryLine {
                name: l.name.clone(),
                quantity: l.quantity,
                line_total: l.line_total,
            })
            .collect();

        let discount_lines = match result.bulk_rate {
            Some(rate) if result.bulk_discount_applied => vec![DiscountLine {
                label: format!("Bulk discount ({}+ items)", policy.bulk_threshold),
                rate,
            }],
            _ => result
                .per_item_discounts
                .iter()
                .map(|d| DiscountLine {
                    label: format!("{} ({}+)", d.name, policy.item_threshold),
                    rate: d.rate,
                })
                .collect(),
        };

        let special_day_line = result.special_day_applied.then(|| {
            let days: Vec<&str> = policy.special_days.iter().map(|d| day_name(*d)).collect();
            DiscountLine {
                label: format!("{} extra discount", days.join(", ")),
                rate: policy.special_rate,
            }
        });

        let discount_info = DiscountInfo {
            has_discount: result.has_discount() && result.total.is_positive(),
            saved_amount: result.saved_amount(),
            discount_percentage: (result.discount_rate * 1000.0).round() / 10.0,
        };

        OrderSummary {
            lines,
            subtotal: result.subtotal,
            discount_lines,
            special_day_line,
            discount_info,
            total: result.total,
        }
    }

    /// Nothing to show for an empty subtotal.
    pub fn should_render(&self) -> bool {
        self.subtotal.is_positive()
    }

    /// Plain-text rendering, one entry per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if !self.should_render() {
            return out;
        }

        for line in &self.lines {
            let _ = writeln!(out, "{} x {}  {}", line.name, line.quantity, line.line_total);
        }
        let _ = writeln!(out, "Subtotal  {}", self.subtotal);
        for discount in self.discount_lines.iter().chain(self.special_day_line.iter()) {
            let _ = writeln!(out, "{}  -{}", discount.label, discount.rate);
        }
        if self.discount_info.has_discount {
            let _ = writeln!(
                out,
                "Saved {} ({:.1}%)",
                self.discount_info.saved_amount, self.discount_info.discount_percentage
            );
        }
        let _ = write!(out, "Total  {}", self.total);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::CartCalculator;
    use crate::catalog::{ids, Catalog};
    use crate::types::LineItem;
    use chrono::NaiveDate;

    fn summarize(items: &[LineItem], y: i32, m: u32, d: u32) -> OrderSummary {
        let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let calculator = CartCalculator::default();
        let result = calculator.calculate_on(&Catalog::seeded(), items, today);
        OrderSummary::build(&result, calculator.rules().policy())
    }

    #[test]
    fn test_empty_cart_renders_nothing() {
        let summary = summarize(&[], 2026, 10, 15);
        assert!(!summary.should_render());
        assert_eq!(summary.to_text(), "");
        assert!(!summary.discount_info.has_discount);
    }

    #[test]
    fn test_per_item_lines() {
        let summary = summarize(&[LineItem::new(ids::MOUSE, 10)], 2026, 10, 15);
        assert_eq!(summary.discount_lines.len(), 1);
        assert_eq!(summary.discount_lines[0].label, "Productivity Mouse (10+)");
        assert_eq!(summary.discount_lines[0].rate, Rate::from_percent(15));
        assert!(summary.special_day_line.is_none());
        assert_eq!(summary.discount_info.saved_amount, Money::from_won(30_000));
        assert_eq!(summary.discount_info.discount_percentage, 15.0);
    }

    #[test]
    fn test_bulk_and_tuesday_lines() {
        // 2026-10-20 is a Tuesday
        let summary = summarize(&[LineItem::new(ids::KEYBOARD, 30)], 2026, 10, 20);
        assert_eq!(summary.discount_lines.len(), 1);
        assert_eq!(summary.discount_lines[0].label, "Bulk discount (30+ items)");
        let special = summary.special_day_line.as_ref().unwrap();
        assert_eq!(special.label, "Tuesday extra discount");
        assert_eq!(summary.discount_info.discount_percentage, 32.5);

        let text = summary.to_text();
        assert!(text.contains("Bug-Zapping Keyboard x 30  ₩300,000"));
        assert!(text.contains("Tuesday extra discount  -10%"));
        assert!(text.ends_with("Total  ₩202,500"));
    }
}
