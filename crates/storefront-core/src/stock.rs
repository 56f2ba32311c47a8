//! # Stock Report
//!
//! Low-stock warnings per product and an overall stock level for the
//! product selector.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;

/// Products below this stock get a warning line.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Total stock below this is a warning.
pub const TOTAL_STOCK_WARNING: u64 = 50;

/// Total stock below this is critical.
pub const TOTAL_STOCK_CRITICAL: u64 = 30;

/// Overall stock level across the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockLevel {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl StockLevel {
    pub fn from_total(total: u64) -> Self {
        if total < TOTAL_STOCK_CRITICAL {
            StockLevel::Critical
        } else if total < TOTAL_STOCK_WARNING {
            StockLevel::Warning
        } else {
            StockLevel::Normal
        }
    }
}

/// A single product's low-stock line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockWarning {
    pub product_id: String,
    pub name: String,
    pub stock: u32,
}

impl StockWarning {
    /// `"<name>: low stock (N left)"` or `"<name>: sold out"`.
    pub fn message(&self) -> String {
        if self.stock == 0 {
            format!("{}: sold out", self.name)
        } else {
            format!("{}: low stock ({} left)", self.name, self.stock)
        }
    }
}

/// Stock state of the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockReport {
    pub warnings: Vec<StockWarning>,
    pub total_stock: u64,
    pub level: StockLevel,
}

impl StockReport {
    /// Builds the report from the catalog in display order.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let warnings = catalog
            .products()
            .iter()
            .filter(|p| p.stock < LOW_STOCK_THRESHOLD)
            .map(|p| StockWarning {
                product_id: p.id.clone(),
                name: p.name.clone(),
                stock: p.stock,
            })
            .collect();
        let total_stock = catalog.total_stock();

        StockReport {
            warnings,
            total_stock,
            level: StockLevel::from_total(total_stock),
        }
    }

    /// Warning messages joined one per line.
    pub fn message(&self) -> String {
        self.warnings
            .iter()
            .map(StockWarning::message)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ids;

    #[test]
    fn test_seed_catalog_report() {
        let report = StockReport::from_catalog(&Catalog::seeded());
        assert_eq!(report.total_stock, 110);
        assert_eq!(report.level, StockLevel::Normal);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.message(), "Error-Proof Laptop Pouch: sold out");
    }

    #[test]
    fn test_low_stock_line() {
        let mut catalog = Catalog::seeded();
        catalog.adjust_stock(ids::SPEAKER, -7).unwrap();
        let report = StockReport::from_catalog(&catalog);
        assert!(report.message().contains("Lo-Fi Coding Speaker: low stock (3 left)"));
    }

    #[test]
    fn test_levels() {
        assert_eq!(StockLevel::from_total(50), StockLevel::Normal);
        assert_eq!(StockLevel::from_total(49), StockLevel::Warning);
        assert_eq!(StockLevel::from_total(30), StockLevel::Warning);
        assert_eq!(StockLevel::from_total(29), StockLevel::Critical);
    }
}
