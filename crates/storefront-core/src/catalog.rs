//! # Catalog
//!
//! The product store. Holds every [`Product`] record for the lifetime of the
//! process; products are never deleted (sold out is a state).
//!
//! ## Mutation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Whole-Record Replacement                             │
//! │                                                                         │
//! │   adjust_stock / set_price / set_sale_flags / apply_*_sale             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   replace_with(id, |current| -> Result<Product>)                       │
//! │        │                                                                │
//! │        ├── unknown id      → Err(InvalidProduct)     (nothing changes) │
//! │        ├── closure fails   → Err(..)                 (nothing changes) │
//! │        └── closure returns → slot = new record, Ok(new record)         │
//! │                                                                         │
//! │   A reader holding &Catalog never sees a half-updated product.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Rate};
use crate::types::{LineItem, PricedCart, Product, ResolvedLine, SaleFlagUpdate};
use crate::validation::{validate_price, validate_product_id, validate_quantity, validate_rate};

/// Product ids of the fixed seed catalog.
pub mod ids {
    pub const KEYBOARD: &str = "p1";
    pub const MOUSE: &str = "p2";
    pub const MONITOR_ARM: &str = "p3";
    pub const LAPTOP_POUCH: &str = "p4";
    pub const SPEAKER: &str = "p5";
}

/// In-memory product store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates a catalog from product records, in display order.
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// The storefront's fixed startup catalog.
    pub fn seeded() -> Self {
        Catalog::new(vec![
            Product::new(ids::KEYBOARD, "Bug-Zapping Keyboard", Money::from_won(10_000), 50),
            Product::new(ids::MOUSE, "Productivity Mouse", Money::from_won(20_000), 30),
            Product::new(ids::MONITOR_ARM, "Posture Monitor Arm", Money::from_won(30_000), 20),
            Product::new(ids::LAPTOP_POUCH, "Error-Proof Laptop Pouch", Money::from_won(15_000), 0),
            Product::new(ids::SPEAKER, "Lo-Fi Coding Speaker", Money::from_won(25_000), 10),
        ])
    }

    /// All products in display order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by id.
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by id, failing with `InvalidProduct`.
    pub fn get(&self, id: &str) -> CoreResult<&Product> {
        self.find_by_id(id)
            .ok_or_else(|| CoreError::InvalidProduct(id.to_string()))
    }

    /// Units in stock across every product.
    pub fn total_stock(&self) -> u64 {
        self.products.iter().map(|p| p.stock as u64).sum()
    }

    /// Prices line items at current prices.
    ///
    /// A line is skipped and listed in `skipped_product_ids` when
    /// - the product is unknown
    /// - the quantity is outside `1..=MAX_ITEM_QUANTITY`
    /// - its amount would overflow the running totals
    ///
    /// Skipped lines never fail the whole cart. Reads only.
    pub fn price_lines(&self, items: &[LineItem]) -> PricedCart {
        let mut priced = PricedCart::default();

        for item in items {
            let Some(product) = self.find_by_id(&item.product_id) else {
                warn!(product_id = %item.product_id, "Skipping line for unknown product");
                priced.skipped_product_ids.push(item.product_id.clone());
                continue;
            };

            if validate_quantity(item.quantity).is_err() {
                warn!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    "Skipping line with out-of-range quantity"
                );
                priced.skipped_product_ids.push(item.product_id.clone());
                continue;
            }

            let totals = product
                .current_price
                .checked_mul_quantity(item.quantity)
                .and_then(|line_total| {
                    let subtotal = priced.subtotal.checked_add(line_total)?;
                    let item_count = priced.item_count.checked_add(item.quantity)?;
                    Some((line_total, subtotal, item_count))
                });
            let Some((line_total, subtotal, item_count)) = totals else {
                warn!(product_id = %item.product_id, "Skipping line that overflows the cart total");
                priced.skipped_product_ids.push(item.product_id.clone());
                continue;
            };

            priced.subtotal = subtotal;
            priced.item_count = item_count;
            priced.lines.push(ResolvedLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.current_price,
                quantity: item.quantity,
                line_total,
            });
        }

        priced
    }

    /// Adds `delta` to a product's stock (negative to take units out).
    ///
    /// Fails with `InsufficientStock` if the result would be negative; the
    /// record is left untouched in that case.
    pub fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<Product> {
        self.replace_with(id, |current| {
            let new_stock = i64::from(current.stock)
                .checked_add(delta)
                .ok_or_else(stock_out_of_range)?;
            if new_stock < 0 {
                return Err(CoreError::InsufficientStock {
                    product_id: current.id.clone(),
                    available: current.stock,
                    requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
                });
            }
            let stock = u32::try_from(new_stock).map_err(|_| stock_out_of_range())?;
            Ok(Product {
                stock,
                ..current.clone()
            })
        })
    }

    /// Sets the price charged for a product.
    ///
    /// With no sale running the list price moves too, so the price invariant
    /// holds; during a sale only the current price changes.
    pub fn set_price(&mut self, id: &str, price: Money) -> CoreResult<Product> {
        validate_price(price)?;
        self.replace_with(id, |current| {
            let original_price = if current.is_discounted() {
                current.original_price
            } else {
                price
            };
            Ok(Product {
                current_price: price,
                original_price,
                ..current.clone()
            })
        })
    }

    /// Updates sale flags. Clearing the last flag restores the list price.
    pub fn set_sale_flags(&mut self, id: &str, update: SaleFlagUpdate) -> CoreResult<Product> {
        self.replace_with(id, |current| {
            let mut next = current.clone();
            if let Some(flash) = update.on_flash_sale {
                next.on_flash_sale = flash;
            }
            if let Some(suggested) = update.on_suggested_sale {
                next.on_suggested_sale = suggested;
            }
            if !next.is_discounted() {
                next.current_price = next.original_price;
            }
            Ok(next)
        })
    }

    /// Starts a flash sale: price becomes `original × (1 − rate)`.
    pub fn apply_flash_sale(&mut self, id: &str, rate: Rate) -> CoreResult<Product> {
        validate_rate("flash sale rate", rate)?;
        self.replace_with(id, |current| {
            Ok(Product {
                current_price: current.original_price.reduced_by(rate),
                on_flash_sale: true,
                ..current.clone()
            })
        })
    }

    /// Starts a suggested-item discount: price becomes `current × (1 − rate)`,
    /// stacking on a running flash sale.
    pub fn apply_suggested_sale(&mut self, id: &str, rate: Rate) -> CoreResult<Product> {
        validate_rate("suggested sale rate", rate)?;
        self.replace_with(id, |current| {
            Ok(Product {
                current_price: current.current_price.reduced_by(rate),
                on_suggested_sale: true,
                ..current.clone()
            })
        })
    }

    /// Ends every sale on a product and restores its list price.
    pub fn clear_sales(&mut self, id: &str) -> CoreResult<Product> {
        self.set_sale_flags(
            id,
            SaleFlagUpdate {
                on_flash_sale: Some(false),
                on_suggested_sale: Some(false),
            },
        )
    }

    /// Builds the replacement record from the current one and swaps it in.
    fn replace_with<F>(&mut self, id: &str, build: F) -> CoreResult<Product>
    where
        F: FnOnce(&Product) -> CoreResult<Product>,
    {
        validate_product_id(id)?;
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::InvalidProduct(id.to_string()))?;

        let next = build(slot)?;
        debug!(
            product_id = %next.id,
            stock = next.stock,
            price = next.current_price.won(),
            flash = next.on_flash_sale,
            suggested = next.on_suggested_sale,
            "Product record replaced"
        );
        *slot = next.clone();
        Ok(next)
    }
}

fn stock_out_of_range() -> CoreError {
    ValidationError::OutOfRange {
        field: "stock".to_string(),
        min: 0,
        max: i64::from(u32::MAX),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
