//! # Cart Session
//!
//! The shopper's cart: ordered line items plus the last product they picked.
//! Every cart operation keeps catalog stock in step: units in the cart are
//! units taken out of stock.
//!
//! ## Quantity Change Decision
//! ```text
//! new = current + delta
//!   new > 0 and new ≤ stock + current  →  line = new, stock −= delta
//!   new ≤ 0                            →  line removed, stock += current
//!   otherwise                          →  InsufficientStock (nothing changes)
//! ```
//!
//! The catalog is always mutated first; the cart only changes once that
//! succeeded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::types::LineItem;
use crate::validation::validate_quantity;

/// What a cart operation left behind for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChange {
    pub product_id: String,
    /// Quantity now in the cart; 0 when the line was removed.
    pub quantity: u32,
    /// Catalog stock after the change.
    pub stock_left: u32,
}

/// Line items in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<LineItem>,
    last_selected: Option<String>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Quantity of `product_id` in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.line(product_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// The product most recently added with [`Cart::add_product`].
    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    /// Adds one unit of `product_id`, taking it out of stock.
    pub fn add_product(
        &mut self,
        catalog: &mut Catalog,
        product_id: &str,
    ) -> CoreResult<CartChange> {
        let product = catalog.get(product_id)?;
        if !product.in_stock() {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: 0,
                requested: 1,
            });
        }
        let quantity = self.quantity_of(product_id) + 1;
        validate_quantity(quantity)?;

        let updated = catalog.adjust_stock(product_id, -1)?;
        self.set_quantity(product_id, quantity);
        self.last_selected = Some(product_id.to_string());

        debug!(product_id, quantity, stock_left = updated.stock, "Added to cart");
        Ok(CartChange {
            product_id: product_id.to_string(),
            quantity,
            stock_left: updated.stock,
        })
    }

    /// Changes a line's quantity by `delta` (the cart "+"/"−" buttons).
    pub fn change_quantity(
        &mut self,
        catalog: &mut Catalog,
        product_id: &str,
        delta: i64,
    ) -> CoreResult<CartChange> {
        let current = self
            .line(product_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        let stock = catalog.get(product_id)?.stock;
        let insufficient = || CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available: stock,
            requested: u32::try_from(delta).unwrap_or(u32::MAX),
        };
        let new_quantity = i64::from(current)
            .checked_add(delta)
            .ok_or_else(insufficient)?;

        if new_quantity <= 0 {
            return self.remove_product(catalog, product_id);
        }

        if new_quantity > i64::from(stock) + i64::from(current) {
            return Err(insufficient());
        }

        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        validate_quantity(quantity)?;

        let updated = catalog.adjust_stock(product_id, -delta)?;
        self.set_quantity(product_id, quantity);

        debug!(product_id, quantity, stock_left = updated.stock, "Cart quantity changed");
        Ok(CartChange {
            product_id: product_id.to_string(),
            quantity,
            stock_left: updated.stock,
        })
    }

    /// Removes a line entirely, returning its units to stock.
    pub fn remove_product(
        &mut self,
        catalog: &mut Catalog,
        product_id: &str,
    ) -> CoreResult<CartChange> {
        let current = self
            .line(product_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        let updated = catalog.adjust_stock(product_id, current as i64)?;
        self.lines.retain(|l| l.product_id != product_id);

        debug!(product_id, returned = current, stock_left = updated.stock, "Removed from cart");
        Ok(CartChange {
            product_id: product_id.to_string(),
            quantity: 0,
            stock_left: updated.stock,
        })
    }

    /// Empties the cart, returning every unit to stock.
    pub fn clear(&mut self, catalog: &mut Catalog) -> CoreResult<()> {
        let ids: Vec<String> = self.lines.iter().map(|l| l.product_id.clone()).collect();
        for id in ids {
            self.remove_product(catalog, &id)?;
        }
        self.last_selected = None;
        Ok(())
    }

    fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(LineItem::new(product_id, quantity)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ids;

    fn stock_of(catalog: &Catalog, id: &str) -> u32 {
        catalog.get(id).unwrap().stock
    }

    #[test]
    fn test_add_product_takes_stock() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();

        cart.add_product(&mut catalog, ids::KEYBOARD).unwrap();
        let change = cart.add_product(&mut catalog, ids::KEYBOARD).unwrap();

        assert_eq!(change.quantity, 2);
        assert_eq!(change.stock_left, 48);
        assert_eq!(cart.line_items().len(), 1);
        assert_eq!(cart.last_selected(), Some(ids::KEYBOARD));
    }

    #[test]
    fn test_add_sold_out_product_fails() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();

        let err = cart.add_product(&mut catalog, ids::LAPTOP_POUCH).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.last_selected(), None);
    }

    #[test]
    fn test_add_unknown_product_fails() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        let err = cart.add_product(&mut catalog, "p42").unwrap_err();
        assert_eq!(err, CoreError::InvalidProduct("p42".to_string()));
    }

    #[test]
    fn test_change_quantity_up_and_down() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_product(&mut catalog, ids::SPEAKER).unwrap();

        cart.change_quantity(&mut catalog, ids::SPEAKER, 4).unwrap();
        assert_eq!(cart.quantity_of(ids::SPEAKER), 5);
        assert_eq!(stock_of(&catalog, ids::SPEAKER), 5);

        cart.change_quantity(&mut catalog, ids::SPEAKER, -2).unwrap();
        assert_eq!(cart.quantity_of(ids::SPEAKER), 3);
        assert_eq!(stock_of(&catalog, ids::SPEAKER), 7);
    }

    #[test]
    fn test_change_quantity_beyond_stock_is_rejected() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_product(&mut catalog, ids::SPEAKER).unwrap();

        // 1 in cart, 9 left: at most +9
        let err = cart.change_quantity(&mut catalog, ids::SPEAKER, 10).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 9, .. }));
        assert_eq!(cart.quantity_of(ids::SPEAKER), 1);
        assert_eq!(stock_of(&catalog, ids::SPEAKER), 9);

        cart.change_quantity(&mut catalog, ids::SPEAKER, 9).unwrap();
        assert_eq!(stock_of(&catalog, ids::SPEAKER), 0);
    }

    #[test]
    fn test_change_quantity_huge_delta_is_rejected() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_product(&mut catalog, ids::KEYBOARD).unwrap();
        let before = catalog.clone();

        let err = cart.change_quantity(&mut catalog, ids::KEYBOARD, i64::MAX).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 49, .. }));
        assert_eq!(cart.quantity_of(ids::KEYBOARD), 1);
        assert_eq!(catalog, before);

        // a huge negative delta just removes the line
        let change = cart.change_quantity(&mut catalog, ids::KEYBOARD, i64::MIN).unwrap();
        assert_eq!(change.quantity, 0);
        assert_eq!(stock_of(&catalog, ids::KEYBOARD), 50);
    }

    #[test]
    fn test_change_quantity_to_zero_removes_line() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_product(&mut catalog, ids::MOUSE).unwrap();
        cart.add_product(&mut catalog, ids::MOUSE).unwrap();

        let change = cart.change_quantity(&mut catalog, ids::MOUSE, -5).unwrap();
        assert_eq!(change.quantity, 0);
        assert!(cart.is_empty());
        assert_eq!(stock_of(&catalog, ids::MOUSE), 30);
    }

    #[test]
    fn test_remove_and_clear_restore_stock() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_product(&mut catalog, ids::KEYBOARD).unwrap();
        cart.add_product(&mut catalog, ids::MONITOR_ARM).unwrap();
        cart.add_product(&mut catalog, ids::MONITOR_ARM).unwrap();
        assert_eq!(cart.total_quantity(), 3);

        cart.remove_product(&mut catalog, ids::KEYBOARD).unwrap();
        assert_eq!(stock_of(&catalog, ids::KEYBOARD), 50);

        cart.clear(&mut catalog).unwrap();
        assert!(cart.is_empty());
        assert_eq!(catalog, Catalog::seeded());
    }

    #[test]
    fn test_remove_missing_line() {
        let mut catalog = Catalog::seeded();
        let mut cart = Cart::new();
        let err = cart.remove_product(&mut catalog, ids::MOUSE).unwrap_err();
        assert_eq!(err, CoreError::NotInCart(ids::MOUSE.to_string()));
    }
}
