//! # Store
//!
//! The catalog and the cart session, owned together. Promotions read the cart
//! (the suggested sale needs the last-selected product) while mutating the
//! catalog, so both live behind one lock when shared.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::calculator::{CartCalculationResult, CartCalculator};
use crate::cart::Cart;
use crate::catalog::Catalog;

/// Shared handle used by the promotion scheduler and its host.
///
/// Hold the lock only for synchronous work; never across an `.await`.
pub type SharedStore = Arc<Mutex<Store>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub catalog: Catalog,
    pub cart: Cart,
}

impl Store {
    pub fn new(catalog: Catalog) -> Self {
        Store {
            catalog,
            cart: Cart::new(),
        }
    }

    /// Seed catalog with an empty cart.
    pub fn seeded() -> Self {
        Store::new(Catalog::seeded())
    }

    /// Wraps the store for sharing across tasks.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Calculates the current cart.
    pub fn calculate(&self, calculator: &CartCalculator) -> CartCalculationResult {
        calculator.calculate(&self.catalog, self.cart.line_items())
    }

    /// Adds one unit of a product to the cart.
    pub fn add_to_cart(&mut self, product_id: &str) -> crate::CoreResult<crate::CartChange> {
        self.cart.add_product(&mut self.catalog, product_id)
    }
}
