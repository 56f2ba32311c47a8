//! # Promotions
//!
//! The two timed promotions of the storefront, expressed as synchronous
//! effects on a [`Store`]. The scheduler decides *when* to fire; a
//! [`Promotion`] decides *what* happens, so tests call [`Promotion::fire`]
//! directly with a seeded RNG and no timers.
//!
//! ## Effects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FlashSale (20%, list price)                                           │
//! │    pick a random product                                               │
//! │      sold out           → Skipped(OutOfStock)                          │
//! │      already on flash   → Skipped(AlreadyOnSale)                       │
//! │      otherwise          → price = original × 0.8, flag on, Applied     │
//! │                                                                         │
//! │  SuggestedSale (5%, current price)                                     │
//! │    cart empty           → Skipped(EmptyCart)                           │
//! │    nothing picked yet   → Skipped(NoSelection)                         │
//! │    first product that is not the last pick, in stock, not suggested    │
//! │      found              → price = current × 0.95, flag on, Applied     │
//! │      none               → Skipped(NoCandidate)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use storefront_core::{Money, Product, Rate, SaleBadge, Store};
use tracing::{debug, info};

use crate::error::PromoResult;

// =============================================================================
// Events
// =============================================================================

/// Which promotion produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionKind {
    FlashSale,
    SuggestedSale,
}

impl std::fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionKind::FlashSale => write!(f, "flash_sale"),
            PromotionKind::SuggestedSale => write!(f, "suggested_sale"),
        }
    }
}

/// An applied promotion, broadcast so the UI can alert and re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionEvent {
    pub kind: PromotionKind,
    pub product_id: String,
    pub name: String,
    pub rate: Rate,
    pub new_price: Money,
    pub original_price: Money,
    pub badge: SaleBadge,
}

impl PromotionEvent {
    fn from_product(kind: PromotionKind, rate: Rate, product: &Product) -> Self {
        PromotionEvent {
            kind,
            product_id: product.id.clone(),
            name: product.name.clone(),
            rate,
            new_price: product.current_price,
            original_price: product.original_price,
            badge: product.sale_badge(),
        }
    }

    /// The alert text shown to the shopper.
    pub fn message(&self) -> String {
        match self.kind {
            PromotionKind::FlashSale => {
                format!("⚡ Flash sale! {} is {} off!", self.name, self.rate)
            }
            PromotionKind::SuggestedSale => format!(
                "💝 How about {}? Buy now for an extra {} off!",
                self.name, self.rate
            ),
        }
    }
}

/// Why a tick left the catalog untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyCatalog,
    OutOfStock { product_id: String },
    AlreadyOnSale { product_id: String },
    EmptyCart,
    NoSelection,
    NoCandidate,
}

/// Result of one promotion tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    Applied(PromotionEvent),
    Skipped(SkipReason),
}

impl PromotionOutcome {
    pub fn event(&self) -> Option<&PromotionEvent> {
        match self {
            PromotionOutcome::Applied(event) => Some(event),
            PromotionOutcome::Skipped(_) => None,
        }
    }
}

// =============================================================================
// Promotion Trait
// =============================================================================

/// A promotion effect. Firing happens under the store lock, in one go.
pub trait Promotion: Send + Sync {
    fn kind(&self) -> PromotionKind;

    /// Applies the promotion once, or reports why it did nothing.
    fn fire(&self, store: &mut Store, rng: &mut dyn RngCore) -> PromoResult<PromotionOutcome>;
}

// =============================================================================
// Flash Sale
// =============================================================================

/// Random product, off the list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSale {
    pub rate: Rate,
}

impl Default for FlashSale {
    fn default() -> Self {
        FlashSale {
            rate: Rate::from_percent(20),
        }
    }
}

impl Promotion for FlashSale {
    fn kind(&self) -> PromotionKind {
        PromotionKind::FlashSale
    }

    fn fire(&self, store: &mut Store, rng: &mut dyn RngCore) -> PromoResult<PromotionOutcome> {
        let products = store.catalog.products();
        if products.is_empty() {
            return Ok(PromotionOutcome::Skipped(SkipReason::EmptyCatalog));
        }

        let lucky = &products[rng.gen_range(0..products.len())];
        if !lucky.in_stock() {
            debug!(product_id = %lucky.id, "Flash sale pick is sold out");
            return Ok(PromotionOutcome::Skipped(SkipReason::OutOfStock {
                product_id: lucky.id.clone(),
            }));
        }
        if lucky.on_flash_sale {
            debug!(product_id = %lucky.id, "Flash sale pick already on sale");
            return Ok(PromotionOutcome::Skipped(SkipReason::AlreadyOnSale {
                product_id: lucky.id.clone(),
            }));
        }

        let id = lucky.id.clone();
        let updated = store.catalog.apply_flash_sale(&id, self.rate)?;
        info!(
            product_id = %updated.id,
            price = updated.current_price.won(),
            rate = %self.rate,
            "Flash sale started"
        );

        Ok(PromotionOutcome::Applied(PromotionEvent::from_product(
            PromotionKind::FlashSale,
            self.rate,
            &updated,
        )))
    }
}

// =============================================================================
// Suggested Sale
// =============================================================================

/// Something other than the shopper's last pick, off the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedSale {
    pub rate: Rate,
}

impl Default for SuggestedSale {
    fn default() -> Self {
        SuggestedSale {
            rate: Rate::from_percent(5),
        }
    }
}

impl Promotion for SuggestedSale {
    fn kind(&self) -> PromotionKind {
        PromotionKind::SuggestedSale
    }

    fn fire(&self, store: &mut Store, _rng: &mut dyn RngCore) -> PromoResult<PromotionOutcome> {
        if store.cart.is_empty() {
            return Ok(PromotionOutcome::Skipped(SkipReason::EmptyCart));
        }
        let Some(last) = store.cart.last_selected() else {
            return Ok(PromotionOutcome::Skipped(SkipReason::NoSelection));
        };

        let candidate = store
            .catalog
            .products()
            .iter()
            .find(|p| p.id != last && p.in_stock() && !p.on_suggested_sale)
            .map(|p| p.id.clone());

        let Some(id) = candidate else {
            debug!(last_selected = %last, "No product to suggest");
            return Ok(PromotionOutcome::Skipped(SkipReason::NoCandidate));
        };

        let updated = store.catalog.apply_suggested_sale(&id, self.rate)?;
        info!(
            product_id = %updated.id,
            price = updated.current_price.won(),
            rate = %self.rate,
            "Suggested sale started"
        );

        Ok(PromotionOutcome::Applied(PromotionEvent::from_product(
            PromotionKind::SuggestedSale,
            self.rate,
            &updated,
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use storefront_core::{ids, Catalog};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_flash_sale_applies_or_skips_for_a_reason() {
        let mut store = Store::seeded();
        let mut rng = rng();

        for _ in 0..20 {
            match FlashSale::default().fire(&mut store, &mut rng).unwrap() {
                PromotionOutcome::Applied(event) => {
                    let product = store.catalog.get(&event.product_id).unwrap();
                    assert!(product.on_flash_sale);
                    assert_eq!(
                        product.current_price,
                        product.original_price.reduced_by(Rate::from_percent(20))
                    );
                    assert_eq!(event.badge, SaleBadge::Flash);
                }
                PromotionOutcome::Skipped(SkipReason::OutOfStock { product_id }) => {
                    assert_eq!(product_id, ids::LAPTOP_POUCH);
                }
                PromotionOutcome::Skipped(SkipReason::AlreadyOnSale { .. }) => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        // the pouch is sold out and can never go on sale
        assert!(!store.catalog.get(ids::LAPTOP_POUCH).unwrap().on_flash_sale);
    }

    #[test]
    fn test_flash_sale_on_single_product_catalog() {
        let catalog = Catalog::new(vec![Product::new("x", "Widget", Money::from_won(10_000), 3)]);
        let mut store = Store::new(catalog);
        let mut rng = rng();

        let first = FlashSale::default().fire(&mut store, &mut rng).unwrap();
        let event = first.event().unwrap();
        assert_eq!(event.new_price, Money::from_won(8_000));
        assert_eq!(event.message(), "⚡ Flash sale! Widget is 20% off!");

        let second = FlashSale::default().fire(&mut store, &mut rng).unwrap();
        assert_eq!(
            second,
            PromotionOutcome::Skipped(SkipReason::AlreadyOnSale {
                product_id: "x".to_string()
            })
        );
    }

    #[test]
    fn test_flash_sale_empty_catalog() {
        let mut store = Store::new(Catalog::default());
        let outcome = FlashSale::default().fire(&mut store, &mut rng()).unwrap();
        assert_eq!(outcome, PromotionOutcome::Skipped(SkipReason::EmptyCatalog));
    }

    #[test]
    fn test_suggestion_needs_cart_and_selection() {
        let mut store = Store::seeded();
        let outcome = SuggestedSale::default().fire(&mut store, &mut rng()).unwrap();
        assert_eq!(outcome, PromotionOutcome::Skipped(SkipReason::EmptyCart));
    }

    #[test]
    fn test_suggestion_skips_last_selected() {
        let mut store = Store::seeded();
        store.add_to_cart(ids::KEYBOARD).unwrap();

        let outcome = SuggestedSale::default().fire(&mut store, &mut rng()).unwrap();
        let event = outcome.event().unwrap();
        assert_eq!(event.product_id, ids::MOUSE);
        assert_eq!(event.new_price, Money::from_won(19_000));
        assert_eq!(event.badge, SaleBadge::Suggested);

        // mouse is now suggested, next in line is the monitor arm
        let outcome = SuggestedSale::default().fire(&mut store, &mut rng()).unwrap();
        assert_eq!(outcome.event().unwrap().product_id, ids::MONITOR_ARM);
    }

    #[test]
    fn test_suggestion_stacks_on_flash_sale() {
        let mut store = Store::seeded();
        store.catalog.apply_flash_sale(ids::MOUSE, Rate::from_percent(20)).unwrap();
        store.add_to_cart(ids::KEYBOARD).unwrap();

        let outcome = SuggestedSale::default().fire(&mut store, &mut rng()).unwrap();
        let event = outcome.event().unwrap();
        // 20_000 × 0.8 × 0.95
        assert_eq!(event.new_price, Money::from_won(15_200));
        assert_eq!(event.badge, SaleBadge::Super);
    }

    #[test]
    fn test_suggestion_without_candidates() {
        let catalog =
            Catalog::new(vec![Product::new("only", "Only One", Money::from_won(1_000), 5)]);
        let mut store = Store::new(catalog);
        store.add_to_cart("only").unwrap();

        let outcome = SuggestedSale::default().fire(&mut store, &mut rng()).unwrap();
        assert_eq!(outcome, PromotionOutcome::Skipped(SkipReason::NoCandidate));
    }
}
