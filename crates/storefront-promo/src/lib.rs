//! # storefront-promo: Promotion Scheduler
//!
//! Timer-driven promotions and host configuration for the storefront.
//!
//! ## Module Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       storefront-promo                                  │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │  scheduler   │──►│  promotion   │──►│ SharedStore  │                │
//! │  │ timers, cmds │   │ FlashSale    │   │ (core)       │                │
//! │  │ broadcast    │   │ SuggestedSale│   └──────────────┘                │
//! │  └──────┬───────┘   └──────────────┘                                   │
//! │         │                                                               │
//! │  ┌──────▼───────┐   ┌──────────────┐                                   │
//! │  │   config     │   │    error     │                                   │
//! │  │ TOML + env   │   │  PromoError  │                                   │
//! │  └──────────────┘   └──────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use storefront_core::Store;
//! use storefront_promo::{PromotionScheduler, StorefrontConfig};
//!
//! # async fn run() -> storefront_promo::PromoResult<()> {
//! let config = StorefrontConfig::load(None)?;
//! let store = Store::seeded().into_shared();
//! let handle = PromotionScheduler::new(store.clone(), config.promotions.clone()).start();
//!
//! let mut events = handle.subscribe();
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.message());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod promotion;
pub mod scheduler;

pub use config::{FlashSaleSettings, PromotionSettings, StorefrontConfig, SuggestionSettings};
pub use error::{PromoError, PromoResult};
pub use promotion::{
    FlashSale, Promotion, PromotionEvent, PromotionKind, PromotionOutcome, SkipReason,
    SuggestedSale,
};
pub use scheduler::{PromotionScheduler, SchedulerHandle};
