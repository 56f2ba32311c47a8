//! # Promotion Scheduler
//!
//! Fires the flash-sale and suggested-sale promotions on their timers.
//!
//! ## Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Promotion Timers                                    │
//! │                                                                         │
//! │  start ──► random delay (0..=10s) ──► +30s tick ──► +30s tick ──► ...  │
//! │            flash sale                                                   │
//! │                                                                         │
//! │  start ──► random delay (0..=20s) ──► +60s tick ──► +60s tick ──► ...  │
//! │            suggested sale                                               │
//! │                                                                         │
//! │  Each tick: lock store ─► Promotion::fire ─► unlock                    │
//! │                              │                                          │
//! │                              └─► Applied? broadcast PromotionEvent      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One task owns both timers and the RNG. The store lock is taken once per
//! tick and never held across an `.await`, so readers see a promotion either
//! fully applied or not at all.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use storefront_core::SharedStore;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{PromotionSettings, MAX_INITIAL_DELAY_SECS, MAX_INTERVAL_SECS};
use crate::error::{PromoError, PromoResult};
use crate::promotion::{
    FlashSale, Promotion, PromotionEvent, PromotionKind, PromotionOutcome, SuggestedSale,
};

/// Capacity of the promotion event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// Handle
// =============================================================================

/// Commands for the scheduler loop.
#[derive(Debug)]
enum SchedulerCommand {
    /// Fire a promotion right away, outside its timer.
    FireNow {
        kind: PromotionKind,
        reply: oneshot::Sender<PromoResult<PromotionOutcome>>,
    },
    /// Stop both timers.
    Shutdown,
}

/// Handle for controlling a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    cmd_tx: mpsc::Sender<SchedulerCommand>,
    events_tx: broadcast::Sender<PromotionEvent>,
}

impl SchedulerHandle {
    /// Subscribes to applied promotions.
    pub fn subscribe(&self) -> broadcast::Receiver<PromotionEvent> {
        self.events_tx.subscribe()
    }

    /// Fires a promotion immediately and returns what it did.
    pub async fn fire_now(&self, kind: PromotionKind) -> PromoResult<PromotionOutcome> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(SchedulerCommand::FireNow { kind, reply })
            .await
            .map_err(|_| PromoError::ChannelError("Scheduler channel closed".into()))?;
        rx.await.map_err(|_| PromoError::ShuttingDown)?
    }

    /// Shuts down the scheduler.
    pub async fn shutdown(&self) -> PromoResult<()> {
        self.cmd_tx
            .send(SchedulerCommand::Shutdown)
            .await
            .map_err(|_| PromoError::ChannelError("Scheduler channel closed".into()))
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Runs the timed promotions against a shared store.
pub struct PromotionScheduler {
    store: SharedStore,
    settings: PromotionSettings,
    flash: FlashSale,
    suggestion: SuggestedSale,
    rng: ChaCha8Rng,
    events_tx: broadcast::Sender<PromotionEvent>,
}

impl PromotionScheduler {
    /// Creates a scheduler. A configured seed makes every pick reproducible.
    pub fn new(store: SharedStore, settings: PromotionSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        PromotionScheduler {
            store,
            flash: FlashSale {
                rate: settings.flash.rate,
            },
            suggestion: SuggestedSale {
                rate: settings.suggestion.rate,
            },
            settings,
            rng,
            events_tx,
        }
    }

    /// Starts the scheduler and returns a handle.
    pub fn start(self) -> SchedulerHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        SchedulerHandle { cmd_tx, events_tx }
    }

    /// Main scheduler loop.
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<SchedulerCommand>) {
        let flash_enabled = self.settings.flash.enabled;
        let suggestion_enabled = self.settings.suggestion.enabled;

        self.warn_out_of_range();

        let now = Instant::now();
        let flash_delay = self.initial_delay(self.settings.flash.max_initial_delay_secs);
        let suggestion_delay = self.initial_delay(self.settings.suggestion.max_initial_delay_secs);

        // The first tick lands one full period after the random delay.
        let flash_period = self.settings.flash.interval();
        let suggestion_period = self.settings.suggestion.interval();
        let mut flash_timer = interval_at(now + flash_delay + flash_period, flash_period);
        let mut suggestion_timer =
            interval_at(now + suggestion_delay + suggestion_period, suggestion_period);
        flash_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        suggestion_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            flash_enabled,
            suggestion_enabled,
            flash_delay_ms = flash_delay.as_millis() as u64,
            suggestion_delay_ms = suggestion_delay.as_millis() as u64,
            "Promotion scheduler started"
        );

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::FireNow { kind, reply }) => {
                            let outcome = self.fire(kind);
                            let _ = reply.send(outcome);
                        }
                        Some(SchedulerCommand::Shutdown) | None => {
                            info!("Promotion scheduler shutting down");
                            break;
                        }
                    }
                }
                _ = flash_timer.tick(), if flash_enabled => {
                    self.tick(PromotionKind::FlashSale);
                }
                _ = suggestion_timer.tick(), if suggestion_enabled => {
                    self.tick(PromotionKind::SuggestedSale);
                }
            }
        }
    }

    /// A timer tick. Failures are logged; the timer keeps running.
    fn tick(&mut self, kind: PromotionKind) {
        if let Err(e) = self.fire(kind) {
            warn!(%kind, error = %e, "Promotion tick failed");
        }
    }

    /// Fires one promotion under the store lock and broadcasts the result.
    fn fire(&mut self, kind: PromotionKind) -> PromoResult<PromotionOutcome> {
        let promotion: &dyn Promotion = match kind {
            PromotionKind::FlashSale => &self.flash,
            PromotionKind::SuggestedSale => &self.suggestion,
        };

        let outcome = {
            let mut store = self.store.lock().map_err(|_| PromoError::StoreUnavailable)?;
            promotion.fire(&mut store, &mut self.rng)?
        };

        match &outcome {
            PromotionOutcome::Applied(event) => {
                if self.events_tx.send(event.clone()).is_err() {
                    debug!(%kind, "No promotion subscribers");
                }
            }
            PromotionOutcome::Skipped(reason) => {
                debug!(%kind, ?reason, "Promotion tick skipped");
            }
        }

        Ok(outcome)
    }

    /// Random start delay, capped at `MAX_INITIAL_DELAY_SECS`.
    fn initial_delay(&mut self, max_secs: u64) -> Duration {
        let max_ms = max_secs.min(MAX_INITIAL_DELAY_SECS).saturating_mul(1_000);
        Duration::from_millis(self.rng.gen_range(0..=max_ms))
    }

    /// Settings that bypassed `StorefrontConfig::validate` are clamped, not rejected.
    fn warn_out_of_range(&self) {
        let flash = &self.settings.flash;
        let suggestion = &self.settings.suggestion;
        let timers = [
            (PromotionKind::FlashSale, flash.interval_secs, flash.max_initial_delay_secs),
            (
                PromotionKind::SuggestedSale,
                suggestion.interval_secs,
                suggestion.max_initial_delay_secs,
            ),
        ];
        for (kind, interval_secs, max_delay_secs) in timers {
            if !(1..=MAX_INTERVAL_SECS).contains(&interval_secs) {
                warn!(%kind, interval_secs, "Promotion interval out of range, clamping");
            }
            if max_delay_secs > MAX_INITIAL_DELAY_SECS {
                warn!(%kind, max_delay_secs, "Promotion start delay out of range, clamping");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::SkipReason;
    use storefront_core::{ids, Catalog, Money, Product, Store};

    fn settings() -> PromotionSettings {
        let mut settings = PromotionSettings {
            seed: Some(7),
            ..PromotionSettings::default()
        };
        settings.flash.max_initial_delay_secs = 0;
        settings.suggestion.enabled = false;
        settings
    }

    fn single_product_store() -> SharedStore {
        let widget = Product::new("x", "Widget", Money::from_won(10_000), 3);
        Store::new(Catalog::new(vec![widget])).into_shared()
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_sale_fires_after_first_period() {
        let store = single_product_store();
        let handle = PromotionScheduler::new(store.clone(), settings()).start();
        let mut events = handle.subscribe();
        let started = Instant::now();

        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, PromotionKind::FlashSale);
        assert_eq!(event.product_id, "x");
        assert!(started.elapsed() >= Duration::from_secs(30));

        let price = store.lock().unwrap().catalog.get("x").unwrap().current_price;
        assert_eq!(price, Money::from_won(8_000));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_is_bounded() {
        let mut settings = settings();
        settings.flash.max_initial_delay_secs = 10;
        let handle = PromotionScheduler::new(single_product_store(), settings).start();
        let mut events = handle.subscribe();
        let started = Instant::now();

        events.recv().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed <= Duration::from_secs(40));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_now_runs_without_timer() {
        let mut settings = settings();
        settings.flash.enabled = false;
        let store = Store::seeded().into_shared();
        let handle = PromotionScheduler::new(store.clone(), settings).start();

        let outcome = handle.fire_now(PromotionKind::SuggestedSale).await.unwrap();
        assert_eq!(outcome, PromotionOutcome::Skipped(SkipReason::EmptyCart));

        store.lock().unwrap().add_to_cart(ids::SPEAKER).unwrap();
        let mut events = handle.subscribe();
        let outcome = handle.fire_now(PromotionKind::SuggestedSale).await.unwrap();
        assert_eq!(outcome.event().unwrap().product_id, ids::KEYBOARD);
        assert_eq!(events.recv().await.unwrap().product_id, ids::KEYBOARD);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_timers_never_fire() {
        let mut settings = settings();
        settings.flash.enabled = false;
        let handle = PromotionScheduler::new(single_product_store(), settings).start();
        let mut events = handle.subscribe();

        let waited = tokio::time::timeout(Duration::from_secs(600), events.recv()).await;
        assert!(waited.is_err());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_timers_are_clamped() {
        let mut settings = settings();
        settings.flash.interval_secs = u64::MAX;
        settings.flash.max_initial_delay_secs = u64::MAX;
        settings.suggestion.enabled = true;
        settings.suggestion.interval_secs = 0;
        settings.suggestion.max_initial_delay_secs = 0;
        let handle = PromotionScheduler::new(single_product_store(), settings).start();

        let outcome = handle.fire_now(PromotionKind::FlashSale).await.unwrap();
        assert_eq!(outcome.event().unwrap().product_id, "x");

        // A zero interval runs as one second; the empty cart skips every tick.
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_fail_after_shutdown() {
        let handle = PromotionScheduler::new(single_product_store(), settings()).start();
        handle.shutdown().await.unwrap();
        tokio::task::yield_now().await;

        assert!(handle.fire_now(PromotionKind::FlashSale).await.is_err());
    }
}
