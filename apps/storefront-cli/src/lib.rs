//! # Storefront CLI
//!
//! Headless host for the storefront engine.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storefront p1=2 p2=1 --day 2026-10-20 [--json] [--watch 120]          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  init_tracing ─► StorefrontConfig::load ─► Store::seeded               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  fill_cart (add + change_quantity, stock checked)                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Engine::report ─► CartCalculator + LoyaltyRules + OrderSummary        │
//! │        │            + StockReport                                       │
//! │        ▼                                                                │
//! │  print (text or JSON)                                                   │
//! │        │                                                                │
//! │        ▼ --watch                                                        │
//! │  PromotionScheduler ─► on each PromotionEvent: alert + reprint         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use storefront_core::{
    CartCalculationResult, CartCalculator, Clock, DiscountRules, FixedClock, LineItem,
    LoyaltyResult, LoyaltyRules, OrderSummary, SharedStore, StockReport, Store, SystemClock,
};
use storefront_promo::{PromotionScheduler, StorefrontConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use error::{CliError, ErrorCode};

// =============================================================================
// Arguments
// =============================================================================

/// Prices a storefront cart and reports discounts and loyalty points.
#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(
    about = "Price a storefront cart: discounts, loyalty points, promotions",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Cart lines as PRODUCT=QTY, e.g. `p1=2 p2=1`
    #[arg(value_parser = parse_line_item)]
    pub items: Vec<LineItem>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Calculate as of this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub day: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Run the promotion timers for SECS seconds, reprinting on each promotion
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Parses `PRODUCT=QTY`.
pub fn parse_line_item(arg: &str) -> Result<LineItem, String> {
    let (id, qty) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected PRODUCT=QTY, got '{}'", arg))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing product id in '{}'", arg));
    }
    let quantity: u32 = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity in '{}'", arg))?;
    if quantity == 0 {
        return Err(format!("quantity must be positive in '{}'", arg));
    }
    Ok(LineItem::new(id, quantity))
}

// =============================================================================
// Logging
// =============================================================================

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_core=trace` - Trace the engine only
/// - Default: INFO, DEBUG for the storefront crates
///
/// Logs go to stderr so `--json` output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Engine
// =============================================================================

/// Everything printed for one cart state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReport {
    pub calculation: CartCalculationResult,
    pub summary: OrderSummary,
    pub points: LoyaltyResult,
    pub stock: StockReport,
}

/// Calculator and loyalty rules built from config, sharing one clock.
#[derive(Debug, Clone)]
pub struct Engine {
    calculator: CartCalculator,
    loyalty: LoyaltyRules,
}

impl Engine {
    pub fn new(config: &StorefrontConfig, day: Option<NaiveDate>) -> Self {
        let clock: Arc<dyn Clock> = match day {
            Some(date) => Arc::new(FixedClock(date)),
            None => Arc::new(SystemClock),
        };

        Engine {
            calculator: CartCalculator::new(
                DiscountRules::new(config.pricing.clone()),
                clock.clone(),
            ),
            loyalty: LoyaltyRules::new(config.loyalty.clone(), clock),
        }
    }

    pub fn report(&self, store: &Store) -> CartReport {
        let items = store.cart.line_items();
        let calculation = store.calculate(&self.calculator);
        let points = self
            .loyalty
            .compute_points(calculation.total, calculation.item_count, items);
        let summary = OrderSummary::build(&calculation, self.calculator.rules().policy());

        CartReport {
            calculation,
            summary,
            points,
            stock: StockReport::from_catalog(&store.catalog),
        }
    }
}

/// Puts the requested lines into the cart, taking stock as it goes.
pub fn fill_cart(store: &mut Store, items: &[LineItem]) -> Result<(), CliError> {
    for item in items {
        store.add_to_cart(&item.product_id)?;
        if item.quantity > 1 {
            let extra = i64::from(item.quantity) - 1;
            store
                .cart
                .change_quantity(&mut store.catalog, &item.product_id, extra)?;
        }
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

/// Text rendering of a report.
pub fn render_text(report: &CartReport) -> String {
    let mut sections = Vec::new();

    if report.summary.should_render() {
        sections.push(report.summary.to_text());
    } else {
        sections.push("Cart is empty".to_string());
    }

    let points = &report.points;
    if points.detail_lines.is_empty() {
        sections.push(format!("Points: {}p", points.total_points));
    } else {
        sections.push(format!(
            "Points: {}p ({})",
            points.total_points,
            points.detail_lines.join(", ")
        ));
    }

    let stock = report.stock.message();
    if !stock.is_empty() {
        sections.push(stock);
    }

    sections.join("\n\n")
}

fn print_report(report: &CartReport, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{}\n", render_text(report));
    }
    Ok(())
}

fn report_shared(engine: &Engine, store: &SharedStore) -> Result<CartReport, CliError> {
    let store = store
        .lock()
        .map_err(|_| CliError::internal("Store lock poisoned"))?;
    Ok(engine.report(&store))
}

// =============================================================================
// Run
// =============================================================================

/// Runs the host.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::load(cli.config.clone())?;
    let engine = Engine::new(&config, cli.day);

    let mut store = Store::seeded();
    fill_cart(&mut store, &cli.items)?;
    print_report(&engine.report(&store), cli.json)?;

    if let Some(secs) = cli.watch {
        watch(store.into_shared(), &config, &engine, Duration::from_secs(secs), cli.json).await?;
    }

    Ok(())
}

/// Runs the promotion scheduler for `duration`, reprinting on each promotion.
pub async fn watch(
    store: SharedStore,
    config: &StorefrontConfig,
    engine: &Engine,
    duration: Duration,
    json: bool,
) -> Result<(), CliError> {
    let handle = PromotionScheduler::new(store.clone(), config.promotions.clone()).start();
    let mut events = handle.subscribe();
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    info!(secs = duration.as_secs(), "Watching promotions");

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if !json {
                        println!("{}\n", event.message());
                    }
                    print_report(&report_shared(engine, &store)?, json)?;
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Missed promotion events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{ids, Money};

    fn tuesday() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 10, 20)
    }

    #[test]
    fn test_parse_line_item() {
        assert_eq!(parse_line_item("p1=3").unwrap(), LineItem::new("p1", 3));
        assert_eq!(parse_line_item(" p2 = 1 ").unwrap(), LineItem::new("p2", 1));
        assert!(parse_line_item("p1").is_err());
        assert!(parse_line_item("=3").is_err());
        assert!(parse_line_item("p1=0").is_err());
        assert!(parse_line_item("p1=-2").is_err());
    }

    #[test]
    fn test_cli_parses_arguments() {
        let cli =
            Cli::try_parse_from(["storefront", "p1=2", "p3=1", "--day", "2026-10-20", "--json"])
                .unwrap();
        assert_eq!(cli.items.len(), 2);
        assert_eq!(cli.day, tuesday());
        assert!(cli.json);
        assert!(cli.watch.is_none());
    }

    #[test]
    fn test_fill_cart_takes_stock() {
        let mut store = Store::seeded();
        fill_cart(&mut store, &[LineItem::new(ids::SPEAKER, 4)]).unwrap();
        assert_eq!(store.cart.quantity_of(ids::SPEAKER), 4);
        assert_eq!(store.catalog.get(ids::SPEAKER).unwrap().stock, 6);
    }

    #[test]
    fn test_fill_cart_rejects_oversell() {
        let mut store = Store::seeded();
        let err = fill_cart(&mut store, &[LineItem::new(ids::SPEAKER, 11)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = fill_cart(&mut store, &[LineItem::new(ids::LAPTOP_POUCH, 1)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_report_on_tuesday() {
        let engine = Engine::new(&StorefrontConfig::default(), tuesday());
        let mut store = Store::seeded();
        fill_cart(
            &mut store,
            &[LineItem::new(ids::KEYBOARD, 1), LineItem::new(ids::MOUSE, 1)],
        )
        .unwrap();

        let report = engine.report(&store);
        // 30_000 × 0.9
        assert_eq!(report.calculation.total, Money::from_won(27_000));
        // 27 × 2 + 50
        assert_eq!(report.points.total_points, 104);

        let text = render_text(&report);
        assert!(text.contains("Tuesday extra discount  -10%"));
        assert!(text.contains("Points: 104p (Tuesday 2x, keyboard+mouse set +50p)"));
        assert!(text.contains("Error-Proof Laptop Pouch: sold out"));
    }

    #[test]
    fn test_empty_report() {
        let engine = Engine::new(&StorefrontConfig::default(), tuesday());
        let report = engine.report(&Store::seeded());
        assert_eq!(report.points.total_points, 0);
        assert!(render_text(&report).starts_with("Cart is empty\n\nPoints: 0p"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_returns_after_duration() {
        let mut config = StorefrontConfig::default();
        config.promotions.seed = Some(1);
        config.promotions.flash.enabled = false;
        config.promotions.suggestion.enabled = false;
        let engine = Engine::new(&config, tuesday());

        let store = Store::seeded().into_shared();
        let result = watch(store, &config, &engine, Duration::from_secs(90), true).await;
        assert!(result.is_ok());
    }
}
