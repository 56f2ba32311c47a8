//! # Storefront CLI Entry Point
//!
//! ```text
//! $ storefront p1=1 p2=1 --day 2026-10-20
//! Bug-Zapping Keyboard x 1  ₩10,000
//! Productivity Mouse x 1  ₩20,000
//! Subtotal  ₩30,000
//! Tuesday extra discount  -10%
//! Saved ₩3,000 (10.0%)
//! Total  ₩27,000
//!
//! Points: 104p (Tuesday 2x, keyboard+mouse set +50p)
//! ```

use std::process::ExitCode;

use clap::Parser;
use storefront_cli::{init_tracing, run, Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting storefront");

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, "{}", e.message);
            if json {
                match serde_json::to_string(&e) {
                    Ok(body) => println!("{}", body),
                    Err(_) => eprintln!("{}", e),
                }
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
