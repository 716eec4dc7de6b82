//! CLI command handlers.
//!
//! This module contains the implementation for each CLI subcommand,
//! delegating to the hedge pipeline and backtest engine.

mod backtest;
mod data;
mod metrics;

pub use backtest::run_backtest;
pub use data::{generate_synthetic_prices, load_csv_prices, load_prices, PriceTriple};
pub use metrics::run_metrics;
