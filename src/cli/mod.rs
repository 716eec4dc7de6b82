//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for spreadhedge,
//! including all subcommands and their arguments.

mod config;

pub use config::{CliConfigError, ColumnNames, DataSource, PipelineCliConfig};

use clap::{Args, Parser, Subcommand};

/// spreadhedge - regime-conditioned spread hedge backtester
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and backtest the hedged spread
    Backtest {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Output directory for results
        #[arg(long, default_value = "backtest_results")]
        output_dir: String,
    },

    /// Compute rolling metrics and regimes only
    Metrics {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Output directory for results
        #[arg(long, default_value = "metrics_results")]
        output_dir: String,
    },
}

/// Where the price data comes from
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// CSV file with a date column and one close-price column per instrument
    #[arg(long)]
    pub input: Option<String>,
    /// Use synthetic data instead of a CSV file
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,
    /// Number of synthetic rows to generate
    #[arg(long, default_value_t = 756)]
    pub rows: usize,
    /// Date column name (YYYY-MM-DD values)
    #[arg(long, default_value = "date")]
    pub date_column: String,
    /// Primary asset price column
    #[arg(long, default_value = "asset")]
    pub asset_column: String,
    /// Hedge instrument A price column
    #[arg(long, default_value = "hedge_a")]
    pub hedge_a_column: String,
    /// Hedge instrument B price column
    #[arg(long, default_value = "hedge_b")]
    pub hedge_b_column: String,
}

/// Pipeline parameters. Flags override values from `--config`.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// JSON file with pipeline parameters
    #[arg(long)]
    pub config: Option<String>,
    /// Rolling volatility/correlation lookback (periods)
    #[arg(long)]
    pub vol_window: Option<usize>,
    /// Regime detection lookback (periods)
    #[arg(long)]
    pub regime_window: Option<usize>,
    /// Reserved rebalancing threshold in [0, 1]
    #[arg(long)]
    pub rebalance_threshold: Option<f64>,
}
