//! Backtest command handler.
//!
//! Implements the `backtest` subcommand: load prices, run the full pipeline and
//! write the summary and per-timestep table for the reporting layer.

use super::data::load_prices;
use crate::backtest::{run_backtest_with_config, BacktestSummary};
use crate::cli::PipelineCliConfig;
use crate::hedge::{HedgeConfig, HedgeError};

use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Backtest results in JSON-serializable format.
#[derive(Debug, Serialize)]
struct BacktestOutput<'a> {
    source: String,
    asset: &'a str,
    hedge_a: &'a str,
    hedge_b: &'a str,
    config: &'a HedgeConfig,
    summary: BacktestSummary,
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "undefined".to_string())
}

/// Write a frame as CSV. Undefined values become empty cells.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), HedgeError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    info!(path = %path.display(), rows = df.height(), "Table written");
    Ok(())
}

/// Run a backtest with the provided CLI configuration.
///
/// Writes `summary.json` and `timeseries.csv` into the output directory.
///
/// # Errors
/// Returns error if data loading, the pipeline, or writing results fails.
pub fn run_backtest(config: PipelineCliConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("--- Running Backtest ---");
    info!(
        source = %config.source,
        vol_window = config.hedge.vol_window,
        regime_window = config.hedge.regime_window,
        rebalance_threshold = config.hedge.rebalance_threshold,
        "Backtest configuration"
    );

    let (asset, hedge_a, hedge_b) = load_prices(&config.source, &config.columns)?;
    info!(rows = asset.len(), "Data loaded");

    let result = run_backtest_with_config(&asset, &hedge_a, &hedge_b, &config.hedge)?;
    let summary = result.summary();

    info!("--- Backtest Results ---");
    info!("Observations:      {}", summary.observations);
    info!("Annualized Return: {}", fmt_opt(summary.annualized_return));
    info!("Annualized Vol:    {}", fmt_opt(summary.annualized_volatility));
    info!("Sharpe Ratio:      {}", fmt_opt(summary.sharpe_ratio));
    info!("Max Drawdown:      {}", fmt_opt(summary.max_drawdown));
    info!(
        "Regimes:           LOW {} / NORMAL {} / HIGH {}",
        summary.regime_counts.low, summary.regime_counts.normal, summary.regime_counts.high
    );
    info!("Mean ratio A:      {}", fmt_opt(summary.ratio_a.mean));
    info!("Mean ratio B:      {}", fmt_opt(summary.ratio_b.mean));
    info!("------------------------");

    let output = BacktestOutput {
        source: config.source.to_string(),
        asset: asset.name(),
        hedge_a: hedge_a.name(),
        hedge_b: hedge_b.name(),
        config: &config.hedge,
        summary,
    };

    fs::create_dir_all(&config.output_dir)?;
    let summary_path = config.output_dir.join("summary.json");
    let mut file = File::create(&summary_path)?;
    let json = serde_json::to_string_pretty(&output)?;
    file.write_all(json.as_bytes())?;
    info!(path = %summary_path.display(), "Results written");

    let mut df = result.to_dataframe()?;
    write_csv(&mut df, &config.output_dir.join("timeseries.csv"))?;

    Ok(())
}
