//! Metrics command handler.
//!
//! Runs only the metrics and regime stages and writes them as one table.

use super::backtest::write_csv;
use super::data::load_prices;
use crate::cli::PipelineCliConfig;
use crate::hedge::{classify_regime_with, compute_metrics};
use crate::types::RegimeCounts;

use polars::prelude::*;
use std::fs;
use tracing::info;

/// Compute rolling metrics and regime labels and write `metrics.csv`.
///
/// # Errors
/// Returns error if data loading, the metrics stage, or writing fails.
pub fn run_metrics(config: PipelineCliConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        source = %config.source,
        vol_window = config.hedge.vol_window,
        regime_window = config.hedge.regime_window,
        "Computing metrics"
    );

    let (asset, hedge_a, hedge_b) = load_prices(&config.source, &config.columns)?;
    let metrics = compute_metrics(&asset, &hedge_a, &hedge_b, config.hedge.vol_window)?;
    let regimes = classify_regime_with(&metrics, &config.hedge)?;

    let counts = RegimeCounts::tally(&regimes);
    info!(
        rows = metrics.len(),
        defined_ratios = metrics.defined_ratio_count(),
        low = counts.low,
        normal = counts.normal,
        high = counts.high,
        "Metrics computed"
    );

    let labels: Vec<String> = regimes.iter().map(|r| r.to_string()).collect();
    let mut df = metrics.to_dataframe()?;
    df.with_column(Series::new("regime", labels))?;

    fs::create_dir_all(&config.output_dir)?;
    write_csv(&mut df, &config.output_dir.join("metrics.csv"))?;

    Ok(())
}
