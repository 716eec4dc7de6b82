//! Backtesting engine for the regime-conditioned hedge.
//!
//! Applies the per-timestep hedge ratios to realized returns and evaluates the
//! resulting hedged spread:
//!
//! ```text
//! spread[t] = r_asset[t] - r_a[t]
//! hedged[t] = spread[t] - (ratio_a[t] * r_a[t] + ratio_b[t] * r_b[t])
//! ```
//!
//! Aggregates skip undefined timesteps instead of counting them as zero.

use crate::hedge::metrics::spread_returns;
use crate::hedge::{
    classify_regime_with, compute_metrics, generate_hedge_ratios, HedgeConfig, HedgeError,
    HedgeRatios, MetricsFrame, TRADING_DAYS_PER_YEAR,
};
use crate::math::{defined_values, mean, sample_std, Describe};
use crate::types::{ensure_aligned, PriceSeries, Regime, RegimeCounts, RegimeSeries};

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// Output of one backtest run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub dates: Vec<NaiveDate>,
    pub metrics: MetricsFrame,
    pub regimes: RegimeSeries,
    pub hedge_ratios: HedgeRatios,
    /// Asset return minus hedge-A return
    pub spread_returns: Vec<Option<f64>>,
    /// Spread return net of both hedge legs
    pub hedged_returns: Vec<Option<f64>>,
    /// Equity over its running peak, minus one. Never positive.
    pub drawdown: Vec<Option<f64>>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    /// Undefined when volatility is zero or undefined
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    /// Number of defined hedged returns
    pub observations: usize,
    pub regime_counts: RegimeCounts,
    pub ratio_a_stats: Describe,
    pub ratio_b_stats: Describe,
}

/// Scalar view of a result, for reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub rows: usize,
    pub observations: usize,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub regime_counts: RegimeCounts,
    pub ratio_a: Describe,
    pub ratio_b: Describe,
}

impl BacktestResult {
    pub fn summary(&self) -> BacktestSummary {
        BacktestSummary {
            rows: self.dates.len(),
            observations: self.observations,
            annualized_return: self.annualized_return,
            annualized_volatility: self.annualized_volatility,
            sharpe_ratio: self.sharpe_ratio,
            max_drawdown: self.max_drawdown,
            regime_counts: self.regime_counts,
            ratio_a: self.ratio_a_stats,
            ratio_b: self.ratio_b_stats,
        }
    }

    /// Per-timestep table: metrics, regime, ratios, returns and drawdown
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        let regimes: Vec<String> = self.regimes.iter().map(Regime::to_string).collect();
        let m = &self.metrics;
        df! {
            "date" => dates,
            "vol_asset" => &m.vol_asset,
            "vol_hedge_a" => &m.vol_hedge_a,
            "vol_hedge_b" => &m.vol_hedge_b,
            "spread_vol" => &m.spread_vol,
            "theoretical_spread_vol" => &m.theoretical_spread_vol,
            "vol_ratio" => &m.vol_ratio,
            "corr_asset_hedge_a" => &m.corr_asset_hedge_a,
            "corr_asset_hedge_b" => &m.corr_asset_hedge_b,
            "regime" => regimes,
            "ratio_a" => &self.hedge_ratios.ratio_a,
            "ratio_b" => &self.hedge_ratios.ratio_b,
            "spread_return" => &self.spread_returns,
            "hedged_return" => &self.hedged_returns,
            "drawdown" => &self.drawdown,
        }
    }
}

/// Hedged return per timestep; undefined if any input at that timestep is.
pub fn hedged_returns(
    spread: &[Option<f64>],
    ret_a: &[Option<f64>],
    ret_b: &[Option<f64>],
    ratios: &HedgeRatios,
) -> Vec<Option<f64>> {
    spread
        .iter()
        .zip(ret_a)
        .zip(ret_b)
        .zip(ratios.ratio_a.iter().zip(&ratios.ratio_b))
        .map(|(((s, ra), rb), (ha, hb))| {
            let (s, ra, rb, ha) = ((*s)?, (*ra)?, (*rb)?, (*ha)?);
            Some(s - (ha * ra + hb * rb))
        })
        .collect()
}

/// Drawdown from the running peak of compounded equity.
///
/// Left-to-right scan. Undefined returns leave equity unchanged and report an
/// undefined drawdown at that timestep. A return that takes equity to zero or
/// below wipes the account out: equity stays at zero from then on and every
/// later defined timestep reports a drawdown of -1.
pub fn drawdown_series(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut equity = 1.0_f64;
    let mut peak: Option<f64> = None;

    returns
        .iter()
        .map(|r| {
            let r = (*r)?;
            if equity > 0.0 {
                equity = (equity * (1.0 + r)).max(0.0);
            }
            let p = peak.map_or(equity, |p: f64| p.max(equity));
            peak = Some(p);
            if equity <= 0.0 || p <= 0.0 {
                Some(-1.0)
            } else {
                Some(equity / p - 1.0)
            }
        })
        .collect()
}

/// Annualized Sharpe ratio; undefined for zero or undefined volatility
pub fn sharpe_ratio(annualized_return: Option<f64>, annualized_vol: Option<f64>) -> Option<f64> {
    match (annualized_return, annualized_vol) {
        (Some(ret), Some(vol)) if vol > 0.0 => Some(ret / vol),
        _ => None,
    }
}

/// Evaluate already computed pipeline outputs against realized returns.
///
/// # Errors
/// `Alignment` if the prices, metrics, regimes and ratios disagree in length or index.
pub fn simulate(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
    metrics: MetricsFrame,
    regimes: RegimeSeries,
    hedge_ratios: HedgeRatios,
) -> Result<BacktestResult, HedgeError> {
    ensure_aligned(asset, hedge_a, hedge_b)?;
    let n = asset.len();
    if metrics.len() != n || regimes.len() != n || hedge_ratios.len() != n {
        return Err(HedgeError::Alignment(format!(
            "prices have {} rows, metrics {}, regimes {}, ratios {}",
            n,
            metrics.len(),
            regimes.len(),
            hedge_ratios.len()
        )));
    }
    if metrics.dates != asset.dates() {
        return Err(HedgeError::Alignment(
            "metrics frame index differs from the price index".to_string(),
        ));
    }

    let ret_asset = asset.returns();
    let ret_a = hedge_a.returns();
    let ret_b = hedge_b.returns();

    let spread = spread_returns(&ret_asset, &ret_a);
    let hedged = hedged_returns(&spread, &ret_a, &ret_b, &hedge_ratios);

    let observed = defined_values(&hedged);
    let annualized_return = mean(&observed).map(|m| m * TRADING_DAYS_PER_YEAR);
    let annualized_volatility = sample_std(&observed).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
    let sharpe = sharpe_ratio(annualized_return, annualized_volatility);

    let drawdown = drawdown_series(&hedged);
    let max_drawdown = drawdown.iter().flatten().copied().reduce(f64::min);

    let ratio_a_stats = Describe::from_series(&hedge_ratios.ratio_a);
    let ratio_b_stats = Describe::from_series(&hedge_ratios.ratio_b_series());

    Ok(BacktestResult {
        dates: asset.dates().to_vec(),
        regime_counts: RegimeCounts::tally(&regimes),
        metrics,
        regimes,
        hedge_ratios,
        spread_returns: spread,
        hedged_returns: hedged,
        drawdown,
        annualized_return,
        annualized_volatility,
        sharpe_ratio: sharpe,
        max_drawdown,
        observations: observed.len(),
        ratio_a_stats,
        ratio_b_stats,
    })
}

/// Run the full pipeline with the given windows and default thresholds.
pub fn run_backtest(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
    vol_window: usize,
    regime_window: usize,
) -> Result<BacktestResult, HedgeError> {
    let config = HedgeConfig::with_windows(vol_window, regime_window);
    run_backtest_with_config(asset, hedge_a, hedge_b, &config)
}

/// Run metrics, regime classification, hedge ratios and simulation in order.
///
/// # Errors
/// - `InvalidConfig` if `config` fails validation
/// - `Alignment` if the three series do not share one date index
///
/// Series shorter than the warm-up length still produce a result; its columns
/// and aggregates are undefined.
pub fn run_backtest_with_config(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
    config: &HedgeConfig,
) -> Result<BacktestResult, HedgeError> {
    config.validate()?;
    ensure_aligned(asset, hedge_a, hedge_b)?;

    if asset.len() < config.warmup_len() {
        warn!(
            rows = asset.len(),
            required = config.warmup_len(),
            "Series shorter than warm-up length, output will be mostly undefined"
        );
    }

    let metrics = compute_metrics(asset, hedge_a, hedge_b, config.vol_window)?;
    let regimes = classify_regime_with(&metrics, config)?;
    let ratios = generate_hedge_ratios(&metrics, &regimes)?;
    let result = simulate(asset, hedge_a, hedge_b, metrics, regimes, ratios)?;

    info!(
        asset = asset.name(),
        hedge_a = hedge_a.name(),
        hedge_b = hedge_b.name(),
        rows = result.dates.len(),
        observations = result.observations,
        annualized_return = ?result.annualized_return,
        annualized_volatility = ?result.annualized_volatility,
        sharpe = ?result.sharpe_ratio,
        max_drawdown = ?result.max_drawdown,
        "Backtest complete"
    );

    Ok(result)
}
