//! Rolling spread, volatility and correlation metrics.
//!
//! # Definitions
//!
//! For asset `S`, primary hedge `A` and secondary hedge `B` with simple returns
//! `r_S`, `r_A`, `r_B`, over a trailing window of `W` returns:
//!
//! ```text
//! vol_X       = popstd(r_X) * sqrt(252)
//! spread_vol  = popstd(r_S - r_A) * sqrt(252)
//! theoretical = sqrt(vol_S² + vol_A² - 2 * vol_S * vol_A * corr(r_S, r_A))
//! vol_ratio   = spread_vol / theoretical
//! ```
//!
//! The first return is undefined, so the first fully populated window ends at
//! index `W`. Everything before that is `None`.

use super::config::TRADING_DAYS_PER_YEAR;
use super::error::HedgeError;
use crate::math::{rolling_correlation, rolling_std};
use crate::types::{ensure_aligned, PriceSeries};

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Per-timestep metrics, one entry per input row in every column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsFrame {
    pub dates: Vec<NaiveDate>,
    /// Annualized volatility of the primary asset
    pub vol_asset: Vec<Option<f64>>,
    /// Annualized volatility of hedge instrument A
    pub vol_hedge_a: Vec<Option<f64>>,
    /// Annualized volatility of hedge instrument B
    pub vol_hedge_b: Vec<Option<f64>>,
    /// Realized annualized volatility of the asset-minus-hedge-A spread return
    pub spread_vol: Vec<Option<f64>>,
    /// Spread volatility implied by the two legs' volatilities and correlation
    pub theoretical_spread_vol: Vec<Option<f64>>,
    /// `spread_vol / theoretical_spread_vol`
    pub vol_ratio: Vec<Option<f64>>,
    pub corr_asset_hedge_a: Vec<Option<f64>>,
    pub corr_asset_hedge_b: Vec<Option<f64>>,
}

impl MetricsFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of timesteps with a defined volatility ratio
    pub fn defined_ratio_count(&self) -> usize {
        self.vol_ratio.iter().filter(|r| r.is_some()).count()
    }

    /// Tabular view for export
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        df! {
            "date" => dates,
            "vol_asset" => &self.vol_asset,
            "vol_hedge_a" => &self.vol_hedge_a,
            "vol_hedge_b" => &self.vol_hedge_b,
            "spread_vol" => &self.spread_vol,
            "theoretical_spread_vol" => &self.theoretical_spread_vol,
            "vol_ratio" => &self.vol_ratio,
            "corr_asset_hedge_a" => &self.corr_asset_hedge_a,
            "corr_asset_hedge_b" => &self.corr_asset_hedge_b,
        }
    }
}

/// Spread return: asset return minus hedge return, undefined if either side is
pub fn spread_returns(asset: &[Option<f64>], hedge: &[Option<f64>]) -> Vec<Option<f64>> {
    asset
        .iter()
        .zip(hedge.iter())
        .map(|(a, h)| a.zip(*h).map(|(a, h)| a - h))
        .collect()
}

/// Correlation-implied spread volatility.
///
/// `None` if rounding drives the combined variance below zero.
pub fn theoretical_spread_vol(vol_a: f64, vol_b: f64, corr: f64) -> Option<f64> {
    let variance = vol_a * vol_a + vol_b * vol_b - 2.0 * vol_a * vol_b * corr;
    (variance >= 0.0).then(|| variance.sqrt())
}

/// Realized over theoretical spread volatility; undefined for a zero denominator
pub fn vol_ratio(spread_vol: f64, theoretical: f64) -> Option<f64> {
    if theoretical == 0.0 {
        return None;
    }
    let ratio = spread_vol / theoretical;
    ratio.is_finite().then_some(ratio)
}

fn annualize(vols: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let factor = TRADING_DAYS_PER_YEAR.sqrt();
    vols.into_iter().map(|v| v.map(|v| v * factor)).collect()
}

/// Compute the metrics frame for three aligned price series.
///
/// # Errors
/// - `InvalidConfig` if `vol_window` is zero
/// - `Alignment` if the series do not share one date index
///
/// A series too short to fill the window is not an error: every column is
/// returned as `None`.
pub fn compute_metrics(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
    vol_window: usize,
) -> Result<MetricsFrame, HedgeError> {
    if vol_window == 0 {
        return Err(HedgeError::InvalidConfig(
            "vol_window must be at least 1".to_string(),
        ));
    }
    ensure_aligned(asset, hedge_a, hedge_b)?;

    if asset.len() <= vol_window {
        warn!(
            rows = asset.len(),
            vol_window,
            "Series shorter than volatility window, metrics will be undefined"
        );
    }

    let ret_asset = asset.returns();
    let ret_a = hedge_a.returns();
    let ret_b = hedge_b.returns();
    let ret_spread = spread_returns(&ret_asset, &ret_a);

    let vol_asset = annualize(rolling_std(&ret_asset, vol_window)?);
    let vol_hedge_a = annualize(rolling_std(&ret_a, vol_window)?);
    let vol_hedge_b = annualize(rolling_std(&ret_b, vol_window)?);
    let spread_vol = annualize(rolling_std(&ret_spread, vol_window)?);

    let corr_asset_hedge_a = rolling_correlation(&ret_asset, &ret_a, vol_window)?;
    let corr_asset_hedge_b = rolling_correlation(&ret_asset, &ret_b, vol_window)?;

    let theoretical: Vec<Option<f64>> = vol_asset
        .iter()
        .zip(vol_hedge_a.iter())
        .zip(corr_asset_hedge_a.iter())
        .map(|((va, vb), corr)| match (va, vb, corr) {
            (Some(va), Some(vb), Some(corr)) => theoretical_spread_vol(*va, *vb, *corr),
            _ => None,
        })
        .collect();

    let ratio: Vec<Option<f64>> = spread_vol
        .iter()
        .zip(theoretical.iter())
        .map(|(s, t)| s.zip(*t).and_then(|(s, t)| vol_ratio(s, t)))
        .collect();

    let frame = MetricsFrame {
        dates: asset.dates().to_vec(),
        vol_asset,
        vol_hedge_a,
        vol_hedge_b,
        spread_vol,
        theoretical_spread_vol: theoretical,
        vol_ratio: ratio,
        corr_asset_hedge_a,
        corr_asset_hedge_b,
    };

    debug!(
        rows = frame.len(),
        vol_window,
        defined_ratios = frame.defined_ratio_count(),
        "Computed rolling metrics"
    );

    Ok(frame)
}
