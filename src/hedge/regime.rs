//! Volatility-ratio regime classification.
//!
//! Each timestep is labelled from two numbers only: the current volatility ratio
//! and its trailing mean. There is no smoothing or memory of earlier labels.

use super::config::HedgeConfig;
use super::error::HedgeError;
use super::metrics::MetricsFrame;
use crate::math::rolling_mean;
use crate::types::{Regime, RegimeCounts, RegimeSeries};

use tracing::debug;

/// Label a single observation.
///
/// Strict inequalities: a ratio exactly on a band edge is `Normal`. Either input
/// undefined also yields `Normal`.
pub fn classify_point(
    ratio: Option<f64>,
    trailing_mean: Option<f64>,
    low_factor: f64,
    high_factor: f64,
) -> Regime {
    match (ratio, trailing_mean) {
        (Some(ratio), Some(mean)) if ratio < low_factor * mean => Regime::Low,
        (Some(ratio), Some(mean)) if ratio > high_factor * mean => Regime::High,
        _ => Regime::Normal,
    }
}

/// Classify every timestep with the default 0.8 / 1.2 bands.
///
/// # Errors
/// `InvalidConfig` if `regime_window` is zero.
pub fn classify_regime(
    metrics: &MetricsFrame,
    regime_window: usize,
) -> Result<RegimeSeries, HedgeError> {
    let config = HedgeConfig {
        regime_window,
        ..Default::default()
    };
    classify_regime_with(metrics, &config)
}

/// Classify every timestep using the window and band factors from `config`.
///
/// # Errors
/// `InvalidConfig` if `config` fails validation, e.g. a zero `regime_window`.
pub fn classify_regime_with(
    metrics: &MetricsFrame,
    config: &HedgeConfig,
) -> Result<RegimeSeries, HedgeError> {
    config.validate()?;
    let means = rolling_mean(&metrics.vol_ratio, config.regime_window)?;

    let regimes: RegimeSeries = metrics
        .vol_ratio
        .iter()
        .zip(means.iter())
        .map(|(ratio, mean)| {
            classify_point(
                *ratio,
                *mean,
                config.low_regime_factor,
                config.high_regime_factor,
            )
        })
        .collect();

    let counts = RegimeCounts::tally(&regimes);
    debug!(
        regime_window = config.regime_window,
        low = counts.low,
        normal = counts.normal,
        high = counts.high,
        "Classified regimes"
    );

    Ok(regimes)
}
