//! Regime-conditioned hedge ratio assignment.
//!
//! | Regime | ratio_a                   | ratio_b |
//! |--------|---------------------------|---------|
//! | LOW    | 1.0                       | 0.3     |
//! | NORMAL | 1.0 × vol ratio           | 0.2     |
//! | HIGH   | 1.0 × vol ratio × 1.2     | 0.1     |
//!
//! The mapping is applied element-wise over index-aligned (ratio, regime) pairs.

use super::error::HedgeError;
use super::metrics::MetricsFrame;
use crate::types::Regime;

use serde::Serialize;
use tracing::debug;

/// Hedge ratio to instrument A before any volatility scaling
pub const BASE_HEDGE_RATIO: f64 = 1.0;

/// Extra scaling of the A-leg in a HIGH regime
pub const HIGH_REGIME_MULTIPLIER: f64 = 1.2;

/// Secondary (instrument B) ratio for each regime
pub fn secondary_ratio(regime: Regime) -> f64 {
    match regime {
        Regime::Low => 0.3,
        Regime::Normal => 0.2,
        Regime::High => 0.1,
    }
}

/// Primary (instrument A) ratio for one timestep.
///
/// LOW ignores the live ratio. NORMAL and HIGH scale by it, so an undefined
/// ratio yields an undefined hedge rather than falling back to the base.
pub fn primary_ratio(regime: Regime, vol_ratio: Option<f64>) -> Option<f64> {
    match regime {
        Regime::Low => Some(BASE_HEDGE_RATIO),
        Regime::Normal => vol_ratio.map(|r| BASE_HEDGE_RATIO * r),
        Regime::High => vol_ratio.map(|r| BASE_HEDGE_RATIO * r * HIGH_REGIME_MULTIPLIER),
    }
}

/// Per-timestep hedge ratios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeRatios {
    /// Ratio applied to hedge instrument A
    pub ratio_a: Vec<Option<f64>>,
    /// Ratio applied to hedge instrument B; defined for every regime
    pub ratio_b: Vec<f64>,
}

impl HedgeRatios {
    pub fn len(&self) -> usize {
        self.ratio_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratio_b.is_empty()
    }

    /// `ratio_b` in the same gap-aware shape as `ratio_a`
    pub fn ratio_b_series(&self) -> Vec<Option<f64>> {
        self.ratio_b.iter().copied().map(Some).collect()
    }
}

/// Map every (vol ratio, regime) pair to its hedge ratios.
///
/// # Errors
/// `Alignment` if `regimes` is not index-aligned with `metrics`.
pub fn generate_hedge_ratios(
    metrics: &MetricsFrame,
    regimes: &[Regime],
) -> Result<HedgeRatios, HedgeError> {
    if metrics.vol_ratio.len() != regimes.len() {
        return Err(HedgeError::Alignment(format!(
            "metrics has {} rows but regime series has {}",
            metrics.vol_ratio.len(),
            regimes.len()
        )));
    }

    let (ratio_a, ratio_b): (Vec<Option<f64>>, Vec<f64>) = metrics
        .vol_ratio
        .iter()
        .zip(regimes.iter())
        .map(|(ratio, regime)| (primary_ratio(*regime, *ratio), secondary_ratio(*regime)))
        .unzip();

    debug!(
        rows = ratio_b.len(),
        undefined_primary = ratio_a.iter().filter(|r| r.is_none()).count(),
        "Generated hedge ratios"
    );

    Ok(HedgeRatios { ratio_a, ratio_b })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-12).unwrap_or(false)
    }

    #[test]
    fn test_table_with_literal_ratio() {
        let r = Some(1.10);

        assert!(approx(primary_ratio(Regime::Normal, r), 1.10));
        assert_eq!(secondary_ratio(Regime::Normal), 0.20);

        assert!(approx(primary_ratio(Regime::High, r), 1.32));
        assert_eq!(secondary_ratio(Regime::High), 0.10);

        assert_eq!(primary_ratio(Regime::Low, r), Some(1.0));
        assert_eq!(secondary_ratio(Regime::Low), 0.30);
    }

    #[test]
    fn test_undefined_ratio_propagates_outside_low() {
        assert_eq!(primary_ratio(Regime::Normal, None), None);
        assert_eq!(primary_ratio(Regime::High, None), None);
        assert_eq!(primary_ratio(Regime::Low, None), Some(BASE_HEDGE_RATIO));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let frame = MetricsFrame {
            dates: vec![],
            vol_asset: vec![],
            vol_hedge_a: vec![],
            vol_hedge_b: vec![],
            spread_vol: vec![],
            theoretical_spread_vol: vec![],
            vol_ratio: vec![Some(1.0)],
            corr_asset_hedge_a: vec![],
            corr_asset_hedge_b: vec![],
        };
        let err = generate_hedge_ratios(&frame, &[]).unwrap_err();
        assert!(matches!(err, HedgeError::Alignment(_)));
    }

    #[test]
    fn test_element_wise_series() {
        let frame = MetricsFrame {
            dates: vec![],
            vol_asset: vec![],
            vol_hedge_a: vec![],
            vol_hedge_b: vec![],
            spread_vol: vec![],
            theoretical_spread_vol: vec![],
            vol_ratio: vec![None, Some(0.9), Some(1.5), Some(0.5)],
            corr_asset_hedge_a: vec![],
            corr_asset_hedge_b: vec![],
        };
        let regimes = [Regime::Normal, Regime::Normal, Regime::High, Regime::Low];
        let ratios = generate_hedge_ratios(&frame, &regimes).unwrap();

        assert_eq!(ratios.len(), 4);
        assert_eq!(ratios.ratio_a[0], None);
        assert!(approx(ratios.ratio_a[1], 0.9));
        assert!(approx(ratios.ratio_a[2], 1.8));
        assert_eq!(ratios.ratio_a[3], Some(1.0));
        assert_eq!(ratios.ratio_b, vec![0.2, 0.2, 0.1, 0.3]);
        assert_eq!(ratios.ratio_b_series()[2], Some(0.1));
    }
}
