//! Common Types Module
//!
//! Shared types used across the codebase to avoid circular dependencies.

use crate::hedge::HedgeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Volatility regime label for a single timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    Low,
    #[default]
    Normal,
    High,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Low => write!(f, "LOW"),
            Regime::Normal => write!(f, "NORMAL"),
            Regime::High => write!(f, "HIGH"),
        }
    }
}

/// One regime label per timestep, index-aligned with the metrics frame.
pub type RegimeSeries = Vec<Regime>;

/// Tally of regime labels over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegimeCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

impl RegimeCounts {
    pub fn tally(regimes: &[Regime]) -> Self {
        regimes.iter().fold(Self::default(), |mut acc, regime| {
            match regime {
                Regime::Low => acc.low += 1,
                Regime::Normal => acc.normal += 1,
                Regime::High => acc.high += 1,
            }
            acc
        })
    }
}

/// Date-indexed closing prices for one instrument.
///
/// Construction guarantees a strictly increasing index and positive, finite prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PriceSeries {
    /// Build a validated series.
    ///
    /// # Errors
    /// - `Alignment` if `dates` and `values` differ in length
    /// - `UnsortedIndex` if the dates are not strictly increasing
    /// - `InvalidPrice` for any non-positive or non-finite price
    pub fn new(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, HedgeError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(HedgeError::Alignment(format!(
                "'{}' has {} dates but {} prices",
                name,
                dates.len(),
                values.len()
            )));
        }
        if let Some(index) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(HedgeError::UnsortedIndex {
                series: name,
                index: index + 1,
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v <= 0.0)
        {
            return Err(HedgeError::InvalidPrice {
                series: name,
                index,
                value,
            });
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Simple period-over-period returns. Element 0 has no prior observation.
    pub fn returns(&self) -> Vec<Option<f64>> {
        if self.values.is_empty() {
            return Vec::new();
        }
        std::iter::once(None)
            .chain(self.values.windows(2).map(|w| Some(w[1] / w[0] - 1.0)))
            .collect()
    }

    fn select(&self, keep: &HashSet<NaiveDate>) -> Self {
        let (dates, values) = self
            .dates
            .iter()
            .zip(self.values.iter())
            .filter(|(d, _)| keep.contains(d))
            .map(|(d, v)| (*d, *v))
            .unzip();
        Self {
            name: self.name.clone(),
            dates,
            values,
        }
    }
}

/// Check that three series share an identical date index.
pub fn ensure_aligned(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
) -> Result<(), HedgeError> {
    for other in [hedge_a, hedge_b] {
        if other.len() != asset.len() {
            return Err(HedgeError::Alignment(format!(
                "'{}' has {} rows but '{}' has {}",
                asset.name(),
                asset.len(),
                other.name(),
                other.len()
            )));
        }
        if let Some(index) = asset
            .dates()
            .iter()
            .zip(other.dates())
            .position(|(a, b)| a != b)
        {
            return Err(HedgeError::Alignment(format!(
                "'{}' and '{}' disagree on the date at index {}",
                asset.name(),
                other.name(),
                index
            )));
        }
    }
    Ok(())
}

/// Inner-join three series on their common dates.
///
/// Returns copies restricted to the dates present in all three inputs, in order.
pub fn align_series(
    asset: &PriceSeries,
    hedge_a: &PriceSeries,
    hedge_b: &PriceSeries,
) -> (PriceSeries, PriceSeries, PriceSeries) {
    let in_a: HashSet<NaiveDate> = hedge_a.dates().iter().copied().collect();
    let in_b: HashSet<NaiveDate> = hedge_b.dates().iter().copied().collect();
    let common: HashSet<NaiveDate> = asset
        .dates()
        .iter()
        .filter(|d| in_a.contains(d) && in_b.contains(d))
        .copied()
        .collect();

    let dropped = asset.len() + hedge_a.len() + hedge_b.len() - 3 * common.len();
    if dropped > 0 {
        tracing::debug!(common = common.len(), dropped, "Aligned series on common dates");
    }

    (
        asset.select(&common),
        hedge_a.select(&common),
        hedge_b.select(&common),
    )
}
