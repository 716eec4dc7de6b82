//! Aggregate statistics over series with gaps.
//!
//! Undefined entries are skipped rather than treated as zero.

use serde::Serialize;

/// Defined values of a series, in order
pub fn defined_values(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Arithmetic mean; `None` for an empty input
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation (n-1 denominator); `None` below two observations
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let m = xs.iter().sum::<f64>() / n;
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Quantile of pre-sorted data using linear interpolation between order statistics
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Summary of a series in the shape of a `describe()` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Describe the defined values of a series
    pub fn from_series(values: &[Option<f64>]) -> Self {
        let mut xs = defined_values(values);
        let mean = mean(&xs);
        let std = sample_std(&xs);
        xs.sort_by(|a, b| a.total_cmp(b));

        Self {
            count: xs.len(),
            mean,
            std,
            min: xs.first().copied(),
            q25: quantile_sorted(&xs, 0.25),
            median: quantile_sorted(&xs, 0.5),
            q75: quantile_sorted(&xs, 0.75),
            max: xs.last().copied(),
        }
    }
}
