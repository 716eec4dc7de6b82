//! Trailing-window statistics over series with gaps.
//!
//! Every function returns one output per input position. A position is `None`
//! unless the full trailing window ending there is defined: polars runs with
//! `min_periods == window_size`, so a window holding a null never fills.

use polars::prelude::*;
use std::any::Any;
use std::sync::Arc;

fn fixed_window(window: usize, fn_params: DynArgs) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        weights: None,
        center: false,
        fn_params,
    }
}

fn collect_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    Ok(series.f64()?.into_iter().collect())
}

/// Rolling arithmetic mean
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> PolarsResult<Vec<Option<f64>>> {
    if window == 0 {
        return Ok(vec![None; values.len()]);
    }
    let series = Series::new("values", values);
    collect_f64(&series.rolling_mean(fixed_window(window, None))?)
}

/// Rolling population standard deviation (divides by the window length)
pub fn rolling_std(values: &[Option<f64>], window: usize) -> PolarsResult<Vec<Option<f64>>> {
    if window == 0 {
        return Ok(vec![None; values.len()]);
    }
    let population = Arc::new(RollingVarParams { ddof: 0 }) as Arc<dyn Any + Send + Sync>;
    let series = Series::new("values", values);
    collect_f64(&series.rolling_std(fixed_window(window, Some(population)))?)
}

/// Collect the window ending at `end` (inclusive) if every value in it is defined.
fn full_window(values: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || end + 1 < window {
        return None;
    }
    values[end + 1 - window..=end].iter().copied().collect()
}

fn mean_of(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Pearson correlation of two equally sized windows.
///
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
///
/// Undefined when either side has zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let mean_a = mean_of(a);
    let mean_b = mean_of(b);

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    let correlation = covariance / (var_a.sqrt() * var_b.sqrt());
    correlation.is_finite().then_some(correlation)
}

/// Rolling Pearson correlation between two index-aligned series.
///
/// Errors with `ShapeMismatch` if the two series differ in length.
pub fn rolling_correlation(
    a: &[Option<f64>],
    b: &[Option<f64>],
    window: usize,
) -> PolarsResult<Vec<Option<f64>>> {
    polars_ensure!(
        a.len() == b.len(),
        ShapeMismatch: "rolling correlation needs equal lengths, got {} and {}", a.len(), b.len()
    );
    Ok((0..a.len())
        .map(|i| {
            let xs = full_window(a, i, window)?;
            let ys = full_window(b, i, window)?;
            pearson(&xs, &ys)
        })
        .collect())
}
