//! Mathematical utilities for the hedge pipeline.
//!
//! This module provides the statistical primitives the pipeline stages are
//! built from: trailing-window statistics and gap-aware aggregates.

pub mod rolling;
pub mod stats;

pub use rolling::{pearson, rolling_correlation, rolling_mean, rolling_std};
pub use stats::{defined_values, mean, quantile_sorted, sample_std, Describe};
