//! Regime-Conditioned Hedge Pipeline
//!
//! Turns three aligned price series into per-timestep hedge ratios:
//!
//! 1. [`compute_metrics`] - rolling volatilities, correlations and the
//!    realized-vs-theoretical spread volatility ratio
//! 2. [`classify_regime`] - LOW / NORMAL / HIGH label from the ratio and its
//!    trailing mean
//! 3. [`generate_hedge_ratios`] - regime table lookup, element-wise
//!
//! The backtest that consumes these lives in [`crate::backtest`].
//!
//! # Example
//!
//! ```ignore
//! use spreadhedge::hedge::{classify_regime, compute_metrics, generate_hedge_ratios};
//!
//! let metrics = compute_metrics(&asset, &hedge_a, &hedge_b, 21)?;
//! let regimes = classify_regime(&metrics, 63)?;
//! let ratios = generate_hedge_ratios(&metrics, &regimes)?;
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod ratios;
pub mod regime;

pub use config::{HedgeConfig, TRADING_DAYS_PER_YEAR};
pub use error::HedgeError;
pub use metrics::{compute_metrics, MetricsFrame};
pub use ratios::{generate_hedge_ratios, HedgeRatios};
pub use regime::{classify_regime, classify_regime_with};
