pub mod backtest;
pub mod cli;
pub mod commands;
pub mod hedge;
pub mod math;
pub mod observability;
pub mod types;

pub use backtest::{run_backtest, run_backtest_with_config, BacktestResult, BacktestSummary};
pub use hedge::{
    classify_regime, compute_metrics, generate_hedge_ratios, HedgeConfig, HedgeError,
    HedgeRatios, MetricsFrame,
};
pub use types::{align_series, PriceSeries, Regime, RegimeSeries};
