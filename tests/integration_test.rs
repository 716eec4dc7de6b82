use chrono::{Duration, NaiveDate};
use spreadhedge::backtest::{run_backtest, run_backtest_with_config, simulate};
use spreadhedge::cli::ColumnNames;
use spreadhedge::commands::generate_synthetic_prices;
use spreadhedge::hedge::{
    classify_regime, compute_metrics, generate_hedge_ratios, HedgeConfig, HedgeError,
};
use spreadhedge::types::{PriceSeries, Regime};

// --- Helpers ---

fn series(name: &str, values: Vec<f64>) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let dates = (0..values.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    PriceSeries::new(name, dates, values).unwrap()
}

fn synthetic(rows: usize) -> (PriceSeries, PriceSeries, PriceSeries) {
    generate_synthetic_prices(rows, &ColumnNames::default()).unwrap()
}

// --- Tests ---

#[test]
fn test_full_pipeline_is_consistent() {
    let (asset, hedge_a, hedge_b) = synthetic(500);
    let result = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap();

    assert_eq!(result.dates.len(), 500);
    assert_eq!(result.regimes.len(), 500);
    assert_eq!(result.hedge_ratios.len(), 500);
    assert_eq!(result.drawdown.len(), 500);

    // Hedge ratios follow the regime table at every timestep
    for t in 0..500 {
        let ratio = result.metrics.vol_ratio[t];
        let (a, b) = (result.hedge_ratios.ratio_a[t], result.hedge_ratios.ratio_b[t]);
        match result.regimes[t] {
            Regime::Low => {
                assert_eq!(a, Some(1.0));
                assert_eq!(b, 0.3);
            }
            Regime::Normal => {
                assert_eq!(a, ratio);
                assert_eq!(b, 0.2);
            }
            Regime::High => {
                assert_eq!(a, ratio.map(|r| r * 1.2));
                assert_eq!(b, 0.1);
            }
        }
    }

    // Nothing defined before the volatility window fills
    assert!(result.metrics.vol_ratio[..21].iter().all(Option::is_none));
    assert!(result.hedged_returns[..21].iter().all(Option::is_none));
    assert!(result.metrics.vol_ratio[21..].iter().all(Option::is_some));

    assert_eq!(result.observations, 500 - 21);
    assert!(result.annualized_return.is_some());
    assert!(result.annualized_volatility.unwrap() > 0.0);
    assert!(result.sharpe_ratio.is_some());
    assert_eq!(result.ratio_b_stats.count, 500);
    assert_eq!(result.ratio_a_stats.count, 500 - 21);
}

#[test]
fn test_hedged_returns_match_formula() {
    let (asset, hedge_a, hedge_b) = synthetic(200);
    let result = run_backtest(&asset, &hedge_a, &hedge_b, 10, 20).unwrap();

    let ra = hedge_a.returns();
    let rb = hedge_b.returns();
    let rs = asset.returns();
    for t in 0..200 {
        let expected = match (rs[t], ra[t], rb[t], result.hedge_ratios.ratio_a[t]) {
            (Some(s), Some(a), Some(b), Some(h)) => {
                Some((s - a) - (h * a + result.hedge_ratios.ratio_b[t] * b))
            }
            _ => None,
        };
        assert_eq!(result.hedged_returns[t], expected);
    }
}

#[test]
fn test_reruns_are_identical() {
    let (asset, hedge_a, hedge_b) = synthetic(300);
    let first = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap();
    let second = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.summary()).unwrap(),
        serde_json::to_string(&second.summary()).unwrap()
    );
}

#[test]
fn test_drawdown_never_positive_and_resets_at_highs() {
    let (asset, hedge_a, hedge_b) = synthetic(400);
    let result = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap();

    let mut equity = 1.0;
    let mut peak = f64::MIN;
    for (r, dd) in result.hedged_returns.iter().zip(&result.drawdown) {
        match (r, dd) {
            (Some(r), Some(dd)) => {
                equity *= 1.0 + r;
                assert!(*dd <= 0.0);
                if equity >= peak {
                    peak = equity;
                    assert_eq!(*dd, 0.0);
                }
            }
            (None, None) => {}
            other => panic!("drawdown definedness must follow returns: {:?}", other),
        }
    }
    assert!(result.max_drawdown.unwrap() <= 0.0);
}

#[test]
fn test_constant_prices_degenerate_case() {
    let n = 100;
    let asset = series("asset", vec![50.0; n]);
    let hedge_a = series("hedge_a", vec![25.0; n]);
    let hedge_b = series("hedge_b", vec![10.0; n]);

    let result = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap();

    for t in 21..n {
        assert_eq!(result.metrics.vol_asset[t], Some(0.0));
        assert_eq!(result.metrics.vol_hedge_a[t], Some(0.0));
        assert_eq!(result.metrics.vol_hedge_b[t], Some(0.0));
        assert_eq!(result.metrics.spread_vol[t], Some(0.0));
    }
    assert!(result.metrics.vol_ratio.iter().all(Option::is_none));
    assert!(result.regimes.iter().all(|r| *r == Regime::Normal));
    // Undefined ratio under the NORMAL fallback propagates
    assert!(result.hedge_ratios.ratio_a.iter().all(Option::is_none));
    assert!(result.hedged_returns.iter().all(Option::is_none));
    assert_eq!(result.sharpe_ratio, None);
    assert_eq!(result.annualized_return, None);
    assert_eq!(result.observations, 0);
}

#[test]
fn test_short_series_is_undefined_not_zero() {
    let asset = series("asset", vec![100.0, 101.0, 99.5, 100.5, 102.0]);
    let hedge_a = series("hedge_a", vec![50.0, 50.2, 49.8, 50.1, 50.9]);
    let hedge_b = series("hedge_b", vec![20.0, 20.1, 19.9, 20.3, 20.2]);

    let metrics = compute_metrics(&asset, &hedge_a, &hedge_b, 21).unwrap();
    assert!(metrics.vol_asset.iter().all(Option::is_none));
    assert!(metrics.corr_asset_hedge_b.iter().all(Option::is_none));

    let regimes = classify_regime(&metrics, 63).unwrap();
    assert!(regimes.iter().all(|r| *r == Regime::Normal));

    let ratios = generate_hedge_ratios(&metrics, &regimes).unwrap();
    let result = simulate(&asset, &hedge_a, &hedge_b, metrics, regimes, ratios).unwrap();
    assert_eq!(result.annualized_return, None);
    assert_eq!(result.annualized_volatility, None);
    assert_eq!(result.sharpe_ratio, None);
    assert_eq!(result.max_drawdown, None);
    assert_eq!(result.ratio_a_stats.count, 0);
    assert_eq!(result.ratio_a_stats.mean, None);
    assert_eq!(result.ratio_b_stats.count, 5);
}

#[test]
fn test_misaligned_inputs_fail_without_partial_result() {
    let asset = series("asset", vec![100.0; 30]);
    let hedge_a = series("hedge_a", vec![50.0; 29]);
    let hedge_b = series("hedge_b", vec![20.0; 30]);

    let err = run_backtest(&asset, &hedge_a, &hedge_b, 21, 63).unwrap_err();
    assert!(matches!(err, HedgeError::Alignment(_)));
}

#[test]
fn test_invalid_config_rejected() {
    let (asset, hedge_a, hedge_b) = synthetic(50);
    let config = HedgeConfig {
        rebalance_threshold: -0.1,
        ..Default::default()
    };
    let err = run_backtest_with_config(&asset, &hedge_a, &hedge_b, &config).unwrap_err();
    assert!(matches!(err, HedgeError::InvalidConfig(_)));
}

#[test]
fn test_rebalance_threshold_does_not_change_output() {
    let (asset, hedge_a, hedge_b) = synthetic(250);
    let base = HedgeConfig::with_windows(15, 40);
    let other = HedgeConfig {
        rebalance_threshold: 0.9,
        ..base.clone()
    };
    let a = run_backtest_with_config(&asset, &hedge_a, &hedge_b, &base).unwrap();
    let b = run_backtest_with_config(&asset, &hedge_a, &hedge_b, &other).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_result_dataframe_shape() {
    let (asset, hedge_a, hedge_b) = synthetic(120);
    let result = run_backtest(&asset, &hedge_a, &hedge_b, 10, 30).unwrap();
    let df = result.to_dataframe().unwrap();
    assert_eq!(df.height(), 120);
    assert_eq!(df.width(), 15);
}
