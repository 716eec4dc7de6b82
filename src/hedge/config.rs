//! Configuration for the hedge pipeline

use super::error::HedgeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trading days per year, used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Immutable parameter set passed into every pipeline stage.
///
/// Thresholds are supplied by the caller; nothing here is fitted from data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeConfig {
    /// Lookback for rolling volatilities and correlations (periods)
    #[serde(default = "default_vol_window")]
    pub vol_window: usize,

    /// Lookback for the rolling mean of the volatility ratio (periods)
    #[serde(default = "default_regime_window")]
    pub regime_window: usize,

    /// Reserved for a rebalancing-cost model. Validated but never consulted.
    #[serde(default = "default_rebalance_threshold")]
    pub rebalance_threshold: f64,

    /// Ratio below `low_regime_factor * mean` classifies LOW
    #[serde(default = "default_low_regime_factor")]
    pub low_regime_factor: f64,

    /// Ratio above `high_regime_factor * mean` classifies HIGH
    #[serde(default = "default_high_regime_factor")]
    pub high_regime_factor: f64,
}

// Default value functions for serde
fn default_vol_window() -> usize {
    21
}
fn default_regime_window() -> usize {
    63
}
fn default_rebalance_threshold() -> f64 {
    0.15
}
fn default_low_regime_factor() -> f64 {
    0.8
}
fn default_high_regime_factor() -> f64 {
    1.2
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            vol_window: default_vol_window(),
            regime_window: default_regime_window(),
            rebalance_threshold: default_rebalance_threshold(),
            low_regime_factor: default_low_regime_factor(),
            high_regime_factor: default_high_regime_factor(),
        }
    }
}

impl HedgeConfig {
    /// Create a config with custom windows and default thresholds
    pub fn with_windows(vol_window: usize, regime_window: usize) -> Self {
        Self {
            vol_window,
            regime_window,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HedgeError> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Minimum series length for every output column to warm up
    pub fn warmup_len(&self) -> usize {
        self.vol_window.max(self.regime_window) + 1
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), HedgeError> {
        if self.vol_window == 0 {
            return Err(HedgeError::InvalidConfig(
                "vol_window must be at least 1".to_string(),
            ));
        }
        if self.regime_window == 0 {
            return Err(HedgeError::InvalidConfig(
                "regime_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rebalance_threshold) {
            return Err(HedgeError::InvalidConfig(format!(
                "rebalance_threshold must be between 0.0 and 1.0, got {}",
                self.rebalance_threshold
            )));
        }
        if !self.low_regime_factor.is_finite()
            || !self.high_regime_factor.is_finite()
            || self.low_regime_factor <= 0.0
            || self.low_regime_factor > 1.0
            || self.high_regime_factor < 1.0
        {
            return Err(HedgeError::InvalidConfig(format!(
                "regime factors must satisfy 0 < low <= 1 <= high, got low={} high={}",
                self.low_regime_factor, self.high_regime_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = HedgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vol_window, 21);
        assert_eq!(config.regime_window, 63);
        assert_eq!(config.rebalance_threshold, 0.15);
        assert_eq!(config.warmup_len(), 64);
    }

    #[test]
    fn test_zero_window_invalid() {
        let config = HedgeConfig::with_windows(0, 63);
        assert!(config.validate().is_err());

        let config = HedgeConfig::with_windows(21, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rebalance_threshold_out_of_range() {
        let config = HedgeConfig {
            rebalance_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_regime_factors_invalid() {
        let config = HedgeConfig {
            low_regime_factor: 1.3,
            high_regime_factor: 0.7,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: HedgeConfig = serde_json::from_str(r#"{"vol_window": 10}"#).unwrap();
        assert_eq!(config.vol_window, 10);
        assert_eq!(config.regime_window, 63);
        assert_eq!(config.high_regime_factor, 1.2);
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hedge.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"regime_window": 0}}"#).unwrap();

        let err = HedgeConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, HedgeError::InvalidConfig(_)));
    }
}
