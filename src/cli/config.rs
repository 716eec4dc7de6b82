//! CLI configuration structs bridging CLI arguments to domain types.
//!
//! These structs decouple the CLI parsing layer from the pipeline,
//! allowing command handlers to work with validated, typed configurations.

use super::{DataArgs, PipelineArgs};
use crate::hedge::{HedgeConfig, HedgeError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when turning CLI arguments into a configuration.
#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("No data source given. Pass --input <csv> or --synthetic")]
    MissingSource,

    #[error("--input and --synthetic are mutually exclusive")]
    ConflictingSource,

    #[error("Synthetic row count must be at least 2, got {0}")]
    TooFewRows(usize),

    #[error(transparent)]
    Hedge(#[from] HedgeError),
}

/// Source of the three price series
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// CSV file with one column per instrument
    Csv(PathBuf),
    /// Deterministic synthetic paths
    Synthetic { rows: usize },
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Csv(path) => write!(f, "{}", path.display()),
            DataSource::Synthetic { rows } => write!(f, "synthetic({} rows)", rows),
        }
    }
}

/// CSV column names for the date index and the three instruments
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNames {
    pub date: String,
    pub asset: String,
    pub hedge_a: String,
    pub hedge_b: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            asset: "asset".to_string(),
            hedge_a: "hedge_a".to_string(),
            hedge_b: "hedge_b".to_string(),
        }
    }
}

/// Validated configuration shared by the `backtest` and `metrics` commands.
#[derive(Debug, Clone)]
pub struct PipelineCliConfig {
    pub source: DataSource,
    pub columns: ColumnNames,
    pub hedge: HedgeConfig,
    pub output_dir: PathBuf,
}

impl PipelineCliConfig {
    /// Resolve CLI arguments: load `--config` if given, apply flag overrides, validate.
    ///
    /// # Errors
    /// Returns `CliConfigError` if the data source is missing or ambiguous, or the
    /// resulting `HedgeConfig` is invalid.
    pub fn from_args(
        data: &DataArgs,
        pipeline: &PipelineArgs,
        output_dir: &str,
    ) -> Result<Self, CliConfigError> {
        let source = match (&data.input, data.synthetic) {
            (Some(_), true) => return Err(CliConfigError::ConflictingSource),
            (Some(path), false) => DataSource::Csv(PathBuf::from(path)),
            (None, true) if data.rows < 2 => return Err(CliConfigError::TooFewRows(data.rows)),
            (None, true) => DataSource::Synthetic { rows: data.rows },
            (None, false) => return Err(CliConfigError::MissingSource),
        };

        let mut hedge = match &pipeline.config {
            Some(path) => HedgeConfig::from_json_file(path)?,
            None => HedgeConfig::default(),
        };
        if let Some(w) = pipeline.vol_window {
            hedge.vol_window = w;
        }
        if let Some(w) = pipeline.regime_window {
            hedge.regime_window = w;
        }
        if let Some(t) = pipeline.rebalance_threshold {
            hedge.rebalance_threshold = t;
        }
        hedge.validate()?;

        Ok(Self {
            source,
            columns: ColumnNames {
                date: data.date_column.clone(),
                asset: data.asset_column.clone(),
                hedge_a: data.hedge_a_column.clone(),
                hedge_b: data.hedge_b_column.clone(),
            },
            hedge,
            output_dir: PathBuf::from(output_dir),
        })
    }
}
