//! Price data loading for the command handlers.
//!
//! CSV input is read with polars; each instrument keeps only the rows where it has
//! a price, and the three series are then inner-joined on date.

use crate::cli::{ColumnNames, DataSource};
use crate::hedge::HedgeError;
use crate::types::{align_series, PriceSeries};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Date format expected in the CSV date column
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Asset, hedge A and hedge B on a shared date index
pub type PriceTriple = (PriceSeries, PriceSeries, PriceSeries);

/// Load the three series from the configured source.
pub fn load_prices(source: &DataSource, columns: &ColumnNames) -> Result<PriceTriple, HedgeError> {
    match source {
        DataSource::Csv(path) => load_csv_prices(path, columns),
        DataSource::Synthetic { rows } => generate_synthetic_prices(*rows, columns),
    }
}

/// Load historical closes from a CSV file.
///
/// # Errors
/// - `Io` / `Polars` if the file cannot be read or a column is missing
/// - `DateParse` for a date that is not `YYYY-MM-DD`
/// - `UnsortedIndex` for a duplicated date
pub fn load_csv_prices(path: &Path, columns: &ColumnNames) -> Result<PriceTriple, HedgeError> {
    info!(path = %path.display(), "Loading CSV data");
    let file = File::open(path)?;
    let df = CsvReader::new(file).finish()?;

    if df.height() == 0 {
        return Err(HedgeError::InsufficientData {
            expected: 1,
            actual: 0,
        });
    }

    let dates = date_column(&df, &columns.date)?;
    let asset = series_from_column(&df, &columns.asset, &dates)?;
    let hedge_a = series_from_column(&df, &columns.hedge_a, &dates)?;
    let hedge_b = series_from_column(&df, &columns.hedge_b, &dates)?;

    let (asset, hedge_a, hedge_b) = align_series(&asset, &hedge_a, &hedge_b);
    info!(
        file_rows = df.height(),
        aligned_rows = asset.len(),
        "CSV data loaded"
    );
    Ok((asset, hedge_a, hedge_b))
}

fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>, HedgeError> {
    let series = df.column(name)?.cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(|s| {
                    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                        .map_err(|e| HedgeError::DateParse(format!("'{}': {}", s, e)))
                })
                .transpose()
        })
        .collect()
}

/// Build one series from the rows where both the date and the price are present.
fn series_from_column(
    df: &DataFrame,
    name: &str,
    dates: &[Option<NaiveDate>],
) -> Result<PriceSeries, HedgeError> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let mut rows: Vec<(NaiveDate, f64)> = dates
        .iter()
        .zip(series.f64()?.into_iter())
        .filter_map(|(d, v)| Some(((*d)?, v?)))
        .collect();
    rows.sort_by_key(|(d, _)| *d);

    let (dates, values) = rows.into_iter().unzip();
    PriceSeries::new(name, dates, values)
}

/// Minimal linear congruential generator so synthetic runs are reproducible
struct Lcg(u64);

impl Lcg {
    fn next_uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 32) as f64) / (u32::MAX as f64) - 0.5
    }
}

/// Generate three correlated daily price paths on weekdays.
///
/// Volatility steps up and down every quarter so every regime shows up.
pub fn generate_synthetic_prices(
    rows: usize,
    columns: &ColumnNames,
) -> Result<PriceTriple, HedgeError> {
    info!(rows, "Generating synthetic data");

    let mut rng = Lcg(0x5eed_cafe);
    let mut dates = Vec::with_capacity(rows);
    let mut date = NaiveDate::from_ymd_opt(2020, 1, 1)
        .ok_or_else(|| HedgeError::DateParse("invalid synthetic start date".to_string()))?;

    let mut prices = [100.0_f64, 80.0, 40.0];
    let mut paths: [Vec<f64>; 3] = [
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
    ];

    for i in 0..rows {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
        }
        dates.push(date);
        date += Duration::days(1);

        if i > 0 {
            let vol = if (i / 63) % 3 == 1 { 0.05 } else { 0.02 };
            let common = rng.next_uniform();
            let shocks = [rng.next_uniform(), rng.next_uniform(), rng.next_uniform()];
            let returns = [
                0.0002 + vol * (0.8 * common + 0.6 * shocks[0]),
                0.0001 + vol * (0.85 * common + 0.5 * shocks[1]),
                vol * (0.4 * common + 0.9 * shocks[2]),
            ];
            for (price, r) in prices.iter_mut().zip(returns) {
                *price *= 1.0 + r;
            }
        }
        for (path, price) in paths.iter_mut().zip(prices) {
            path.push(price);
        }
    }

    let [asset, hedge_a, hedge_b] = paths;
    Ok((
        PriceSeries::new(columns.asset.clone(), dates.clone(), asset)?,
        PriceSeries::new(columns.hedge_a.clone(), dates.clone(), hedge_a)?,
        PriceSeries::new(columns.hedge_b.clone(), dates, hedge_b)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ensure_aligned;
    use std::io::Write;

    #[test]
    fn test_synthetic_is_deterministic_and_aligned() {
        let columns = ColumnNames::default();
        let (a1, b1, c1) = generate_synthetic_prices(200, &columns).unwrap();
        let (a2, _, _) = generate_synthetic_prices(200, &columns).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(a1.len(), 200);
        assert!(ensure_aligned(&a1, &b1, &c1).is_ok());
        assert!(a1
            .dates()
            .iter()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn test_csv_drops_gaps_and_aligns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "date,asset,hedge_a,hedge_b").unwrap();
        writeln!(file, "2024-01-03,101.0,51.0,20.5").unwrap();
        writeln!(file, "2024-01-02,100.0,50.0,20.0").unwrap();
        writeln!(file, "2024-01-04,102.0,,21.0").unwrap();
        writeln!(file, "2024-01-05,103.0,52.0,21.5").unwrap();
        drop(file);

        let (asset, hedge_a, hedge_b) =
            load_csv_prices(&path, &ColumnNames::default()).unwrap();
        assert_eq!(asset.len(), 3);
        assert_eq!(asset.values(), &[100.0, 101.0, 103.0]);
        assert_eq!(hedge_a.values(), &[50.0, 51.0, 52.0]);
        assert_eq!(hedge_b.values(), &[20.0, 20.5, 21.5]);
        assert_eq!(
            asset.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_csv_bad_date_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "date,asset,hedge_a,hedge_b").unwrap();
        writeln!(file, "01/02/2024,100.0,50.0,20.0").unwrap();
        drop(file);

        let err = load_csv_prices(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, HedgeError::DateParse(_)));
    }
}
