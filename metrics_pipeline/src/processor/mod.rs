//! Raw daily bars in, enriched feature table out.
//!
//! [`process`] appends four derived columns to a [`BarSeries`]:
//!
//! - `Daily_Return`: simple percentage change of the close, undefined on the first row;
//! - `SMA_{short}` and `SMA_{long}`: trailing simple moving averages of the close;
//! - `Volatility_{n}d`: trailing sample standard deviation of the daily returns.
//!
//! All windows are trailing (the value at row `t` only looks at rows `..=t`).
//! Rows inside a window's warm-up keep an explicit `None` so the output always
//! lines up one-to-one with the input dates.

pub mod columns;
pub mod enriched;
pub mod rolling;
pub mod window;

use market_data_ingestor::models::{Bar, BarSeries};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use columns::{ColumnKey, Indicator, UnknownColumn};
pub use enriched::{EnrichedRow, EnrichedSeries};
pub use window::WindowConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    /// Zero rows is the only rejected input; short series just stay in warm-up longer.
    #[error("Invalid input: no raw data for {symbol:?}")]
    InvalidInput { symbol: String },

    #[error("Invalid window: the {name} window must be a positive integer")]
    InvalidWindow { name: &'static str },
}

/// Computes the enriched series for `raw`.
///
/// `raw` is left untouched. Its bars are copied, sorted by date and
/// de-duplicated (the last bar of a repeated date wins) before any window is
/// evaluated.
pub fn process(raw: &BarSeries, windows: WindowConfig) -> Result<EnrichedSeries, ProcessError> {
    if raw.is_empty() {
        error!(symbol = %raw.symbol, "no raw data to process");
        return Err(ProcessError::InvalidInput {
            symbol: raw.symbol.clone(),
        });
    }

    info!(
        symbol = %raw.symbol,
        rows = raw.len(),
        short = %windows.short,
        long = %windows.long,
        volatility = %windows.volatility,
        "processing series"
    );

    let bars = normalize(&raw.bars);
    if bars.len() != raw.len() {
        warn!(
            symbol = %raw.symbol,
            dropped = raw.len() - bars.len(),
            "duplicate dates collapsed"
        );
    }

    let closes: Vec<Option<f64>> = bars
        .iter()
        .map(|b| Some(b.close).filter(|c| c.is_finite()))
        .collect();
    let returns = rolling::pct_change(&closes);
    let sma_short = rolling::trailing_mean(&closes, windows.short);
    let sma_long = if windows.long == windows.short {
        sma_short.clone()
    } else {
        rolling::trailing_mean(&closes, windows.long)
    };
    let volatility = rolling::trailing_sample_std(&returns, windows.volatility);

    let rows: Vec<EnrichedRow> = bars
        .into_iter()
        .enumerate()
        .map(|(t, bar)| EnrichedRow {
            bar,
            daily_return: returns[t],
            sma_short: sma_short[t],
            sma_long: sma_long[t],
            volatility: volatility[t],
        })
        .collect();

    debug!(
        symbol = %raw.symbol,
        first_sma_long = ?rows.iter().position(|r| r.sma_long.is_some()),
        first_volatility = ?rows.iter().position(|r| r.volatility.is_some()),
        "warm-up finished"
    );
    info!(symbol = %raw.symbol, rows = rows.len(), "metrics computed");

    Ok(EnrichedSeries {
        symbol: raw.symbol.clone(),
        windows,
        rows,
    })
}

/// Ascending by date, one bar per date.
fn normalize(bars: &[Bar]) -> Vec<Bar> {
    let mut sorted = bars.to_vec();
    // Stable, so "last wins" below refers to input order among equal dates.
    sorted.sort_by_key(|b| b.date);

    let mut out: Vec<Bar> = Vec::with_capacity(sorted.len());
    for bar in sorted {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use chrono::NaiveDate;

    use super::*;

    const EPS: f64 = 1e-9;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(n))
    }

    fn series_of(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::from_close(day(i as u32), c, 1_000))
            .collect();
        BarSeries::new("TEST", bars)
    }

    fn windows(short: usize, long: usize, vol: usize) -> WindowConfig {
        WindowConfig::new(short, long, vol).unwrap()
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let v = actual.expect("expected a defined value");
        assert!((v - expected).abs() < EPS, "{v} != {expected}");
    }

    #[test]
    fn five_day_scenario() {
        let raw = series_of(&[100.0, 102.0, 101.0, 105.0, 104.0]);
        let out = process(&raw, windows(2, 3, 2)).unwrap();
        assert_eq!(out.len(), 5);

        let sma_short: Vec<_> = out.rows.iter().map(|r| r.sma_short).collect();
        assert_eq!(sma_short[0], None);
        approx(sma_short[1], 101.0);
        approx(sma_short[2], 101.5);
        approx(sma_short[3], 103.0);
        approx(sma_short[4], 104.5);

        assert_eq!(out.rows[0].sma_long, None);
        assert_eq!(out.rows[1].sma_long, None);
        approx(out.rows[2].sma_long, 101.0);
        approx(out.rows[4].sma_long, 310.0 / 3.0);

        assert_eq!(out.rows[0].daily_return, None);
        approx(out.rows[1].daily_return, 0.02);
        approx(out.rows[2].daily_return, -1.0 / 102.0);
        approx(out.rows[3].daily_return, 4.0 / 101.0);
        approx(out.rows[4].daily_return, -1.0 / 105.0);
        assert!((out.rows[2].daily_return.unwrap() - (-0.0098)).abs() < 1e-4);
        assert!((out.rows[3].daily_return.unwrap() - 0.0396).abs() < 1e-4);
        assert!((out.rows[4].daily_return.unwrap() - (-0.0095)).abs() < 1e-4);

        assert_eq!(out.rows[0].volatility, None);
        assert_eq!(out.rows[1].volatility, None);
        // Sample std of two values is |a - b| / sqrt(2).
        let (r1, r2): (f64, f64) = (0.02, -1.0 / 102.0);
        approx(out.rows[2].volatility, (r1 - r2).abs() / 2f64.sqrt());
        assert!(out.rows[3..].iter().all(|r| r.volatility.is_some()));
    }

    #[test]
    fn empty_series_is_invalid_input() {
        let raw = BarSeries::new("EMPTY", vec![]);
        assert_eq!(
            process(&raw, windows(2, 3, 2)),
            Err(ProcessError::InvalidInput {
                symbol: "EMPTY".into()
            })
        );
    }

    #[test]
    fn series_shorter_than_long_window_is_not_an_error() {
        let raw = series_of(&[10.0, 11.0, 12.0]);
        let out = process(&raw, windows(2, 50, 2)).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.rows.iter().all(|r| r.sma_long.is_none()));
        assert!(out.rows[1].sma_short.is_some());
    }

    #[test]
    fn every_window_longer_than_series_leaves_all_derived_undefined() {
        let raw = series_of(&[10.0, 11.0]);
        let out = process(&raw, windows(5, 10, 5)).unwrap();
        for row in &out.rows {
            assert_eq!(row.sma_short, None);
            assert_eq!(row.sma_long, None);
            assert_eq!(row.volatility, None);
        }
        approx(out.rows[1].daily_return, 0.1);
    }

    #[test]
    fn enormous_long_window_is_all_undefined() {
        let out = process(&series_of(&[42.0]), windows(2, usize::MAX / 16, 2)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows[0].sma_long, None);
        assert_eq!(out.windows.long.get(), usize::MAX / 16);
    }

    #[test]
    fn single_row_series() {
        let out = process(&series_of(&[42.0]), windows(1, 1, 1)).unwrap();
        assert_eq!(out.len(), 1);
        approx(out.rows[0].sma_short, 42.0);
        assert_eq!(out.rows[0].daily_return, None);
        assert_eq!(out.rows[0].volatility, None);
    }

    #[test]
    fn unordered_input_is_sorted_without_touching_the_original() {
        let mut raw = series_of(&[1.0, 2.0, 3.0]);
        raw.bars.swap(0, 2);
        let before = raw.clone();

        let out = process(&raw, windows(1, 2, 2)).unwrap();

        assert_eq!(raw, before);
        let dates: Vec<_> = out.dates().collect();
        assert_eq!(dates, vec![day(0), day(1), day(2)]);
        approx(out.rows[1].daily_return, 1.0);
    }

    #[test]
    fn duplicate_dates_keep_the_last_bar() {
        let mut raw = series_of(&[1.0, 2.0]);
        raw.bars.push(Bar::from_close(day(1), 4.0, 9));
        let out = process(&raw, windows(1, 2, 2)).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[1].bar.close, 4.0);
        approx(out.rows[1].daily_return, 3.0);
    }

    #[test]
    fn non_finite_close_is_missing_data() {
        let raw = series_of(&[10.0, f64::NAN, 12.0, 13.0, 14.0]);
        let out = process(&raw, windows(2, 3, 2)).unwrap();

        assert_eq!(out.rows[1].daily_return, None);
        assert_eq!(out.rows[2].daily_return, None);
        approx(out.rows[3].daily_return, 1.0 / 12.0);
        assert_eq!(out.rows[2].sma_short, None);
        approx(out.rows[3].sma_short, 12.5);
        assert_eq!(out.rows[3].sma_long, None);
        approx(out.rows[4].sma_long, 13.0);
        // Returns are defined again from row 3, so a 2-wide window is full at row 4.
        assert_eq!(out.rows[3].volatility, None);
        assert!(out.rows[4].volatility.is_some());
    }

    #[test]
    fn volatility_is_never_negative() {
        let raw = series_of(&[5.0, 5.0, 5.0, 5.0]);
        let out = process(&raw, windows(2, 3, 2)).unwrap();
        assert_eq!(out.rows[3].volatility, Some(0.0));
    }

    #[test]
    fn zero_windows_are_rejected() {
        assert_eq!(
            WindowConfig::new(0, 3, 2),
            Err(ProcessError::InvalidWindow { name: "short" })
        );
        assert_eq!(
            WindowConfig::new(2, 3, 0),
            Err(ProcessError::InvalidWindow { name: "volatility" })
        );
        let w = windows(2, 3, 4);
        assert_eq!(w.long, NonZeroUsize::new(3).unwrap());
    }
}
