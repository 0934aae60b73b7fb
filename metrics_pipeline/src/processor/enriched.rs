//! The enriched series: raw bars with the derived columns appended.

use chrono::NaiveDate;
use market_data_ingestor::models::Bar;

use crate::processor::{
    columns::{ColumnKey, Indicator},
    window::WindowConfig,
};

/// One record of the enriched series.
///
/// Derived fields are `None` while their window is warming up, or when the
/// window covers a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub bar: Bar,
    pub daily_return: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub volatility: Option<f64>,
}

impl EnrichedRow {
    /// Numeric value of `key` in this row.
    ///
    /// The outer `Option` is `None` when the column does not exist for
    /// `windows` (or is the date column); the inner one is the cell itself.
    pub fn value(&self, key: &ColumnKey, windows: &WindowConfig) -> Option<Option<f64>> {
        let cell = match *key {
            ColumnKey::Date => return None,
            ColumnKey::Open => Some(self.bar.open),
            ColumnKey::High => Some(self.bar.high),
            ColumnKey::Low => Some(self.bar.low),
            ColumnKey::Close => Some(self.bar.close),
            ColumnKey::Volume => Some(self.bar.volume as f64),
            ColumnKey::Indicator(Indicator::DailyReturn) => self.daily_return,
            ColumnKey::Indicator(Indicator::Sma(n)) if n == windows.short => self.sma_short,
            ColumnKey::Indicator(Indicator::Sma(n)) if n == windows.long => self.sma_long,
            ColumnKey::Indicator(Indicator::Volatility(n)) if n == windows.volatility => {
                self.volatility
            }
            ColumnKey::Indicator(_) => return None,
        };
        Some(cell)
    }
}

/// Output of [`process`](crate::processor::process).
///
/// Same record count and date order as the (normalized) raw input.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    pub symbol: String,
    pub windows: WindowConfig,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.bar.date)
    }

    /// Column keys in storage order.
    ///
    /// When the short and long windows are equal their SMA column is listed once.
    pub fn columns(&self) -> Vec<ColumnKey> {
        let mut columns = ColumnKey::RAW.to_vec();
        columns.push(ColumnKey::daily_return());
        columns.push(ColumnKey::sma(self.windows.short));
        if self.windows.long != self.windows.short {
            columns.push(ColumnKey::sma(self.windows.long));
        }
        columns.push(ColumnKey::volatility(self.windows.volatility));
        columns
    }

    pub fn has_column(&self, key: &ColumnKey) -> bool {
        self.columns().contains(key)
    }

    /// All cells of a numeric column, or `None` if the series has no such column.
    pub fn values(&self, key: &ColumnKey) -> Option<Vec<Option<f64>>> {
        if *key == ColumnKey::Date || !self.has_column(key) {
            return None;
        }
        self.rows
            .iter()
            .map(|row| row.value(key, &self.windows))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn series(short: usize, long: usize) -> EnrichedSeries {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        EnrichedSeries {
            symbol: "SPY".into(),
            windows: WindowConfig::new(short, long, 3).unwrap(),
            rows: vec![EnrichedRow {
                bar: Bar::from_close(date, 10.0, 7),
                daily_return: None,
                sma_short: Some(1.0),
                sma_long: Some(2.0),
                volatility: None,
            }],
        }
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn columns_follow_storage_order() {
        let names: Vec<String> = series(2, 5).columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            [
                "Date",
                "Open",
                "High",
                "Low",
                "Close",
                "Volume",
                "Daily_Return",
                "SMA_2",
                "SMA_5",
                "Volatility_3d"
            ]
        );
    }

    #[test]
    fn equal_windows_share_one_column() {
        let s = series(4, 4);
        let smas = s
            .columns()
            .into_iter()
            .filter(|c| matches!(c, ColumnKey::Indicator(Indicator::Sma(_))))
            .count();
        assert_eq!(smas, 1);
        assert_eq!(s.values(&ColumnKey::sma(nz(4))), Some(vec![Some(1.0)]));
    }

    #[test]
    fn lookup_by_key() {
        let s = series(2, 5);
        assert_eq!(s.values(&ColumnKey::sma(nz(5))), Some(vec![Some(2.0)]));
        assert_eq!(s.values(&ColumnKey::Volume), Some(vec![Some(7.0)]));
        assert_eq!(s.values(&ColumnKey::volatility(nz(3))), Some(vec![None]));
        assert_eq!(s.values(&ColumnKey::sma(nz(50))), None);
        assert_eq!(s.values(&ColumnKey::Date), None);
    }
}
