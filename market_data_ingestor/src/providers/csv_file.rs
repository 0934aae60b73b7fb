//! Local CSV source for offline runs.
//!
//! Expects a header row naming at least `Date`, `Open`, `High`, `Low`, `Close`
//! and `Volume` (any case, any column order; extra columns are ignored). Dates
//! may carry a time suffix (`2024-01-02 00:00:00-05:00`); only the calendar
//! part is used. A session with a blank price or volume cell is skipped, the
//! same way the Yahoo provider drops null sessions.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{Bar, BarSeries, BarsRequestParams},
    providers::{DataProvider, InvalidRowSnafu, ProviderError, SourceReadSnafu},
};

const REQUIRED: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads every bar in the file, in file order.
    pub fn read_all(&self) -> Result<Vec<Bar>, ProviderError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .context(SourceReadSnafu { path: &self.path })?;

        let headers = reader
            .headers()
            .context(SourceReadSnafu { path: &self.path })?
            .clone();
        let mut index = [0usize; 6];
        for (slot, name) in index.iter_mut().zip(REQUIRED) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    InvalidRowSnafu {
                        path: &self.path,
                        row: 1usize,
                        message: format!("missing column {name:?}"),
                    }
                    .build()
                })?;
        }

        let mut bars = Vec::new();
        for (i, record) in reader.records().enumerate() {
            // Header is row 1.
            let row = i + 2;
            let record = record.context(SourceReadSnafu { path: &self.path })?;
            let cell = |slot: usize| record.get(index[slot]).unwrap_or("");
            let invalid = |message: String| {
                InvalidRowSnafu {
                    path: &self.path,
                    row,
                    message,
                }
                .build()
            };

            let date = parse_date(cell(0))
                .ok_or_else(|| invalid(format!("bad date {:?}", cell(0))))?;
            if let Some(blank) = (1..REQUIRED.len()).find(|&slot| cell(slot).is_empty()) {
                debug!(
                    path = %self.path.display(),
                    row,
                    %date,
                    column = REQUIRED[blank],
                    "skipping incomplete session"
                );
                continue;
            }
            let mut prices = [0f64; 4];
            for (offset, price) in prices.iter_mut().enumerate() {
                let raw = cell(offset + 1);
                *price = raw
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("bad {} {:?}", REQUIRED[offset + 1], raw)))?;
            }
            let volume = parse_volume(cell(5))
                .ok_or_else(|| invalid(format!("bad volume {:?}", cell(5))))?;

            let [open, high, low, close] = prices;
            bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(bars)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_volume(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let mut bars = self.read_all()?;
        let total = bars.len();
        bars.retain(|bar| params.contains(bar.date));
        debug!(path = %self.path.display(), total, kept = bars.len(), "read local bars");
        Ok(BarSeries::new(params.symbol.clone(), bars))
    }
}
