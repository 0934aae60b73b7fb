use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::models::Bar;

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    /// Absent when the range holds no sessions.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Exchange-local calendar date of a session timestamp.
fn session_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp.checked_add(gmtoffset)?, 0).map(|dt| dt.date_naive())
}

impl ChartResult {
    /// Zips the column arrays into bars, skipping sessions with any null field.
    pub fn into_bars(self) -> Vec<Bar> {
        let Some(quote) = self.indicators.quote.into_iter().next() else {
            return Vec::new();
        };
        let offset = self.meta.gmtoffset;

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
                Some(Bar {
                    date: session_date(ts, offset)?,
                    open: field(&quote.open)?,
                    high: field(&quote.high)?,
                    low: field(&quote.low)?,
                    close: field(&quote.close)?,
                    volume: quote.volume.get(i).copied().flatten()?,
                })
            })
            .collect()
    }
}
