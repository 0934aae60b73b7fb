//! Canonical in-memory representation of a daily price bar (OHLCV).
//!
//! This struct is the standard output of every
//! [`DataProvider`](crate::providers::DataProvider) implementation, whatever
//! the upstream source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily bar (OHLCV) for one trading date.
///
/// This struct is vendor-agnostic and is used throughout the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The trading date this bar covers, in the exchange's local calendar.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the session.
    pub volume: u64,
}

impl Bar {
    /// Builds a bar where open, high, low and close all equal `close`.
    ///
    /// Handy for sources (and tests) that only carry closing prices.
    pub fn from_close(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}
