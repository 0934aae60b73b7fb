//! A collection of daily bars for a single symbol.

use chrono::NaiveDate;

use crate::models::bar::Bar;

/// Represents a complete set of daily bars for a single symbol.
///
/// Bars are expected in strictly increasing date order; non-trading days are
/// simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "SPY", "AAPL").
    pub symbol: String,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    /// True when every date is strictly greater than the one before it.
    pub fn is_strictly_increasing(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }
}
