use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Universal parameters for requesting daily bars from any market data provider.
///
/// It is the standard input of every
/// [`DataProvider`](crate::providers::DataProvider) implementation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g. `"SPY"`).
    pub symbol: String,

    /// First date of the requested range (inclusive).
    pub start: NaiveDate,

    /// End of the requested range (exclusive).
    ///
    /// Providers should return bars strictly before this date.
    pub end: NaiveDate,
}

impl BarsRequestParams {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}
