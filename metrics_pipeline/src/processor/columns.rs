//! Typed column identifiers.
//!
//! Columns are looked up by [`ColumnKey`] everywhere inside the crate. The
//! textual names (`SMA_50`, `Volatility_30d`, ...) only appear where the
//! series crosses a boundary: the CSV header and the chart legend.

use std::{fmt, num::NonZeroUsize, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown column {0:?}")]
pub struct UnknownColumn(pub String);

/// A derived column: indicator kind plus the window it was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    DailyReturn,
    Sma(NonZeroUsize),
    Volatility(NonZeroUsize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    Indicator(Indicator),
}

impl ColumnKey {
    /// The raw columns, in storage order.
    pub const RAW: [ColumnKey; 6] = [
        ColumnKey::Date,
        ColumnKey::Open,
        ColumnKey::High,
        ColumnKey::Low,
        ColumnKey::Close,
        ColumnKey::Volume,
    ];

    pub const fn daily_return() -> Self {
        ColumnKey::Indicator(Indicator::DailyReturn)
    }

    pub const fn sma(window: NonZeroUsize) -> Self {
        ColumnKey::Indicator(Indicator::Sma(window))
    }

    pub const fn volatility(window: NonZeroUsize) -> Self {
        ColumnKey::Indicator(Indicator::Volatility(window))
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Date => f.write_str("Date"),
            ColumnKey::Open => f.write_str("Open"),
            ColumnKey::High => f.write_str("High"),
            ColumnKey::Low => f.write_str("Low"),
            ColumnKey::Close => f.write_str("Close"),
            ColumnKey::Volume => f.write_str("Volume"),
            ColumnKey::Indicator(Indicator::DailyReturn) => f.write_str("Daily_Return"),
            ColumnKey::Indicator(Indicator::Sma(n)) => write!(f, "SMA_{n}"),
            ColumnKey::Indicator(Indicator::Volatility(n)) => write!(f, "Volatility_{n}d"),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || UnknownColumn(s.to_string());
        let window = |digits: &str| digits.parse::<NonZeroUsize>().map_err(|_| unknown());

        let key = match name.to_ascii_lowercase().as_str() {
            "date" => ColumnKey::Date,
            "open" => ColumnKey::Open,
            "high" => ColumnKey::High,
            "low" => ColumnKey::Low,
            "close" => ColumnKey::Close,
            "volume" => ColumnKey::Volume,
            "daily_return" => ColumnKey::daily_return(),
            lower => {
                if let Some(digits) = lower.strip_prefix("sma_") {
                    ColumnKey::sma(window(digits)?)
                } else if let Some(digits) = lower
                    .strip_prefix("volatility_")
                    .and_then(|rest| rest.strip_suffix('d'))
                {
                    ColumnKey::volatility(window(digits)?)
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn names_embed_the_window() {
        assert_eq!(ColumnKey::sma(nz(50)).to_string(), "SMA_50");
        assert_eq!(ColumnKey::volatility(nz(30)).to_string(), "Volatility_30d");
        assert_eq!(ColumnKey::daily_return().to_string(), "Daily_Return");
        assert_eq!(ColumnKey::Close.to_string(), "Close");
    }

    #[test]
    fn names_parse_back() {
        let keys = [
            ColumnKey::Date,
            ColumnKey::Volume,
            ColumnKey::daily_return(),
            ColumnKey::sma(nz(200)),
            ColumnKey::volatility(nz(2)),
        ];
        for key in keys {
            assert_eq!(key.to_string().parse::<ColumnKey>(), Ok(key));
        }
        assert_eq!("close".parse::<ColumnKey>(), Ok(ColumnKey::Close));
    }

    #[test]
    fn rejects_unknown_and_zero_windows() {
        assert!("SMA_0".parse::<ColumnKey>().is_err());
        assert!("SMA_x".parse::<ColumnKey>().is_err());
        assert!("Volatility_30".parse::<ColumnKey>().is_err());
        assert_eq!(
            "EMA_12".parse::<ColumnKey>(),
            Err(UnknownColumn("EMA_12".to_string()))
        );
    }
}
