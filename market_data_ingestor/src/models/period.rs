//! Relative look-back periods such as `5y` or `6mo`.

use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid amount in period {input:?}: amount must be a positive integer")]
    InvalidAmount { input: String },

    #[error("Unknown period unit {unit:?} (expected d, w, mo, y, ytd or max)")]
    UnknownUnit { unit: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

/// How far back from "today" a history request reaches.
///
/// Parses from compact descriptors (`30d`, `2w`, `6mo`, `5y`, `ytd`, `max`) and
/// long forms (`5 years`, `3 months`). Displays in the compact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Days(NonZeroU32),
    Weeks(NonZeroU32),
    Months(NonZeroU32),
    Years(NonZeroU32),
    /// From January 1st of the current year.
    YearToDate,
    /// As far back as the source goes.
    Max,
}

impl Period {
    /// Earliest date reachable by [`Period::Max`].
    pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
        Some(d) => d,
        None => unreachable!(),
    };

    /// First date covered by this period when looking back from `today`.
    ///
    /// Never earlier than [`Period::EPOCH`].
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        let start = match *self {
            Period::Days(n) => today.checked_sub_days(Days::new(u64::from(n.get()))),
            Period::Weeks(n) => today.checked_sub_days(Days::new(7 * u64::from(n.get()))),
            Period::Months(n) => today.checked_sub_months(Months::new(n.get())),
            Period::Years(n) => n
                .get()
                .checked_mul(12)
                .and_then(|m| today.checked_sub_months(Months::new(m))),
            Period::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            Period::Max => None,
        };
        start.unwrap_or(Self::EPOCH).max(Self::EPOCH)
    }

    /// Half-open `[start, end)` date range; `end` is the day after `today`.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = today.succ_opt().unwrap_or(today);
        (self.start_date(today), end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Weeks(n) => write!(f, "{n}w"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
            Period::YearToDate => f.write_str("ytd"),
            Period::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        if input.is_empty() {
            return Err(PeriodError::InvalidInput {
                message: "period cannot be empty".into(),
            });
        }

        match input.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (digits, unit) = input.split_at(split);
        let amount = digits
            .parse::<u32>()
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| PeriodError::InvalidAmount {
                input: s.to_string(),
            })?;

        match unit.trim() {
            "d" | "day" | "days" => Ok(Period::Days(amount)),
            "w" | "wk" | "week" | "weeks" => Ok(Period::Weeks(amount)),
            "mo" | "month" | "months" => Ok(Period::Months(amount)),
            "y" | "yr" | "year" | "years" => Ok(Period::Years(amount)),
            other => Err(PeriodError::UnknownUnit {
                unit: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn parses_compact_and_long_forms() {
        assert_eq!("5y".parse::<Period>().unwrap(), Period::Years(nz(5)));
        assert_eq!(" 6MO ".parse::<Period>().unwrap(), Period::Months(nz(6)));
        assert_eq!("30d".parse::<Period>().unwrap(), Period::Days(nz(30)));
        assert_eq!("2wk".parse::<Period>().unwrap(), Period::Weeks(nz(2)));
        assert_eq!("5 years".parse::<Period>().unwrap(), Period::Years(nz(5)));
        assert_eq!("ytd".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!("Max".parse::<Period>().unwrap(), Period::Max);
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert!(matches!(
            "0y".parse::<Period>(),
            Err(PeriodError::InvalidAmount { .. })
        ));
        assert!(matches!(
            "y".parse::<Period>(),
            Err(PeriodError::InvalidAmount { .. })
        ));
        assert!(matches!(
            "5m".parse::<Period>(),
            Err(PeriodError::UnknownUnit { .. })
        ));
        assert!(matches!(
            "".parse::<Period>(),
            Err(PeriodError::InvalidInput { .. })
        ));
    }

    #[test]
    fn display_is_parseable() {
        for p in ["5y", "6mo", "30d", "2w", "ytd", "max"] {
            let period: Period = p.parse().unwrap();
            assert_eq!(period.to_string(), p);
        }
    }

    #[test]
    fn start_dates_are_calendar_aware() {
        let today = date(2024, 3, 31);
        assert_eq!(Period::Years(nz(5)).start_date(today), date(2019, 3, 31));
        // Feb 2024 has 29 days; chrono clamps to the month end.
        assert_eq!(Period::Months(nz(1)).start_date(today), date(2024, 2, 29));
        assert_eq!(Period::Weeks(nz(2)).start_date(today), date(2024, 3, 17));
        assert_eq!(Period::YearToDate.start_date(today), date(2024, 1, 1));
        assert_eq!(Period::Max.start_date(today), Period::EPOCH);
        assert_eq!(Period::Years(nz(900)).start_date(today), Period::EPOCH);
    }

    #[test]
    fn range_end_is_exclusive_tomorrow() {
        let today = date(2024, 12, 31);
        let (start, end) = Period::Days(nz(1)).date_range(today);
        assert_eq!(start, date(2024, 12, 30));
        assert_eq!(end, date(2025, 1, 1));
    }
}
