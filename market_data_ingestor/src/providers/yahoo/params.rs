use chrono::NaiveDate;

use crate::models::BarsRequestParams;

/// Daily bars only; the pipeline never asks for intraday data.
pub const DAILY_INTERVAL: &str = "1d";

/// Seconds since the Unix epoch at midnight UTC of `date`.
pub fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Builds the query string for a chart request.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    vec![
        ("period1".to_string(), unix_midnight(params.start).to_string()),
        ("period2".to_string(), unix_midnight(params.end).to_string()),
        ("interval".to_string(), DAILY_INTERVAL.to_string()),
        ("includePrePost".to_string(), "false".to_string()),
        ("events".to_string(), "history".to_string()),
    ]
}
