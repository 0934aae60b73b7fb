use thiserror::Error;

use crate::models::Period;

/// The source had nothing for the request, or could not be reached.
///
/// Callers are not meant to branch on the cause; `reason` exists for the log line
/// and the user-facing message.
#[derive(Debug, Error)]
#[error("No data for {symbol} over {period}: {reason}")]
pub struct Unavailable {
    pub symbol: String,
    pub period: Period,
    pub reason: String,
}
