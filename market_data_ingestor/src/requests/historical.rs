//! One-shot history requests, reduced to "data or no data".

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    errors::Unavailable,
    models::{BarSeries, BarsRequestParams, Period},
    providers::DataProvider,
};

/// Fetches the daily history of `symbol` over `period`, looking back from `today`.
///
/// Any provider failure and an empty result are both reported as [`Unavailable`]; the
/// underlying cause is logged and kept as the `reason` text only.
pub async fn fetch_history(
    provider: &dyn DataProvider,
    symbol: &str,
    period: &Period,
    today: NaiveDate,
) -> Result<BarSeries, Unavailable> {
    let (start, end) = period.date_range(today);
    let params = BarsRequestParams {
        symbol: symbol.to_string(),
        start,
        end,
    };
    let unavailable = |reason: String| Unavailable {
        symbol: symbol.to_string(),
        period: *period,
        reason,
    };

    info!(provider = provider.name(), symbol, %period, %start, %end, "fetching daily history");

    match provider.fetch_bars(&params).await {
        Ok(series) if series.is_empty() => {
            warn!(provider = provider.name(), symbol, %period, "source returned no rows");
            Err(unavailable("source returned no rows".to_string()))
        }
        Ok(series) => {
            info!(symbol, rows = series.len(), "download complete");
            Ok(series)
        }
        Err(e) => {
            warn!(provider = provider.name(), symbol, error = %e, "fetch failed");
            Err(unavailable(e.to_string()))
        }
    }
}
