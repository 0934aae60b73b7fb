use async_trait::async_trait;
use reqwest::Client;
use shared_utils::env::get_optional_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{BarSeries, BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, ProviderError, ProviderInitError,
        ReqwestSnafu, ValidationSnafu,
        yahoo::{params::construct_params, response::ChartResponse},
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Overrides [`DEFAULT_BASE_URL`], e.g. to point at a mirror or a local stub.
pub const BASE_URL_ENV: &str = "YAHOO_CHART_BASE_URL";

// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Creates a new Yahoo provider.
    ///
    /// Reads an optional base URL override from `YAHOO_CHART_BASE_URL`.
    pub fn new() -> Result<Self, ProviderInitError> {
        let base_url =
            get_optional_env_var(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let symbol = params.symbol.trim();
        if symbol.is_empty() || symbol.contains('/') {
            return ValidationSnafu {
                message: format!("invalid symbol {:?}", params.symbol),
            }
            .fail();
        }
        if params.start >= params.end {
            return ValidationSnafu {
                message: format!("empty date range {}..{}", params.start, params.end),
            }
            .fail();
        }

        let url = self.url_for(symbol);
        debug!(%url, start = %params.start, end = %params.end, "requesting chart");

        let response = self
            .client
            .get(&url)
            .query(&construct_params(params))
            .send()
            .await
            .context(ReqwestSnafu)?;
        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        // Yahoo reports unknown symbols as a 404 carrying a chart.error object, so try the
        // body first and only fall back to the bare status.
        let chart = match serde_json::from_str::<ChartResponse>(&body) {
            Ok(parsed) => parsed.chart,
            Err(_) if !status.is_success() => {
                return ApiSnafu {
                    message: format!("HTTP {status}"),
                }
                .fail();
            }
            Err(e) => return Err(e).context(DecodeSnafu),
        };

        if let Some(err) = chart.error {
            return ApiSnafu {
                message: format!("{}: {}", err.code, err.description),
            }
            .fail();
        }

        let mut bars = chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.into_bars())
            .unwrap_or_default();
        bars.retain(|bar| params.contains(bar.date));

        debug!(rows = bars.len(), "chart decoded");
        Ok(BarSeries::new(symbol, bars))
    }
}
