//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching daily bar data from any source (the Yahoo chart API, a local CSV file).
//!
//! Each concrete provider handles its own transport and parsing, and reports failures
//! through [`ProviderError`]. Callers that only care about "data or no data" should go
//! through [`fetch_history`](crate::requests::historical::fetch_history).
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{BarSeries, BarsRequestParams};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "mine"
//!     }
//!
//!     async fn fetch_bars(
//!         &self,
//!         params: &BarsRequestParams,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(params.symbol.clone(), vec![]))
//!     }
//! }
//! ```

pub mod csv_file;
pub mod yahoo;

use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{BarSeries, BarsRequestParams};

pub use csv_file::CsvFileProvider;
pub use yahoo::YahooProvider;

/// Trait for fetching daily bar data from a market data source.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetches daily bars for the given request parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - Bars inside `[params.start, params.end)`, ascending by date.
    ///   May be empty.
    /// * `Err(ProviderError)` - If the transport or the payload failed.
    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., unknown symbol).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The response body could not be decoded.
    #[snafu(display("Malformed response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A local source file could not be opened or read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    SourceRead {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// A row in a local source file was unusable.
    #[snafu(display("Invalid row {row} in {}: {message}", path.display()))]
    InvalidRow {
        path: PathBuf,
        row: usize,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Bar;

    struct FixedProvider;
    struct FailingProvider;

    #[async_trait]
    impl DataProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
            Ok(BarSeries::new(
                params.symbol.clone(),
                vec![Bar::from_close(params.start, 10.0, 100)],
            ))
        }
    }

    #[async_trait]
    impl DataProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_bars(&self, _params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
            ApiSnafu {
                message: "boom".to_string(),
            }
            .fail()
        }
    }

    // This function decides AT RUNTIME which provider to give back.
    fn get_provider(name: &str) -> Box<dyn DataProvider> {
        if name == "fixed" {
            Box::new(FixedProvider)
        } else {
            Box::new(FailingProvider)
        }
    }

    fn params() -> BarsRequestParams {
        BarsRequestParams {
            symbol: "SPY".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider = get_provider("fixed");
        let series = provider.fetch_bars(&params()).await.unwrap();
        assert_eq!(series.symbol, "SPY");
        assert_eq!(series.len(), 1);

        let provider = get_provider("failing");
        let err = provider.fetch_bars(&params()).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: boom");
    }
}
