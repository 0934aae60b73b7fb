use chrono::{Duration, Utc};
use market_data_ingestor::{
    models::BarsRequestParams,
    providers::{DataProvider, ProviderError, YahooProvider},
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn test_yahoo_provider_fetch_bars() {
    // Hits the live chart API.
    let provider = YahooProvider::new().expect("Failed to create YahooProvider");

    let today = Utc::now().date_naive();
    let params = BarsRequestParams {
        symbol: "SPY".to_string(),
        start: today - Duration::days(30),
        end: today,
    };

    let result = provider.fetch_bars(&params).await;
    assert!(result.is_ok(), "fetch_bars returned an error: {:?}", result.err());

    let series = result.unwrap();
    assert_eq!(series.symbol, "SPY");
    assert!(!series.is_empty(), "Expected at least one session for SPY");
    assert!(series.is_strictly_increasing());
    assert!(series.bars.iter().all(|b| params.contains(b.date)));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_yahoo_provider_unknown_symbol() {
    let provider = YahooProvider::new().expect("Failed to create YahooProvider");

    let today = Utc::now().date_naive();
    let params = BarsRequestParams {
        symbol: "THIS-IS-NOT-A-TICKER-123".to_string(),
        start: today - Duration::days(30),
        end: today,
    };

    let result = provider.fetch_bars(&params).await;
    assert!(matches!(result, Err(ProviderError::Api { .. })), "got {result:?}");
}

#[tokio::test]
async fn test_yahoo_provider_rejects_bad_params() {
    // Validation happens before any request is sent, so an unroutable base URL is fine.
    let provider = YahooProvider::with_base_url("http://127.0.0.1:9").unwrap();
    let today = Utc::now().date_naive();

    let empty_range = BarsRequestParams {
        symbol: "SPY".to_string(),
        start: today,
        end: today,
    };
    assert!(matches!(
        provider.fetch_bars(&empty_range).await,
        Err(ProviderError::Validation { .. })
    ));

    let path_symbol = BarsRequestParams {
        symbol: "../SPY".to_string(),
        start: today - Duration::days(1),
        end: today,
    };
    assert!(matches!(
        provider.fetch_bars(&path_symbol).await,
        Err(ProviderError::Validation { .. })
    ));
}
