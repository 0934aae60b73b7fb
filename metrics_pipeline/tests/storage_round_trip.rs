use std::fs;

use chrono::{Days, NaiveDate};
use market_data_ingestor::models::{Bar, BarSeries};
use metrics_pipeline::{
    processor::{EnrichedSeries, WindowConfig, process},
    storage::{CsvStore, SeriesSink, SinkError},
};

fn enriched(symbol: &str, closes: &[f64], windows: WindowConfig) -> EnrichedSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: start + Days::new(i as u64),
            open: c - 0.5,
            high: c + 1.0,
            low: c - 1.0,
            close: c,
            volume: 1_000 + i as u64,
        })
        .collect();
    process(&BarSeries::new(symbol, bars), windows).unwrap()
}

#[test]
fn header_lists_columns_in_storage_order() {
    let dir = tempfile::tempdir().unwrap();
    let series = enriched("SPY", &[1.0, 2.0, 3.0], WindowConfig::new(50, 200, 30).unwrap());
    let path = CsvStore::new(dir.path()).write(&series).unwrap();

    let text = fs::read_to_string(path).unwrap();
    let header = text.lines().next().unwrap();
    insta::assert_snapshot!(header, @"Date,Open,High,Low,Close,Volume,Daily_Return,SMA_50,SMA_200,Volatility_30d");
}

#[test]
fn write_then_load_keeps_dates_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let closes = [100.0, 102.0, 101.0, 105.0, 104.0, 103.5, 107.25];
    let original = enriched("QQQ", &closes, WindowConfig::new(2, 3, 2).unwrap());

    let path = CsvStore::new(dir.path()).write(&original).unwrap();
    let loaded = CsvStore::load(&path).unwrap();

    assert!(loaded.dates().eq(original.dates()));
    assert_eq!(loaded.columns(), original.columns());
    assert_eq!(loaded.windows, original.windows);
    for (a, b) in loaded.rows.iter().zip(&original.rows) {
        assert_eq!(a.bar, b.bar);
        assert_eq!(a.sma_short, b.sma_short);
        assert_eq!(a.sma_long, b.sma_long);
        assert_eq!(a.daily_return, b.daily_return);
        assert_eq!(a.volatility, b.volatility);
    }
}

#[test]
fn equal_windows_round_trip_through_a_single_sma_column() {
    let dir = tempfile::tempdir().unwrap();
    let original = enriched("DIA", &[1.0, 2.0, 4.0], WindowConfig::new(2, 2, 2).unwrap());

    let path = CsvStore::new(dir.path()).write(&original).unwrap();
    let header = fs::read_to_string(&path).unwrap();
    assert!(header.starts_with("Date,Open,High,Low,Close,Volume,Daily_Return,SMA_2,Volatility_2d\n"));

    let loaded = CsvStore::load(&path).unwrap();
    assert_eq!(loaded.windows, original.windows);
}

#[test]
fn rewriting_replaces_the_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path());
    let windows = WindowConfig::new(2, 3, 2).unwrap();

    store.write(&enriched("SPY", &[1.0, 2.0, 3.0, 4.0], windows)).unwrap();
    let path = store.write(&enriched("SPY", &[5.0, 6.0], windows)).unwrap();

    assert_eq!(CsvStore::load(&path).unwrap().len(), 2);
    // Only the final file remains; temp files are renamed or removed.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn symbol_with_path_separator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let series = enriched("../escape", &[1.0], WindowConfig::new(2, 3, 2).unwrap());

    let err = CsvStore::new(dir.path()).write(&series).unwrap_err();
    assert!(matches!(err, SinkError::InvalidSymbol { .. }), "{err}");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
