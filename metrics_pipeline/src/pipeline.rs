//! Fetch, process, store, render: one symbol per run.

use std::path::PathBuf;

use chrono::NaiveDate;
use market_data_ingestor::{Unavailable, fetch_history, providers::DataProvider};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::PipelineConfig,
    processor::{self, ColumnKey, EnrichedSeries, ProcessError, WindowConfig},
    storage::{CsvStore, SeriesSink, SinkError},
    visualizer::{ChartRenderer, ChartStyle, VisualizeError},
};

/// A stage failure that ends the run before any artifact is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] Unavailable),

    #[error("Processing failed: {0}")]
    Processing(#[from] ProcessError),
}

/// Outcome of a run that got as far as the enriched series.
///
/// Storage and chart rendering are independent; either may fail while the other succeeds.
#[derive(Debug)]
pub struct RunReport {
    pub symbol: String,
    pub rows: usize,
    pub csv: Result<PathBuf, SinkError>,
    pub chart: Result<PathBuf, VisualizeError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.csv.is_ok() && self.chart.is_ok()
    }
}

/// `Close`, `SMA_{short}` and `SMA_{long}`: the columns the chart draws.
pub fn chart_columns(windows: &WindowConfig) -> [ColumnKey; 3] {
    [
        ColumnKey::Close,
        ColumnKey::sma(windows.short),
        ColumnKey::sma(windows.long),
    ]
}

/// Runs the pipeline for `config.symbol`, looking back from `today`.
///
/// The window lengths in `config` are expected to be valid already (see
/// [`PipelineConfig::validate`]); a zero window surfaces as
/// [`PipelineError::Processing`] before anything is fetched.
pub async fn run(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
    today: NaiveDate,
) -> Result<RunReport, PipelineError> {
    let windows = WindowConfig::new(config.short_window, config.long_window, config.vol_window)?;
    let symbol = config.symbol.trim();
    info!(
        symbol,
        period = %config.period,
        provider = provider.name(),
        "pipeline started"
    );

    let raw = fetch_history(provider, symbol, &config.period, today)
        .await
        .inspect_err(|e| error!(error = %e, "acquisition failed, stopping"))?;

    let enriched = processor::process(&raw, windows)
        .inspect_err(|e| error!(error = %e, "processing failed, stopping"))?;

    Ok(persist(&enriched, config.output_dir.clone(), &config.chart))
}

/// Stores and renders an enriched series under its own symbol; both are
/// attempted regardless of the other's outcome.
pub fn persist(series: &EnrichedSeries, output_dir: PathBuf, style: &ChartStyle) -> RunReport {
    let symbol = series.symbol.as_str();
    let csv = CsvStore::new(&output_dir).write(series);
    if let Err(e) = &csv {
        warn!(%symbol, error = %e, "storage failed");
    }

    let [price, short, long] = chart_columns(&series.windows);
    let chart = ChartRenderer::new(output_dir, style.clone())
        .render(series, symbol, &price, &short, &long);
    if let Err(e) = &chart {
        warn!(%symbol, error = %e, "chart rendering failed");
    }

    let report = RunReport {
        symbol: symbol.to_string(),
        rows: series.len(),
        csv,
        chart,
    };
    info!(%symbol, rows = report.rows, success = report.is_success(), "pipeline finished");
    report
}
