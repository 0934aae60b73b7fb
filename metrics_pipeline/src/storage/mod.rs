pub mod csv_store;

use std::path::PathBuf;

use snafu::{Backtrace, Snafu, ensure};

use crate::processor::EnrichedSeries;

pub use csv_store::CsvStore;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Nothing to persist; no file is created.
    #[snafu(display("Refusing to write an empty series for {symbol:?}"))]
    EmptySeries { symbol: String, backtrace: Backtrace },

    /// The symbol cannot be turned into a file name.
    #[snafu(display("Symbol {symbol:?} cannot be used in a file name"))]
    InvalidSymbol { symbol: String, backtrace: Backtrace },

    /// Creating, filling or renaming the output file failed. Any temp file is removed.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to read {}: {source}", path.display()))]
    ReadFailed {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// The file was readable but is not a processed series.
    #[snafu(display("Malformed processed file {} (row {row}): {message}", path.display()))]
    Malformed {
        path: PathBuf,
        row: usize,
        message: String,
        backtrace: Backtrace,
    },
}

/// Destination for an enriched series.
pub trait SeriesSink {
    /// What a successful write hands back, e.g. the path of the created file.
    type Output;

    fn write(&self, series: &EnrichedSeries) -> Result<Self::Output, SinkError>;
}

const PROCESSED_SUFFIX: &str = "_processed_data.csv";

/// `{symbol}_processed_data.csv`
pub fn processed_file_name(symbol: &str) -> Result<String, SinkError> {
    ensure_file_safe(symbol)?;
    Ok(format!("{symbol}{PROCESSED_SUFFIX}"))
}

/// Inverse of [`processed_file_name`], used when a file is loaded back.
pub fn symbol_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(PROCESSED_SUFFIX)
        .filter(|s| !s.is_empty())
}

/// Symbols end up inside file names, so they must not be able to leave the output directory.
pub fn ensure_file_safe(symbol: &str) -> Result<(), SinkError> {
    let ok = !symbol.trim().is_empty()
        && symbol != "."
        && symbol != ".."
        && !symbol.contains(['/', '\\', '\0']);
    ensure!(ok, InvalidSymbolSnafu { symbol });
    Ok(())
}
