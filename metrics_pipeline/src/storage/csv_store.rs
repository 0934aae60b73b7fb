//! CSV persistence for enriched series.
//!
//! The header is the textual form of [`EnrichedSeries::columns`], the date is
//! the first column and an undefined cell is an empty field. Files are
//! written next to their final location and renamed into place, so a failed
//! write never leaves a partial file behind.

use std::{
    fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use indexmap::IndexMap;
use market_data_ingestor::models::Bar;
use snafu::{OptionExt, ResultExt, ensure};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    processor::{ColumnKey, EnrichedRow, EnrichedSeries, Indicator, WindowConfig},
    storage::{
        EmptySeriesSnafu, MalformedSnafu, ReadFailedSnafu, SeriesSink, SinkError,
        WriteFailedSnafu, processed_file_name, symbol_from_file_name,
    },
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads a processed file back into an [`EnrichedSeries`].
    ///
    /// The window configuration is recovered from the header: the first
    /// `SMA_n` column is the short window, the second (if any) the long one.
    /// The symbol comes from the file name when it follows the
    /// `{symbol}_processed_data.csv` convention, otherwise from the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<EnrichedSeries, SinkError> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).context(ReadFailedSnafu { path })?;

        let headers = reader.headers().context(ReadFailedSnafu { path })?.clone();
        let layout = Layout::from_headers(path, &headers)?;
        debug!(path = %path.display(), columns = headers.len(), "processed header parsed");

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.context(ReadFailedSnafu { path })?;
            // Header is line 1.
            rows.push(layout.row(path, i + 2, &record)?);
        }

        let symbol = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(symbol_from_file_name)
            .or_else(|| path.file_stem().and_then(|s| s.to_str()))
            .unwrap_or_default()
            .to_string();

        info!(%symbol, rows = rows.len(), path = %path.display(), "processed series loaded");
        Ok(EnrichedSeries {
            symbol,
            windows: layout.windows,
            rows,
        })
    }
}

impl SeriesSink for CsvStore {
    type Output = PathBuf;

    fn write(&self, series: &EnrichedSeries) -> Result<PathBuf, SinkError> {
        ensure!(
            !series.is_empty(),
            EmptySeriesSnafu {
                symbol: &series.symbol
            }
        );
        let target = self.dir.join(processed_file_name(&series.symbol)?);

        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| NamedTempFile::new_in(&self.dir))
            .and_then(|tmp| fill(tmp, series))
            .and_then(|tmp| tmp.persist(&target).map_err(|e| e.error));

        if let Err(err) = result {
            warn!(path = %target.display(), error = %err, "processed data not written");
            return Err(err).context(WriteFailedSnafu { path: target });
        }

        info!(
            symbol = %series.symbol,
            rows = series.len(),
            path = %target.display(),
            "processed data written"
        );
        Ok(target)
    }
}

/// Writes header and rows into `tmp`; the temp file is deleted if this fails.
fn fill(tmp: NamedTempFile, series: &EnrichedSeries) -> io::Result<NamedTempFile> {
    let columns = series.columns();
    let mut writer = csv::Writer::from_writer(tmp);

    writer.write_record(columns.iter().map(ToString::to_string))?;
    for row in &series.rows {
        let record = columns.iter().map(|key| cell(row, key, &series.windows));
        writer.write_record(record)?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())
}

fn cell(row: &EnrichedRow, key: &ColumnKey, windows: &WindowConfig) -> String {
    match key {
        ColumnKey::Date => row.bar.date.format(DATE_FORMAT).to_string(),
        ColumnKey::Volume => row.bar.volume.to_string(),
        _ => match row.value(key, windows).flatten() {
            Some(v) => v.to_string(),
            None => String::new(),
        },
    }
}

/// Column positions of a processed file, keyed by column.
struct Layout {
    positions: IndexMap<ColumnKey, usize>,
    windows: WindowConfig,
}

impl Layout {
    fn from_headers(path: &Path, headers: &csv::StringRecord) -> Result<Self, SinkError> {
        let mut positions = IndexMap::new();
        for (i, name) in headers.iter().enumerate() {
            let key: ColumnKey = name.parse().map_err(|e| {
                MalformedSnafu {
                    path,
                    row: 1usize,
                    message: format!("{e}"),
                }
                .build()
            })?;
            ensure!(
                positions.insert(key, i).is_none(),
                MalformedSnafu {
                    path,
                    row: 1usize,
                    message: format!("duplicate column {name:?}"),
                }
            );
        }

        let missing: Vec<String> = ColumnKey::RAW
            .iter()
            .chain([ColumnKey::daily_return()].iter())
            .filter(|k| !positions.contains_key(*k))
            .map(ToString::to_string)
            .collect();
        ensure!(
            missing.is_empty(),
            MalformedSnafu {
                path,
                row: 1usize,
                message: format!("missing columns {}", missing.join(", ")),
            }
        );

        let smas: Vec<NonZeroUsize> = positions
            .keys()
            .filter_map(|k| match k {
                ColumnKey::Indicator(Indicator::Sma(n)) => Some(*n),
                _ => None,
            })
            .collect();
        let vols: Vec<NonZeroUsize> = positions
            .keys()
            .filter_map(|k| match k {
                ColumnKey::Indicator(Indicator::Volatility(n)) => Some(*n),
                _ => None,
            })
            .collect();

        let (short, long) = match smas.as_slice() {
            [one] => (*one, *one),
            [short, long] => (*short, *long),
            _ => {
                return MalformedSnafu {
                    path,
                    row: 1usize,
                    message: format!("expected one or two SMA columns, found {}", smas.len()),
                }
                .fail();
            }
        };
        let volatility = match vols.as_slice() {
            [one] => *one,
            _ => {
                return MalformedSnafu {
                    path,
                    row: 1usize,
                    message: format!("expected one volatility column, found {}", vols.len()),
                }
                .fail();
            }
        };

        Ok(Self {
            positions,
            windows: WindowConfig {
                short,
                long,
                volatility,
            },
        })
    }

    fn row(
        &self,
        path: &Path,
        row: usize,
        record: &csv::StringRecord,
    ) -> Result<EnrichedRow, SinkError> {
        let field = |key: ColumnKey| {
            self.positions
                .get(&key)
                .and_then(|&pos| record.get(pos))
                .map(str::trim)
                .context(MalformedSnafu {
                    path,
                    row,
                    message: format!("missing {key} field"),
                })
        };
        let number = |key: ColumnKey| -> Result<Option<f64>, SinkError> {
            let raw = field(key)?;
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>().map(Some).map_err(|_| {
                MalformedSnafu {
                    path,
                    row,
                    message: format!("{key} value {raw:?} is not a number"),
                }
                .build()
            })
        };
        let required = |key: ColumnKey| -> Result<f64, SinkError> {
            number(key)?.context(MalformedSnafu {
                path,
                row,
                message: format!("{key} is empty"),
            })
        };

        let date_raw = field(ColumnKey::Date)?;
        let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT).map_err(|_| {
            MalformedSnafu {
                path,
                row,
                message: format!("invalid date {date_raw:?}"),
            }
            .build()
        })?;
        let volume = required(ColumnKey::Volume)?;
        let w = &self.windows;

        Ok(EnrichedRow {
            bar: Bar {
                date,
                open: required(ColumnKey::Open)?,
                high: required(ColumnKey::High)?,
                low: required(ColumnKey::Low)?,
                close: required(ColumnKey::Close)?,
                volume: volume.max(0.0).round() as u64,
            },
            daily_return: number(ColumnKey::daily_return())?,
            sma_short: number(ColumnKey::sma(w.short))?,
            sma_long: number(ColumnKey::sma(w.long))?,
            volatility: number(ColumnKey::volatility(w.volatility))?,
        })
    }
}
