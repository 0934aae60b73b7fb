//! Daily price metrics for a single symbol.
//!
//! Raw OHLCV bars are fetched through `market_data_ingestor`, enriched with a
//! daily return, two simple moving averages and a rolling volatility
//! ([`processor`]), then written to CSV ([`storage`]) and drawn as a PNG
//! chart ([`visualizer`]). [`pipeline::run`] sequences the stages.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod processor;
pub mod storage;
pub mod visualizer;

pub use config::{ConfigError, PipelineConfig, SourceConfig};
pub use pipeline::{PipelineError, RunReport, run};
