//! Pipeline configuration: defaults, TOML file, environment, then CLI flags.
//!
//! The configuration is built once at the entry point and handed to
//! [`run`](crate::pipeline::run) by reference. Nothing below the orchestrator
//! reads it; each component receives only the values it needs.
//!
//! ```toml
//! symbol = "QQQ"
//! period = "2y"
//! short_window = 20
//! long_window = 100
//! vol_window = 30
//! output_dir = "out"
//! source = { csv = "data/qqq.csv" }
//!
//! [chart]
//! width = 1600
//! ```

use std::{
    fs, io,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use market_data_ingestor::models::{Period, PeriodError};
use serde::{Deserialize, Serialize};
use shared_utils::env::{InvalidEnvVarError, get_optional_env_parsed, get_optional_env_var};
use thiserror::Error;
use tracing::debug;

use crate::{
    processor::{ProcessError, WindowConfig},
    visualizer::ChartStyle,
};

pub const SYMBOL_ENV: &str = "METRICS_SYMBOL";
pub const PERIOD_ENV: &str = "METRICS_PERIOD";
pub const OUTPUT_DIR_ENV: &str = "METRICS_OUTPUT_DIR";

const DEFAULT_YEARS: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Env(#[from] InvalidEnvVarError),

    #[error("Invalid period {input:?}: {source}")]
    InvalidPeriod { input: String, source: PeriodError },

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error(transparent)]
    Windows(#[from] ProcessError),

    #[error("The csv source needs an input file path")]
    MissingInput,
}

/// Where raw bars come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceConfig {
    /// Yahoo Finance chart API.
    #[default]
    Yahoo,
    /// A local OHLCV file with a `Date,Open,High,Low,Close,Volume` header.
    Csv(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub symbol: String,
    pub period: Period,
    pub short_window: usize,
    pub long_window: usize,
    pub vol_window: usize,
    pub output_dir: PathBuf,
    pub source: SourceConfig,
    pub chart: ChartStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            period: Period::Years(DEFAULT_YEARS),
            short_window: 50,
            long_window: 200,
            vol_window: 30,
            output_dir: PathBuf::from("."),
            source: SourceConfig::Yahoo,
            chart: ChartStyle::default(),
        }
    }
}

/// Values set on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub vol_window: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub input: Option<PathBuf>,
}

impl PipelineConfig {
    /// Defaults, overlaid with `file` when given, then with the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// `METRICS_SYMBOL`, `METRICS_PERIOD` and `METRICS_OUTPUT_DIR`, when set and non-blank.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(symbol) = get_optional_env_var(SYMBOL_ENV) {
            self.symbol = symbol.trim().to_string();
        }
        if let Some(period) = get_optional_env_parsed::<Period>(PERIOD_ENV)? {
            self.period = period;
        }
        if let Some(dir) = get_optional_env_var(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(symbol) = overrides.symbol {
            self.symbol = symbol.trim().to_string();
        }
        if let Some(input) = overrides.period {
            self.period = input
                .parse()
                .map_err(|source| ConfigError::InvalidPeriod { input, source })?;
        }
        if let Some(n) = overrides.short_window {
            self.short_window = n;
        }
        if let Some(n) = overrides.long_window {
            self.long_window = n;
        }
        if let Some(n) = overrides.vol_window {
            self.vol_window = n;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(path) = overrides.input {
            self.source = SourceConfig::Csv(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        self.windows()?;
        if matches!(&self.source, SourceConfig::Csv(path) if path.as_os_str().is_empty()) {
            return Err(ConfigError::MissingInput);
        }
        Ok(())
    }

    pub fn windows(&self) -> Result<WindowConfig, ConfigError> {
        Ok(WindowConfig::new(
            self.short_window,
            self.long_window,
            self.vol_window,
        )?)
    }
}
