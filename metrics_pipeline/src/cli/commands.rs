use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily price metrics: moving averages, volatility, chart")]
pub struct Cli {
    /// Path to a TOML config file (see `PipelineConfig`)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, process, store and plot one symbol
    Run(RunArgs),

    /// Re-render the chart from a processed CSV
    Plot {
        /// A `{symbol}_processed_data.csv` written by `run`
        #[arg(long, value_name = "PROCESSED.csv")]
        input: PathBuf,

        /// Symbol used in the chart title and file name
        #[arg(long)]
        symbol: String,

        /// Directory for the PNG (defaults to the configured output directory)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Ticker symbol (e.g. "SPY", "^GSPC")
    #[arg(long)]
    pub symbol: Option<String>,

    /// Look-back period: 30d, 2w, 6mo, 5y, ytd or max
    #[arg(long)]
    pub period: Option<String>,

    /// Short SMA window, in records
    #[arg(long)]
    pub short_window: Option<usize>,

    /// Long SMA window, in records
    #[arg(long)]
    pub long_window: Option<usize>,

    /// Volatility window, in daily returns
    #[arg(long)]
    pub vol_window: Option<usize>,

    /// Directory for the CSV and PNG outputs
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Read raw OHLCV rows from this CSV instead of Yahoo
    #[arg(long, value_name = "RAW.csv")]
    pub input: Option<PathBuf>,
}

impl From<RunArgs> for Overrides {
    fn from(args: RunArgs) -> Self {
        Self {
            symbol: args.symbol,
            period: args.period,
            short_window: args.short_window,
            long_window: args.long_window,
            vol_window: args.vol_window,
            output_dir: args.output_dir,
            input: args.input,
        }
    }
}
