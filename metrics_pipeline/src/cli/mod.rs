//! Command-line entry points behind the `metrics-pipeline` binary.

pub mod commands;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use market_data_ingestor::providers::{CsvFileProvider, DataProvider, YahooProvider};
use tracing::info;

use crate::{
    config::{PipelineConfig, SourceConfig},
    pipeline::{self, RunReport},
    storage::CsvStore,
    visualizer::ChartRenderer,
};

pub use commands::{Cli, Commands, RunArgs};

/// Executes the parsed command line. `today` anchors the look-back period.
pub async fn execute(cli: Cli, today: NaiveDate) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            config.apply_overrides(args.into())?;
            config.validate()?;

            let provider = build_provider(&config.source)?;
            let report = pipeline::run(&config, provider.as_ref(), today).await?;
            finish(&report)
        }

        Commands::Plot {
            input,
            symbol,
            output_dir,
        } => {
            let series = CsvStore::load(&input)
                .with_context(|| format!("Loading processed data from {}", input.display()))?;
            let dir = output_dir.unwrap_or(config.output_dir);
            let [price, short, long] = pipeline::chart_columns(&series.windows);

            let path = ChartRenderer::new(dir, config.chart)
                .render(&series, &symbol, &price, &short, &long)
                .context("Visualization failed")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn build_provider(source: &SourceConfig) -> Result<Box<dyn DataProvider>> {
    let provider: Box<dyn DataProvider> = match source {
        SourceConfig::Yahoo => Box::new(YahooProvider::new()?),
        SourceConfig::Csv(path) => Box::new(CsvFileProvider::new(path.as_path())),
    };
    info!(provider = provider.name(), "data source selected");
    Ok(provider)
}

/// Prints the produced paths; fails naming every stage that did not complete.
fn finish(report: &RunReport) -> Result<()> {
    let mut failed = Vec::new();
    for (stage, outcome) in [
        ("Storage", report.csv.as_ref().map_err(ToString::to_string)),
        ("Visualization", report.chart.as_ref().map_err(ToString::to_string)),
    ] {
        match outcome {
            Ok(path) => println!("{}", path.display()),
            Err(e) => failed.push(format!("{stage} failed: {e}")),
        }
    }
    if !failed.is_empty() {
        bail!("{}", failed.join("; "));
    }
    Ok(())
}
