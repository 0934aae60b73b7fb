use anyhow::Result;
use clap::Parser;
use metrics_pipeline::cli::{Cli, execute};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = chrono::Local::now().date_naive();

    // Only the HTTP provider needs a runtime; nothing is spawned.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli, today))
}
