//! Binary crate for the `weather-time` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Wiring the preference store, registry, resolver and refresh coordinator
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
