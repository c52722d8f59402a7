//! Quoteverse CLI
//!
//! Headless front end for the Quoteverse engine: inspect configuration,
//! load and plot the quote map, run one-off searches, or explore
//! interactively.

mod backend;
mod cli;
mod commands;
mod config_loader;
mod output;
mod output_types;
mod progress;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(commands::execute(cli))
}
