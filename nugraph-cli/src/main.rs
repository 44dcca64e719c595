use anyhow::Result;
use clap::Parser;
use nugraph_core::{NugraphConfig, console};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let args = Cli::parse();
    let mut config = NugraphConfig::from_env();

    if args.verbose {
        config.verbose = true;
        console::set_verbose(true);
    }

    tracing::debug!(
        cache_dir = %config.cache_dir.display(),
        registry = %config.registry,
        "configuration loaded"
    );

    match args.command {
        Command::Graph(graph_args) => commands::graph::run(graph_args, &config).await?,
        Command::Authors(authors_args) => commands::authors::run(authors_args, &config).await?,
        Command::Clean(clean_args) => commands::clean::run(clean_args, &config)?,
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
