mod cli;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use contentful_config::load_config;
use contentful_provider::observability::init_tracing_with_level;
use contentful_provider::{ContentfulProvider, ProviderContext};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load provider configuration")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing_with_level(level);
    tracing::debug!(base_url = %config.base_url, environment = %config.environment, "configuration loaded");

    if matches!(cli.command, Commands::Config) {
        return commands::config::show(&config);
    }

    let ctx = ProviderContext::from_config(config)?;
    let provider = ContentfulProvider::new(ctx);

    match &cli.command {
        Commands::Types => commands::resource::types(&provider)?,
        Commands::Import(args) => commands::resource::import(&provider, args).await?,
        Commands::Read(args) => commands::resource::read(&provider, args).await?,
        Commands::Apply(args) => commands::resource::apply(&provider, args).await?,
        Commands::Destroy(args) => commands::resource::destroy(&provider, args).await?,
        Commands::Config => {}
    }

    Ok(())
}
