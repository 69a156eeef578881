use anyhow::{Context, Result};
use colored::Colorize;
use contentful_config::{ProviderConfig, SecretString};

/// Renders `config` as TOML with the token masked.
pub fn render(config: &ProviderConfig) -> Result<String> {
    let mut shown = config.clone();
    if !shown.cma_token.is_empty() {
        shown.cma_token = SecretString::new("****");
    }
    toml::to_string_pretty(&shown).context("Failed to render configuration")
}

pub fn show(config: &ProviderConfig) -> Result<()> {
    println!("{}", "# effective provider configuration".dimmed());
    println!("{}", render(config)?);
    Ok(())
}
