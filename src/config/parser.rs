use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and validate a TOML config file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// invalid values.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse and validate TOML config text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or holds invalid values.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.update_interval()?.is_zero() {
        anyhow::bail!("scan.update_interval must be greater than zero");
    }

    if config.command_timeout()?.is_zero() {
        anyhow::bail!("scan.command_timeout must be greater than zero");
    }

    if config.core.content_path.as_os_str().is_empty() {
        anyhow::bail!("core.content_path cannot be empty");
    }

    if config.core.cache_path.as_os_str().is_empty() {
        anyhow::bail!("core.cache_path cannot be empty");
    }

    Ok(())
}
