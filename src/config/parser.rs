use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and validates a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or [`parse_config_str`] fails.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parses and validates configuration text.
///
/// # Errors
///
/// Returns an error for invalid TOML or a value that fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validation errors are returned as-is
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.scan.chunk_size == 0 {
        anyhow::bail!("scan.chunk_size must be at least 1 byte");
    }

    if config.scan.jobs == 0 {
        anyhow::bail!("scan.jobs must be at least 1");
    }

    config.ignore_patterns()?;

    Ok(())
}
