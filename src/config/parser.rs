use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Read and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not UTF-8, is not valid
/// TOML, or holds out-of-range values.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read config file: {path:?}"))?;

    // Validate UTF-8 using SIMD
    let content = simdutf8::basic::from_utf8(&bytes)
        .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in config file: {e}"))?;

    parse_config_str(content)
}

fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

/// Range check shared with `Config::set`.
///
/// # Errors
///
/// Returns an error if `level` is outside 1..=22.
pub fn check_compression_level(level: i32) -> Result<()> {
    if !(1..=22).contains(&level) {
        anyhow::bail!("Compression level must be between 1 and 22");
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    check_compression_level(config.cache.compression_level)?;

    if config.walk.max_depth == Some(0) {
        anyhow::bail!("walk.max_depth must be at least 1");
    }

    Ok(())
}
