pub mod parser;
pub mod validator;

use crate::cache::DEFAULT_COMPRESSION_LEVEL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// User settings for the `wcache` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Artifact settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Traversal settings
    #[serde(default)]
    pub walk: WalkConfig,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// zstd level for new artifacts (1-22)
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

/// `[walk]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WalkConfig {
    /// Treat symlinked directories as containers
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Deepest level to descend into; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist. Nothing is written; only [`Config::save`] does.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML or out-of-range values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Get a configuration value by `section.key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key.split_once('.')? {
            ("cache", "compression_level") => Some(self.cache.compression_level.to_string()),
            ("walk", "follow_symlinks") => Some(self.walk.follow_symlinks.to_string()),
            ("walk", "max_depth") => self.walk.max_depth.map(|d| d.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by `section.key`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value does not parse or is out of range
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let Some(parts) = key.split_once('.') else {
            anyhow::bail!("Invalid configuration key: {key}");
        };

        match parts {
            ("cache", "compression_level") => {
                let level: i32 = value
                    .parse()
                    .with_context(|| format!("Invalid compression level: {value}"))?;
                parser::check_compression_level(level)?;
                self.cache.compression_level = level;
            }
            ("walk", "follow_symlinks") => {
                self.walk.follow_symlinks = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("walk", "max_depth") => {
                self.walk.max_depth = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid number: {value}"))?,
                );
            }
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }
        Ok(())
    }

    /// Unset a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or cannot be unset.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "walk.max_depth" => self.walk.max_depth = None,
            _ => anyhow::bail!("Cannot unset configuration key: {key}"),
        }
        Ok(())
    }
}

const fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}
