use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Flags configuration keys that `wcache` does not recognise
pub struct ConfigValidator {
    /// Set of valid `section.key` paths
    known_fields: HashSet<&'static str>,
    /// Section names that may hold known fields
    known_sections: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "cache.compression_level",
            "walk.follow_symlinks",
            "walk.max_depth",
        ]
        .into_iter()
        .collect();

        let known_sections = ["cache", "walk"].into_iter().collect();

        Self {
            known_fields,
            known_sections,
        }
    }

    /// Unknown field paths in a parsed document, in document order
    #[must_use]
    pub fn unknown_fields(&self, document: &toml::Table) -> Vec<String> {
        let mut unknown = Vec::new();
        for (section, value) in document {
            match value {
                toml::Value::Table(table) if self.known_sections.contains(section.as_str()) => {
                    for key in table.keys() {
                        let full_key = format!("{section}.{key}");
                        if !self.known_fields.contains(full_key.as_str()) {
                            unknown.push(full_key);
                        }
                    }
                }
                _ => unknown.push(section.clone()),
            }
        }
        unknown
    }

    /// Validate a configuration file and warn about unknown fields
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Table = toml::from_str(&content)?;

        let unknown = self.unknown_fields(&parsed);
        if !unknown.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in unknown {
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            eprintln!();
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
