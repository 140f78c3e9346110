#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters and size calculations cannot overflow
#![allow(clippy::float_arithmetic)] // Required for file size formatting
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Walkcache - Lazy Tree Traversal and Compiled Descriptor Cache
//!
//! Walkcache provides two independent facilities over a pluggable storage
//! layer:
//!
//! - **Single-pass traversal**: [`walk::list`] yields the raw entries of one
//!   container, [`walk::walk`] yields every descendant path in depth-first
//!   pre-order. Each container is listed exactly once and nothing is read
//!   ahead of the consumer.
//! - **Compiled cache**: [`cache::CompiledCache`] decodes descriptor files
//!   (JSON or TOML) once and serves later loads from a compact artifact
//!   (bincode + zstd, named by xxHash3 of the source path) until the source
//!   changes. [`cache::CachePurger`] clears every artifact.
//!
//! ## Architecture
//!
//! - [`storage`]: the [`storage::Storage`] trait plus local and in-memory
//!   backends
//! - [`walk`]: lazy listing and explicit-stack traversal
//! - [`decode`]: descriptor decoders and the decoded [`decode::Value`]
//! - [`cache`]: artifact naming, freshness, publication, and purging
//! - [`config`]: configuration parsing and validation for the `wcache` binary
//! - [`commands`]: `wcache` command implementations
//! - [`output`]: status reporting for the binary
//! - [`utils`]: hashing, compression, serialization, and path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use walkcache::cache::CompiledCache;
//! use walkcache::storage::LocalStorage;
//! use walkcache::walk::walk;
//!
//! # fn main() -> walkcache::Result<()> {
//! let storage = LocalStorage::new();
//! for path in walk(&storage, "/etc/app", None)? {
//!     println!("{}", path?);
//! }
//!
//! let cache = CompiledCache::from_env();
//! let settings = cache.load("/etc/app/settings.toml")?;
//! println!("{settings}");
//! # Ok(())
//! # }
//! ```

/// Compiled-artifact cache (store, purger, naming).
pub mod cache;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Descriptor decoding.
pub mod decode;

/// Error types shared by the library.
pub mod error;

/// Status reporting for the CLI.
pub mod output;

/// Storage backends for listing and reading containers.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

/// Lazy listing and recursive traversal.
pub mod walk;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};

use anyhow::Context;
use cache::{CachePurger, CacheRoot, CompiledCache};
use decode::DescriptorDecoder;
use std::path::PathBuf;
use storage::LocalStorage;

/// Current version of the walkcache crate and `wcache` binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the cache root.
pub const CACHE_DIR_ENV: &str = "WALKCACHE_CACHE_DIR";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "WALKCACHE_CONFIG_PATH";

/// Directory under the platform temp dir used when no cache root is set.
pub const DEFAULT_CACHE_SUBDIR: &str = "walkcache";

/// Configuration file path relative to the platform config dir.
pub const DEFAULT_CONFIG_PATH: &str = "walkcache/config.toml";

/// File-name suffix of compiled artifacts.
pub const COMPILED_SUFFIX: &str = ".wcache";

/// File-name prefix of in-flight artifact writes.
pub const TEMP_PREFIX: &str = ".wcache-";

/// Self-reference marker some listings report.
pub const SELF_ENTRY: &str = ".";

/// Parent-reference marker some listings report.
pub const PARENT_ENTRY: &str = "..";

/// Central context for `wcache` commands.
///
/// Holds the loaded configuration, the resolved cache root, and the status
/// reporter, and builds the storage, cache, and purger the commands run
/// against. Building a context never writes to disk.
///
/// # Examples
///
/// ```no_run
/// use walkcache::WalkcacheContext;
/// use walkcache::cache::CacheRoot;
/// use walkcache::output::Reporter;
///
/// # fn main() -> anyhow::Result<()> {
/// // Context with default paths
/// let ctx = WalkcacheContext::new(CacheRoot::resolve(), Reporter::default())?;
///
/// // Context with explicit paths (for testing)
/// let ctx = WalkcacheContext::new_explicit(
///     "/tmp/wcache/config.toml".into(),
///     CacheRoot::new("/tmp/wcache/cache"),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WalkcacheContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Where compiled artifacts live.
    pub cache_root: CacheRoot,

    /// Status line output.
    pub reporter: output::Reporter,
}

impl WalkcacheContext {
    /// Creates a context, loading the configuration from
    /// `WALKCACHE_CONFIG_PATH` or the platform config dir.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or if an
    /// existing configuration file cannot be read.
    pub fn new(cache_root: CacheRoot, reporter: output::Reporter) -> anyhow::Result<Self> {
        let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => dirs::config_dir()
                .context("Could not find config directory")?
                .join(DEFAULT_CONFIG_PATH),
        };

        let config = config::Config::load(&config_path)?;

        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            reporter.warning(&format!("Configuration validation failed: {e}"));
        }

        Ok(Self {
            config_path,
            config,
            cache_root,
            reporter,
        })
    }

    /// Creates a context with explicit paths.
    ///
    /// # Errors
    /// Returns an error if an existing configuration file cannot be read.
    pub fn new_explicit(config_path: PathBuf, cache_root: CacheRoot) -> anyhow::Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            config_path,
            config,
            cache_root,
            reporter: output::Reporter::default(),
        })
    }

    /// Local storage honouring `walk.follow_symlinks`.
    #[must_use]
    pub const fn storage(&self) -> LocalStorage {
        LocalStorage::new().follow_symlinks(self.config.walk.follow_symlinks)
    }

    /// Compiled cache over local storage at the context's root.
    #[must_use]
    pub fn cache(&self) -> CompiledCache {
        CompiledCache::new(self.storage(), DescriptorDecoder, self.cache_root.clone())
            .with_compression_level(self.config.cache.compression_level)
    }

    /// Purger for the context's root.
    #[must_use]
    pub fn purger(&self) -> CachePurger {
        CachePurger::new(self.storage(), self.cache_root.clone())
    }
}
