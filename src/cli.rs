//! Command-line interface definitions for `wcache`.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap doc comments,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Main CLI structure for `wcache`.
#[derive(Parser)]
#[command(
    name = "wcache",
    version = crate::VERSION,
    about = "Walk storage trees and inspect the compiled descriptor cache",
    long_about = "Lists trees in a single lazy pass and loads JSON/TOML descriptors through a compiled artifact cache"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding compiled artifacts
    #[arg(long, global = true, env = "WALKCACHE_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print every path below a container, depth-first
    Walk {
        /// Container to walk
        path: String,

        /// Do not descend below this depth
        #[arg(short = 'd', long, value_name = "N")]
        max_depth: Option<usize>,

        /// Descend into symlinked directories
        #[arg(short = 'L', long)]
        follow_symlinks: bool,
    },

    /// Load a descriptor through the cache and print it as JSON
    Load {
        /// Descriptor file
        file: String,
    },

    /// Show the artifact state of a descriptor
    Stat {
        /// Descriptor file
        file: String,
    },

    /// Remove the artifact of one descriptor
    Invalidate {
        /// Descriptor file
        file: String,
    },

    /// Remove every compiled artifact
    Purge,

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Unset the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
