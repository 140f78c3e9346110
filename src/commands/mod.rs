pub mod config;
pub mod invalidate;
pub mod load;
pub mod purge;
pub mod stat;
pub mod walk;

use crate::utils::paths::make_absolute;
use anyhow::{Context, Result};

/// Absolute form of a path given on the command line.
pub(crate) fn absolute_arg(path: &str) -> Result<String> {
    make_absolute(path).with_context(|| format!("Failed to resolve path: {path}"))
}
