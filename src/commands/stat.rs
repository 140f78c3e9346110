use crate::WalkcacheContext;
use crate::cache::Freshness;
use crate::utils::format_size;
use anyhow::{Context, Result};
use colored::Colorize;
use std::time::{Duration, SystemTime};

/// Show where `file`'s artifact lives and whether it is fresh.
///
/// # Errors
///
/// Returns an error if the descriptor does not exist.
pub fn execute(ctx: &WalkcacheContext, file: &str) -> Result<()> {
    let source = super::absolute_arg(file)?;
    let cache = ctx.cache();
    let status = cache
        .status(&source)
        .with_context(|| format!("Failed to stat {source}"))?;

    println!("{}   {source}", "source".bold());
    println!("{} {}", "artifact".bold(), cache.artifact_path(&source)?);
    println!("{}    {}", "state".bold(), describe(&status));
    Ok(())
}

fn describe(status: &Freshness) -> String {
    match status {
        Freshness::Missing => "missing".dimmed().to_string(),
        Freshness::Stale { .. } => "stale".yellow().to_string(),
        Freshness::Fresh { artifact, modified } => {
            let age = SystemTime::now()
                .duration_since(*modified)
                .unwrap_or_default();
            // Whole seconds keep the output short
            let age = humantime::format_duration(Duration::from_secs(age.as_secs()));
            let size = std::fs::metadata(artifact).map_or(0, |m| m.len());
            format!("{} ({}, compiled {age} ago)", "fresh".green(), format_size(size))
        }
    }
}
