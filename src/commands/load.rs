use crate::WalkcacheContext;
use anyhow::{Context, Result};

/// Load `file` through the cache and print the decoded value as JSON.
///
/// # Errors
///
/// Returns an error if the descriptor is missing, malformed, or its
/// artifact cannot be written.
pub fn execute(ctx: &WalkcacheContext, file: &str) -> Result<()> {
    let source = super::absolute_arg(file)?;
    let loaded = ctx
        .cache()
        .load_traced(&source)
        .with_context(|| format!("Failed to load {source}"))?;

    ctx.reporter.loaded(loaded.origin);
    println!("{}", loaded.value);
    Ok(())
}
