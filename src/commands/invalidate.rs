use crate::WalkcacheContext;
use anyhow::{Context, Result};

/// Remove the artifact compiled from `file`.
///
/// The source itself does not need to exist.
///
/// # Errors
///
/// Returns an error if the artifact exists but cannot be removed.
pub fn execute(ctx: &WalkcacheContext, file: &str) -> Result<()> {
    let source = super::absolute_arg(file)?;
    let removed = ctx
        .cache()
        .invalidate(&source)
        .with_context(|| format!("Failed to invalidate {source}"))?;

    ctx.reporter.invalidated(&source, removed);
    Ok(())
}
