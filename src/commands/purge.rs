use crate::WalkcacheContext;
use anyhow::{Context, Result};

/// Remove every compiled artifact under the cache root.
///
/// # Errors
///
/// Returns an error if the root cannot be listed or an artifact cannot be
/// removed.
pub fn execute(ctx: &WalkcacheContext) -> Result<()> {
    let removed = ctx
        .purger()
        .purge()
        .with_context(|| format!("Failed to purge {}", ctx.cache_root))?;

    ctx.reporter.purged(removed, &ctx.cache_root);
    Ok(())
}
