use crate::WalkcacheContext;
use crate::storage::LocalStorage;
use crate::walk::walk;
use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};

/// Print every path below `path`, one per line, depth-first pre-order.
///
/// Flags override the `[walk]` configuration section.
///
/// # Errors
///
/// Returns an error if the root or any nested container cannot be listed,
/// or if stdout is closed.
pub fn execute(
    ctx: &WalkcacheContext,
    path: &str,
    max_depth: Option<usize>,
    follow_symlinks: bool,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let count = write_walk(ctx, path, max_depth, follow_symlinks, &mut out)?;
    out.flush()?;

    ctx.reporter.detail(&format!("{count} entries"));
    Ok(())
}

fn write_walk(
    ctx: &WalkcacheContext,
    path: &str,
    max_depth: Option<usize>,
    follow_symlinks: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let root = super::absolute_arg(path)?;
    let storage =
        LocalStorage::new().follow_symlinks(follow_symlinks || ctx.config.walk.follow_symlinks);

    let mut entries = walk(&storage, &root, None).with_context(|| format!("Cannot walk {root}"))?;
    if let Some(depth) = max_depth.or(ctx.config.walk.max_depth) {
        entries = entries.max_depth(depth);
    }

    let mut count = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("Walk of {root} aborted"))?;
        writeln!(out, "{entry}")?;
        count += 1;
    }
    Ok(count)
}
