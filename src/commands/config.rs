use crate::WalkcacheContext;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut WalkcacheContext,
    key: Option<&str>,
    value: Option<&str>,
    unset: bool,
    list: bool,
) -> Result<()> {
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        ctx.reporter.done(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val)?;
        ctx.config.save(&ctx.config_path)?;
        ctx.reporter.done(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        ctx.reporter.warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &WalkcacheContext) {
    println!("{}", "[cache]".bold());
    println!("  root = {}", ctx.cache_root);
    println!(
        "  compression_level = {}",
        ctx.config.cache.compression_level
    );

    println!("\n{}", "[walk]".bold());
    println!("  follow_symlinks = {}", ctx.config.walk.follow_symlinks);
    if let Some(depth) = ctx.config.walk.max_depth {
        println!("  max_depth = {depth}");
    }
}
