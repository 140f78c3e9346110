use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;
use walkcache::cache::CacheRoot;
use walkcache::cli::{Cli, Commands};
use walkcache::output::{Reporter, Verbosity};
use walkcache::{WalkcacheContext, commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "walkcache=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    let reporter = Reporter::new(Verbosity::from_flags(cli.quiet, cli.verbose));

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    // An empty --cache-dir or environment value means "use the default"
    let cache_root = CacheRoot::from_override(cli.cache_dir.map(OsString::from));
    let mut ctx = WalkcacheContext::new(cache_root, reporter)?;
    ctx.reporter.detail(&format!("cache root: {}", ctx.cache_root));

    match cli.command {
        Commands::Walk {
            path,
            max_depth,
            follow_symlinks,
        } => commands::walk::execute(&ctx, &path, max_depth, follow_symlinks)?,
        Commands::Load { file } => commands::load::execute(&ctx, &file)?,
        Commands::Stat { file } => commands::stat::execute(&ctx, &file)?,
        Commands::Invalidate { file } => commands::invalidate::execute(&ctx, &file)?,
        Commands::Purge => commands::purge::execute(&ctx)?,
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => commands::config::execute(&mut ctx, key.as_deref(), value.as_deref(), unset, list)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
