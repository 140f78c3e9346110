//! Release assets for `wcache`: man pages and shell completion scripts,
//! both rendered from the clap definitions in `walkcache::cli`.
//!
//! ```text
//! cargo run -p xtask -- man --out-dir target/assets/man
//! cargo run -p xtask -- completions --out-dir target/assets/completions
//! cargo run -p xtask -- assets
//! ```

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkcache::cli::Cli;

/// Subcommands that only exist to support the shell and get no page.
const UNDOCUMENTED: &[&str] = &["completion", "help"];

#[derive(Parser)]
#[command(name = "xtask", about = "Generate wcache release assets")]
enum Task {
    /// Render wcache(1) and one wcache-<subcommand>(1) page per subcommand
    Man {
        #[arg(short, long, default_value = "target/assets/man")]
        out_dir: PathBuf,
    },
    /// Write completion scripts for every supported shell
    Completions {
        #[arg(short, long, default_value = "target/assets/completions")]
        out_dir: PathBuf,
    },
    /// Both of the above, under one directory
    Assets {
        #[arg(short, long, default_value = "target/assets")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let written = match Task::parse() {
        Task::Man { out_dir } => man_pages(&out_dir)?,
        Task::Completions { out_dir } => completions(&out_dir)?,
        Task::Assets { out_dir } => {
            let mut written = man_pages(&out_dir.join("man"))?;
            written.extend(completions(&out_dir.join("completions"))?);
            written
        }
    };

    for path in &written {
        println!("{}", path.display());
    }
    eprintln!("{} files written", written.len());
    Ok(())
}

fn render_page(dir: &Path, name: &str, cmd: Command) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.1"));
    let file = File::create(&path).with_context(|| format!("Cannot write {}", path.display()))?;
    let mut out = BufWriter::new(file);
    clap_mangen::Man::new(cmd).render(&mut out)?;
    out.flush()?;
    Ok(path)
}

fn man_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let cmd = Cli::command();
    let bin = cmd.get_name().to_string();

    let mut written = vec![render_page(dir, &bin, cmd.clone())?];
    for sub in cmd.get_subcommands() {
        if UNDOCUMENTED.contains(&sub.get_name()) {
            continue;
        }
        // Qualified name so the page header reads "wcache-walk"
        let name = format!("{bin}-{}", sub.get_name());
        let page = sub.clone().display_name(name.clone());
        written.push(render_page(dir, &name, page)?);
    }
    Ok(written)
}

fn completions(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();

    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let mut written = Vec::new();
    for shell in Shell::value_variants() {
        let path = clap_complete::generate_to(*shell, &mut cmd, &bin, dir)
            .with_context(|| format!("Cannot write {shell} completions"))?;
        written.push(path);
    }
    Ok(written)
}
