//! Status reporting for the `wcache` binary.
//!
//! Command results (walked paths, decoded values) go to stdout. A
//! [`Reporter`] writes everything else to stderr, filtered by the
//! [`Verbosity`] chosen on the command line, so piped output stays clean.

use crate::cache::{CacheRoot, Origin};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// How much the binary says besides its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings only.
    Quiet,
    /// Outcomes of commands that change the cache root.
    #[default]
    Normal,
    /// Also where each value came from and how many entries were walked.
    Verbose,
}

impl Verbosity {
    /// Level selected by the global `--quiet` / `--verbose` flags.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Kind of a status line, which decides its colour and when it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Something was removed or written.
    Done,
    /// Nothing needed doing.
    Idle,
    /// Diagnostic detail.
    Detail,
    /// Always shown.
    Warning,
}

impl Tone {
    /// Quietest verbosity at which this tone is still printed.
    const fn threshold(self) -> Verbosity {
        match self {
            Self::Warning => Verbosity::Quiet,
            Self::Done | Self::Idle => Verbosity::Normal,
            Self::Detail => Verbosity::Verbose,
        }
    }

    /// Style `message` for this tone.
    fn paint(self, message: &str) -> ColoredString {
        match self {
            Self::Done => message.green(),
            Self::Idle | Self::Detail => message.dimmed(),
            Self::Warning => message.yellow().bold(),
        }
    }
}

/// Writes status lines for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reporter {
    /// Lines quieter than this are dropped
    verbosity: Verbosity,
}

impl Reporter {
    /// Reporter printing at `verbosity`.
    #[must_use]
    pub const fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether a line of `tone` would be printed.
    #[must_use]
    pub fn shows(&self, tone: Tone) -> bool {
        self.verbosity >= tone.threshold()
    }

    /// Write one status line to `out` if `tone` is shown.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn write_line(&self, out: &mut impl Write, tone: Tone, message: &str) -> io::Result<()> {
        if !self.shows(tone) {
            return Ok(());
        }
        writeln!(out, "{}", tone.paint(message))
    }

    /// Write one status line to stderr.
    pub fn say(&self, tone: Tone, message: &str) {
        // A closed stderr has nowhere left to report to
        let _ = self.write_line(&mut io::stderr().lock(), tone, message);
    }

    /// Report the result of a purge.
    pub fn purged(&self, removed: usize, root: &CacheRoot) {
        let (tone, message) = purge_summary(removed, root);
        self.say(tone, &message);
    }

    /// Report the result of invalidating one source.
    pub fn invalidated(&self, source: &str, removed: bool) {
        if removed {
            self.say(Tone::Done, &format!("Invalidated {source}"));
        } else {
            self.say(Tone::Idle, &format!("No artifact for {source}"));
        }
    }

    /// Report where a loaded value came from.
    pub fn loaded(&self, origin: Origin) {
        let message = match origin {
            Origin::Artifact => "served from compiled artifact",
            Origin::Compiled => "compiled from source",
        };
        self.say(Tone::Detail, message);
    }

    /// Report a diagnostic detail.
    pub fn detail(&self, message: &str) {
        self.say(Tone::Detail, message);
    }

    /// Report a configuration change.
    pub fn done(&self, message: &str) {
        self.say(Tone::Done, message);
    }

    /// Report a problem that does not stop the command.
    pub fn warning(&self, message: &str) {
        self.say(Tone::Warning, message);
    }
}

/// Wording for a purge that removed `removed` artifacts from `root`.
fn purge_summary(removed: usize, root: &CacheRoot) -> (Tone, String) {
    match removed {
        0 => (Tone::Idle, format!("Nothing to purge in {root}")),
        1 => (Tone::Done, format!("Removed 1 artifact from {root}")),
        n => (Tone::Done, format!("Removed {n} artifacts from {root}")),
    }
}
