//! Console output for the hashcheck CLI.
//!
//! Messages go to stderr so that the per-file change listing on stdout can be
//! piped. Verbosity is process-wide and set once from the command line.

mod progress;

use crate::storage::ChangeKind;
use colored::{ColoredString, Colorize};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::Progress;

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only warnings, errors and the change listing.
    Quiet = 0,
    /// Default level.
    Normal = 1,
    /// Also per-file details such as fallback digests.
    Verbose = 2,
}

impl Verbosity {
    /// Picks a level from the `--quiet` / `--verbose` flags; quiet wins.
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

static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a message only in verbose mode.
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

fn colored_label(kind: ChangeKind) -> ColoredString {
    match kind {
        ChangeKind::Unchanged => kind.label().normal(),
        ChangeKind::Modified => kind.label().yellow(),
        ChangeKind::New => kind.label().green(),
        ChangeKind::Deleted => kind.label().red(),
    }
}

/// Prints one classified path to stdout.
///
/// Short form is `M path`; long form is `  modified: path`.
pub fn change(kind: ChangeKind, path: &Path, short: bool) {
    if short {
        println!("{} {}", kind.status_char(), path.display());
    } else {
        println!("  {}: {}", colored_label(kind), path.display());
    }
}

/// Starts a new progress bar for tracking long operations.
#[must_use]
pub fn start_progress(title: &str, total: usize) -> Progress {
    Progress::new(title, total, get_verbosity() != Verbosity::Quiet)
}
