//! Command-line interface definitions for hashcheck.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for hashcheck.
#[derive(Parser)]
#[command(
    name = "hashcheck",
    version = crate::VERSION,
    about = "Detect file changes against a recorded hash manifest",
    long_about = "Captures a manifest of content digests, sizes and modification times for a \
                  directory tree, then reports which files were modified, added or deleted since"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default
    #[arg(long, global = true, value_name = "PATH", env = "HASHCHECK_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory (or single file) and write its manifest
    Capture {
        /// Directory or file to scan
        root: PathBuf,

        /// Manifest file to write
        manifest: PathBuf,

        /// Record sizes and modification times only, without digests
        #[arg(long)]
        quick: bool,

        /// Abort on the first unreadable file
        #[arg(long)]
        strict: bool,

        /// Files to capture concurrently (0 = one per CPU)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Compare a directory against a previously captured manifest
    Verify {
        /// Directory or file to scan
        root: PathBuf,

        /// Manifest file to compare against
        manifest: PathBuf,

        /// Digest every file instead of trusting matching metadata
        #[arg(long)]
        full: bool,

        /// Abort on the first unreadable file
        #[arg(long)]
        strict: bool,

        /// Show one status letter and path per line
        #[arg(short, long)]
        short: bool,

        /// Exit with status 3 when any file changed
        #[arg(long)]
        fail_on_change: bool,

        /// Files to scan concurrently (0 = one per CPU)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
