#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters and size calculations cannot overflow
#![allow(clippy::float_arithmetic)] // Required for file size formatting
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # hashcheck - content-hash change detection
//!
//! hashcheck records a manifest of every file under a directory (content
//! digest, size and modification time) and later compares the live tree
//! against it, reporting each path as unchanged, modified, new or deleted.
//!
//! ## Architecture
//!
//! - [`utils::hash`]: streaming xxHash3 digests
//! - [`scanner`]: metadata probe and tree scanner (full and quick modes)
//! - [`storage`]: file records, snapshots and the versioned manifest codec
//! - [`reconcile`]: classification of a fresh snapshot against a manifest
//! - [`commands`]: the `capture` and `verify` command implementations
//! - [`config`], [`logging`], [`output`]: configuration, diagnostics and
//!   console output
//!
//! ## Example Usage
//!
//! ```no_run
//! use hashcheck::reconcile::Reconciler;
//! use hashcheck::scanner::{ScanMode, ScanOptions, Scanner};
//! use hashcheck::storage::manifest;
//! use std::path::Path;
//!
//! # fn main() -> hashcheck::error::Result<()> {
//! let scanner = Scanner::new(ScanOptions::default());
//! let report = scanner.scan(Path::new("photos"), ScanMode::Full)?;
//! manifest::save(&report.snapshot, Path::new("photos.manifest"))?;
//!
//! // Later
//! let baseline = manifest::load(Path::new("photos.manifest"))?;
//! let fresh = scanner.scan(Path::new("photos"), ScanMode::Quick)?;
//! let changes = Reconciler::default().reconcile(&fresh.snapshot, &baseline)?;
//! for (path, kind) in changes.changes() {
//!     println!("{kind}: {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Typed errors and exit statuses.
pub mod error;

/// Diagnostic logging setup.
pub mod logging;

/// Output formatting and progress display.
pub mod output;

/// Snapshot-versus-manifest reconciliation.
pub mod reconcile;

/// Filesystem scanning and metadata probing.
pub mod scanner;

/// File records, snapshots and manifests.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

use anyhow::Result;
use std::path::PathBuf;

/// Current version of the hashcheck binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Central context for hashcheck commands.
///
/// Holds the resolved configuration and where it came from.
///
/// # Examples
///
/// ```no_run
/// use hashcheck::HashcheckContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Default location ($HASHCHECK_CONFIG_PATH or the user config dir)
/// let ctx = HashcheckContext::new(None)?;
///
/// // Explicit file (for testing)
/// let ctx = HashcheckContext::new(Some("/tmp/hashcheck.toml".into()))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HashcheckContext {
    /// Configuration file the settings were read from, if any.
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl HashcheckContext {
    /// Loads the configuration from `config_path`, or from
    /// [`config::Config::default_path`] when `None`.
    ///
    /// A missing file gives the default configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration file exists but cannot be read,
    /// parsed or validated.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.or_else(config::Config::default_path);
        let config = match &config_path {
            Some(path) => config::Config::load(path)?,
            None => config::Config::default(),
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Builds a context around an in-memory configuration.
    #[must_use]
    pub const fn with_config(config: config::Config) -> Self {
        Self {
            config_path: None,
            config,
        }
    }
}
