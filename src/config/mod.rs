//! Configuration file handling.

/// TOML parsing and validation
pub mod parser;

use crate::scanner::{ErrorPolicy, ScanOptions};
use crate::utils::hash::DEFAULT_CHUNK_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "HASHCHECK_CONFIG_PATH";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// `[scan]` section
    #[serde(default)]
    pub scan: ScanConfig,

    /// `[verify]` section
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// Settings shared by every scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// Follow symbolic links while walking
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Glob patterns skipped while walking
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Read buffer size for digests, in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Files captured concurrently; 1 keeps scans sequential
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Abort on the first unreadable file instead of collecting failures
    #[serde(default)]
    pub strict: bool,
}

/// Defaults for `verify`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Digest every file instead of trusting matching metadata
    #[serde(default)]
    pub full: bool,
    /// Exit non-zero when any change is found
    #[serde(default)]
    pub fail_on_change: bool,
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_jobs() -> usize {
    1
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            chunk_size: default_chunk_size(),
            jobs: default_jobs(),
            strict: false,
        }
    }
}

impl Config {
    /// Default location: `$HASHCHECK_CONFIG_PATH`, else
    /// `<config dir>/hashcheck/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("hashcheck").join("config.toml"))
    }

    /// Load configuration from a file
    ///
    /// A missing file yields the defaults; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Compiles the ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first pattern that is not a valid glob.
    pub fn ignore_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.scan
            .ignore_patterns
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid ignore pattern: {p}")))
            .collect()
    }

    /// Scanner options derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore pattern is invalid.
    pub fn scan_options(&self) -> Result<ScanOptions> {
        Ok(ScanOptions {
            policy: if self.scan.strict {
                ErrorPolicy::Abort
            } else {
                ErrorPolicy::Collect
            },
            follow_symlinks: self.scan.follow_symlinks,
            ignore_patterns: self.ignore_patterns()?,
            chunk_size: self.scan.chunk_size,
            jobs: self.scan.jobs,
        })
    }
}
