//! Error taxonomy for capture and verification.
//!
//! Library code returns [`Result`] with a [`HashcheckError`]; the command layer
//! wraps these in `anyhow` and uses [`HashcheckError::exit_code`] to choose the
//! process exit status.

use std::path::PathBuf;

/// Convenience alias used throughout the library.
pub type Result<T, E = HashcheckError> = std::result::Result<T, E>;

/// Exit status for generic failures (I/O, malformed manifest, strict abort).
pub const EXIT_FAILURE: i32 = 1;

/// Exit status when the manifest declares a version this build cannot read.
pub const EXIT_UNSUPPORTED_VERSION: i32 = 2;

/// Exit status when verification found changes and the caller asked to fail on them.
pub const EXIT_CHANGES_FOUND: i32 = 3;

/// Errors raised by the digest engine, scanner, manifest codec and reconciler.
#[derive(Debug, thiserror::Error)]
pub enum HashcheckError {
    /// A file could not be opened, read or stat'ed.
    #[error("Cannot read {}: {source}", path.display())]
    FileUnreadable {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The manifest header names a format version outside the recognized set.
    #[error(
        "Unsupported manifest version: {found} (supported versions: {})",
        supported.join(", ")
    )]
    ManifestVersionUnsupported {
        /// Version string read from the manifest header
        found: String,
        /// Versions this build can load
        supported: Vec<String>,
    },

    /// The manifest uses a recognized but older format. Never returned as `Err`;
    /// surfaced through [`crate::storage::manifest::Manifest::compatibility_warning`].
    #[error(
        "Manifest version {found} is not the current version ({current}); size and modification time checks are unavailable"
    )]
    ManifestVersionDeprecated {
        /// Version string read from the manifest header
        found: String,
        /// Version written by this build
        current: String,
    },

    /// A manifest line does not parse for the declared version.
    #[error("Malformed manifest {} at line {line}: {reason}", path.display())]
    ManifestMalformed {
        /// Manifest file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A path cannot be written to the line-oriented manifest format.
    #[error("Cannot store path {} in a manifest: {reason}", path.display())]
    UnencodablePath {
        /// Offending path
        path: PathBuf,
        /// Why it cannot be encoded
        reason: &'static str,
    },

    /// The manifest file itself could not be read or written.
    #[error("Manifest I/O failed for {}: {source}", path.display())]
    ManifestIo {
        /// Manifest file
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The worker pool for parallel capture could not be started.
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl HashcheckError {
    /// Builds a [`HashcheckError::FileUnreadable`] for `path`.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Process exit status associated with this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ManifestVersionUnsupported { .. } => EXIT_UNSUPPORTED_VERSION,
            _ => EXIT_FAILURE,
        }
    }

    /// Path the error refers to, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileUnreadable { path, .. }
            | Self::ManifestMalformed { path, .. }
            | Self::UnencodablePath { path, .. }
            | Self::ManifestIo { path, .. } => Some(path),
            Self::ManifestVersionUnsupported { .. }
            | Self::ManifestVersionDeprecated { .. }
            | Self::WorkerPool(_) => None,
        }
    }
}
