//! Tree scanning.
//!
//! A [`Scanner`] walks a root path and captures a [`FileRecord`] for every
//! regular file beneath it. Each file yields a [`ScanOutcome`]; whether a
//! failure aborts the scan or is collected alongside the snapshot is decided
//! by [`ErrorPolicy`].

/// Size and modification time lookups.
pub mod probe;

pub use crate::storage::ScanMode;
pub use probe::{FileMeta, probe};

use crate::error::{HashcheckError, Result};
use crate::storage::{FileRecord, Snapshot};
use crate::utils::hash::{DEFAULT_CHUNK_SIZE, hash_file_streaming};
use crate::utils::thread_pool;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{Level, debug, span};
use walkdir::WalkDir;

/// What to do when a single file cannot be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record the failure, leave the file out of the snapshot and keep going.
    #[default]
    Collect,
    /// Stop at the first failure and return it.
    Abort,
}

/// Scanner settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Failure handling
    pub policy: ErrorPolicy,
    /// Whether to follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Glob patterns for entries to skip, matched against the path relative
    /// to the root and against the file name
    pub ignore_patterns: Vec<glob::Pattern>,
    /// Read buffer size for digests
    pub chunk_size: usize,
    /// Number of files captured concurrently (1 = sequential)
    pub jobs: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::Collect,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            jobs: 1,
        }
    }
}

/// Result of capturing one file.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The file was captured
    Captured(FileRecord),
    /// The file could not be read
    Failed(HashcheckError),
}

impl ScanOutcome {
    /// Size of the captured file, or zero for a failure.
    #[must_use]
    pub fn captured_bytes(&self) -> u64 {
        match self {
            Self::Captured(record) => record.size.unwrap_or(0),
            Self::Failed(_) => 0,
        }
    }
}

/// Everything a scan produced.
#[derive(Debug)]
pub struct ScanReport {
    /// Successfully captured files
    pub snapshot: Snapshot,
    /// Files (or directory entries) that could not be read
    pub failures: Vec<HashcheckError>,
    /// Wall-clock duration of the scan
    pub elapsed: Duration,
}

impl ScanReport {
    /// Whether every file was captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walks a root and captures file records.
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Creates a scanner with the given options.
    #[must_use]
    pub const fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scanner options.
    #[must_use]
    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scans `root` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`HashcheckError::FileUnreadable`] if the root itself cannot be
    /// stat'ed, or, under [`ErrorPolicy::Abort`], for the first file that
    /// cannot be captured.
    pub fn scan(&self, root: &Path, mode: ScanMode) -> Result<ScanReport> {
        self.scan_with_progress(root, mode, |_, _, _| {})
    }

    /// Like [`Scanner::scan`], calling `on_progress(done, total, bytes)` as
    /// files are captured, where `bytes` is the size of what was just
    /// captured. With `jobs > 1` progress is reported once, when all files are
    /// done, with the combined size.
    ///
    /// # Errors
    ///
    /// See [`Scanner::scan`].
    pub fn scan_with_progress<F>(
        &self,
        root: &Path,
        mode: ScanMode,
        mut on_progress: F,
    ) -> Result<ScanReport>
    where
        F: FnMut(usize, usize, u64),
    {
        let span = span!(Level::DEBUG, "scan", root = %root.display(), mode = %mode);
        let _guard = span.enter();
        let started = Instant::now();

        let (paths, mut failures) = self.list_files(root)?;
        let total = paths.len();
        debug!(files = total, walk_failures = failures.len(), "Walk complete");

        let chunk_size = self.options.chunk_size;
        let outcomes: Vec<ScanOutcome> = if self.options.jobs > 1 {
            let outcomes = thread_pool::run_in_pool(self.options.jobs, || {
                paths
                    .par_iter()
                    .map(|path| capture(path, mode, chunk_size))
                    .collect::<Vec<_>>()
            })?;
            let bytes = outcomes.iter().map(ScanOutcome::captured_bytes).sum();
            on_progress(total, total, bytes);
            outcomes
        } else {
            let mut outcomes = Vec::with_capacity(total);
            for (done, path) in paths.iter().enumerate() {
                match capture(path, mode, chunk_size) {
                    ScanOutcome::Failed(err) if self.options.policy == ErrorPolicy::Abort => {
                        return Err(err);
                    }
                    outcome => {
                        on_progress(done + 1, total, outcome.captured_bytes());
                        outcomes.push(outcome);
                    }
                }
            }
            outcomes
        };

        let mut snapshot = Snapshot::new(mode);
        for outcome in outcomes {
            match outcome {
                ScanOutcome::Captured(record) => snapshot.insert(record),
                ScanOutcome::Failed(err) => {
                    if self.options.policy == ErrorPolicy::Abort {
                        return Err(err);
                    }
                    debug!("{err}");
                    failures.push(err);
                }
            }
        }

        let elapsed = started.elapsed();
        debug!(
            captured = snapshot.len(),
            failed = failures.len(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Scan complete"
        );

        Ok(ScanReport {
            snapshot,
            failures,
            elapsed,
        })
    }

    /// Lists every regular file under `root` in a stable order, together with
    /// any directory entries that could not be read.
    ///
    /// A file root yields just that file.
    ///
    /// # Errors
    ///
    /// Returns [`HashcheckError::FileUnreadable`] if the root cannot be
    /// stat'ed, or, under [`ErrorPolicy::Abort`], for the first unreadable
    /// entry.
    pub fn list_files(&self, root: &Path) -> Result<(Vec<PathBuf>, Vec<HashcheckError>)> {
        let root_meta = std::fs::metadata(root).map_err(|e| HashcheckError::unreadable(root, e))?;
        if !root_meta.is_dir() {
            return Ok((vec![root.to_path_buf()], Vec::new()));
        }

        let mut files = Vec::new();
        let mut failures = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.should_skip(root, e.path()))
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let failure = walk_error(root, err);
                    if self.options.policy == ErrorPolicy::Abort {
                        return Err(failure);
                    }
                    debug!("{failure}");
                    failures.push(failure);
                }
            }
        }

        Ok((files, failures))
    }

    fn should_skip(&self, root: &Path, path: &Path) -> bool {
        if self.options.ignore_patterns.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = path.file_name().map(Path::new);

        self.options.ignore_patterns.iter().any(|pattern| {
            pattern.matches_path(relative) || name.is_some_and(|n| pattern.matches_path(n))
        })
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> HashcheckError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    HashcheckError::FileUnreadable { path, source }
}

/// Captures one file in the given mode.
///
/// # Errors
///
/// Returns [`HashcheckError::FileUnreadable`] if the file cannot be stat'ed or,
/// in full mode, read.
pub fn capture_file(path: &Path, mode: ScanMode, chunk_size: usize) -> Result<FileRecord> {
    let meta = probe(path)?;
    match mode {
        ScanMode::Full => {
            let digest = hash_file_streaming(path, chunk_size)?;
            Ok(FileRecord::full(
                path.to_path_buf(),
                digest,
                meta.size,
                meta.modified,
            ))
        }
        ScanMode::Quick => Ok(FileRecord::quick(
            path.to_path_buf(),
            meta.size,
            meta.modified,
        )),
    }
}

fn capture(path: &Path, mode: ScanMode, chunk_size: usize) -> ScanOutcome {
    match capture_file(path, mode, chunk_size) {
        Ok(record) => ScanOutcome::Captured(record),
        Err(err) => ScanOutcome::Failed(err),
    }
}
