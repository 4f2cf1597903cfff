//! Reconciliation of a fresh snapshot against a stored manifest.
//!
//! The strategy follows the fresh snapshot's capture mode:
//!
//! - **Full**: digests are compared directly.
//! - **Quick**: a baseline whose size and modification time both match is
//!   trusted without reading the file. Anything else is digested on demand and
//!   compared against the baseline digest, so a touched-but-identical file is
//!   still reported as unchanged.
//!
//! Baselines captured without a digest can only be judged on metadata.

use crate::error::Result;
use crate::storage::manifest::Manifest;
use crate::storage::{ChangeKind, FileRecord, ScanMode, Snapshot};
use crate::utils::hash::{DEFAULT_CHUNK_SIZE, hash_file_streaming};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Classification of every path seen in either the baseline or the fresh scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    strategy: ScanMode,
    entries: BTreeMap<PathBuf, ChangeKind>,
    rehashed: usize,
    metadata_only: usize,
}

impl ReconciliationReport {
    /// Strategy that produced the report.
    #[must_use]
    pub const fn strategy(&self) -> ScanMode {
        self.strategy
    }

    /// Classification for `path`, if it appeared on either side.
    #[must_use]
    pub fn classification(&self, path: &Path) -> Option<ChangeKind> {
        self.entries.get(path).copied()
    }

    /// Every classified path, in order.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, ChangeKind)> {
        self.entries.iter().map(|(p, k)| (p.as_path(), *k))
    }

    /// Paths that are not unchanged, in order.
    pub fn changes(&self) -> impl Iterator<Item = (&Path, ChangeKind)> {
        self.entries().filter(|(_, k)| *k != ChangeKind::Unchanged)
    }

    /// Paths that are not unchanged.
    #[must_use]
    pub fn changed_paths(&self) -> Vec<&Path> {
        self.changes().map(|(p, _)| p).collect()
    }

    /// Number of paths with the given classification.
    #[must_use]
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.entries.values().filter(|k| **k == kind).count()
    }

    /// Number of unchanged files.
    #[must_use]
    pub fn unchanged_count(&self) -> usize {
        self.count(ChangeKind::Unchanged)
    }

    /// Number of files that had to be digested during quick reconciliation.
    #[must_use]
    pub const fn rehashed(&self) -> usize {
        self.rehashed
    }

    /// Number of files judged on size and modification time alone because the
    /// baseline holds no digest for them.
    #[must_use]
    pub const fn metadata_only(&self) -> usize {
        self.metadata_only
    }

    /// Total number of classified paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no paths were classified at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every path is unchanged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.values().all(|k| *k == ChangeKind::Unchanged)
    }
}

/// Compares fresh snapshots with stored manifests.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    chunk_size: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Reconciler {
    /// Creates a reconciler that digests with the given chunk size.
    #[must_use]
    pub const fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Classifies every path in `fresh` and `baseline`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::HashcheckError::FileUnreadable`] if a file that
    /// needs an on-demand digest cannot be read.
    pub fn reconcile(&self, fresh: &Snapshot, baseline: &Manifest) -> Result<ReconciliationReport> {
        let chunk_size = self.chunk_size;
        self.reconcile_with(fresh, baseline, |record| {
            hash_file_streaming(&record.path, chunk_size)
        })
    }

    /// Like [`Reconciler::reconcile`], with the on-demand digest supplied by
    /// the caller. `digest` receives the fresh record of the file to hash.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `digest`.
    pub fn reconcile_with<D>(
        &self,
        fresh: &Snapshot,
        baseline: &Manifest,
        mut digest: D,
    ) -> Result<ReconciliationReport>
    where
        D: FnMut(&FileRecord) -> Result<String>,
    {
        let strategy = fresh.mode();
        let span = span!(Level::DEBUG, "reconcile", strategy = %strategy, fresh = fresh.len(), baseline = baseline.len());
        let _guard = span.enter();

        let mut entries = BTreeMap::new();
        let mut rehashed = 0;
        let mut metadata_only = 0;

        for current in fresh.records() {
            let kind = match baseline.get(&current.path) {
                None => ChangeKind::New,
                Some(stored) => {
                    let (kind, basis) = classify(strategy, current, stored, &mut digest)?;
                    match basis {
                        Basis::Rehashed => rehashed += 1,
                        Basis::Metadata => metadata_only += 1,
                        Basis::Recorded => {}
                    }
                    kind
                }
            };
            entries.insert(current.path.clone(), kind);
        }

        for stored in baseline.records() {
            if !fresh.contains(&stored.path) {
                entries.insert(stored.path.clone(), ChangeKind::Deleted);
            }
        }

        debug!(
            classified = entries.len(),
            rehashed,
            metadata_only,
            "Reconciliation complete"
        );

        Ok(ReconciliationReport {
            strategy,
            entries,
            rehashed,
            metadata_only,
        })
    }
}

/// What a classification was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Basis {
    /// Recorded values: stored digests, or matching metadata in quick mode.
    Recorded,
    /// A digest computed on demand.
    Rehashed,
    /// Size and modification time only; the baseline has no digest.
    Metadata,
}

/// Decides one path present on both sides.
fn classify<D>(
    strategy: ScanMode,
    current: &FileRecord,
    stored: &FileRecord,
    digest: &mut D,
) -> Result<(ChangeKind, Basis)>
where
    D: FnMut(&FileRecord) -> Result<String>,
{
    let Some(stored_digest) = stored.digest.as_deref() else {
        // Nothing to compare content against.
        return Ok((metadata_verdict(current, stored), Basis::Metadata));
    };

    if strategy == ScanMode::Full
        && let Some(current_digest) = current.digest.as_deref()
    {
        return Ok((digest_verdict(current_digest, stored_digest), Basis::Recorded));
    }

    if stored.metadata_matches(current) {
        return Ok((ChangeKind::Unchanged, Basis::Recorded));
    }

    debug!(path = %current.path.display(), "Metadata differs or is unknown, digesting");
    let current_digest = digest(current)?;
    Ok((digest_verdict(&current_digest, stored_digest), Basis::Rehashed))
}

fn digest_verdict(current: &str, stored: &str) -> ChangeKind {
    if current.eq_ignore_ascii_case(stored) {
        ChangeKind::Unchanged
    } else {
        ChangeKind::Modified
    }
}

fn metadata_verdict(current: &FileRecord, stored: &FileRecord) -> ChangeKind {
    if stored.metadata_matches(current) {
        ChangeKind::Unchanged
    } else {
        ChangeKind::Modified
    }
}
