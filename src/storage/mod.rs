/// Versioned manifest files
pub mod manifest;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// How much of each file a scan captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanMode {
    /// Digest plus metadata for every file.
    #[default]
    Full,
    /// Metadata only; digests are left unset.
    Quick,
}

impl ScanMode {
    /// Lowercase name used in logs and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Quick => "quick",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured state of one file at one point in time.
///
/// Records built by [`FileRecord::full`] always carry a digest; records built
/// by [`FileRecord::quick`] never do. Records loaded from a manifest may have
/// any combination of fields, depending on the format version and on how the
/// manifest was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path as walked from the scan root
    pub path: PathBuf,
    /// XXH3-128 hex digest of the content
    pub digest: Option<String>,
    /// File size in bytes
    pub size: Option<u64>,
    /// Modification time in nanoseconds since the Unix epoch
    pub modified: Option<i64>,
}

impl FileRecord {
    /// Record produced by a full capture.
    #[must_use]
    pub const fn full(path: PathBuf, digest: String, size: u64, modified: i64) -> Self {
        Self {
            path,
            digest: Some(digest),
            size: Some(size),
            modified: Some(modified),
        }
    }

    /// Record produced by a quick capture.
    #[must_use]
    pub const fn quick(path: PathBuf, size: u64, modified: i64) -> Self {
        Self {
            path,
            digest: None,
            size: Some(size),
            modified: Some(modified),
        }
    }

    /// Whether both size and modification time are known.
    #[must_use]
    pub const fn has_metadata(&self) -> bool {
        self.size.is_some() && self.modified.is_some()
    }

    /// Whether size and modification time are both known and equal to `other`'s.
    #[must_use]
    pub fn metadata_matches(&self, other: &Self) -> bool {
        self.has_metadata() && self.size == other.size && self.modified == other.modified
    }
}

/// A set of file records keyed by path, built in one scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    mode: ScanMode,
    records: BTreeMap<PathBuf, FileRecord>,
}

impl Snapshot {
    /// Creates an empty snapshot for the given capture mode.
    #[must_use]
    pub const fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            records: BTreeMap::new(),
        }
    }

    /// Builds a snapshot from records. Later records replace earlier ones with
    /// the same path.
    #[must_use]
    pub fn from_records(mode: ScanMode, records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut snapshot = Self::new(mode);
        for record in records {
            snapshot.insert(record);
        }
        snapshot
    }

    pub(crate) fn insert(&mut self, record: FileRecord) {
        self.records.insert(record.path.clone(), record);
    }

    /// Capture mode this snapshot was built with.
    #[must_use]
    pub const fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Looks up the record for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Whether `path` was captured.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    /// Records in path order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.records.keys().map(PathBuf::as_path)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total of all known file sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.records.values().filter_map(|r| r.size).sum()
    }

    pub(crate) fn into_records(self) -> BTreeMap<PathBuf, FileRecord> {
        self.records
    }
}

/// Classification of one path after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    /// Content matches the baseline
    Unchanged,
    /// Content differs from the baseline
    Modified,
    /// Present now, absent from the baseline
    New,
    /// Present in the baseline, absent now
    Deleted,
}

impl ChangeKind {
    /// Returns a single-character representation of the change.
    #[must_use]
    pub const fn status_char(self) -> char {
        match self {
            Self::Unchanged => ' ',
            Self::Modified => 'M',
            Self::New => 'A',
            Self::Deleted => 'D',
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Modified => "modified",
            Self::New => "new file",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
