//! Versioned, line-oriented manifest files.
//!
//! A manifest is a snapshot written to disk with its format version on the
//! first line and one record per following line:
//!
//! ```text
//! 0.2
//! <path>::::<digest>::::<size>::::<modified>
//! ```
//!
//! Version `0.1` manifests carry only `<path>::::<digest>`. Absent fields are
//! written as empty strings. Lines are split from the right with the exact
//! field count of the declared version, and the trailing fields never contain
//! `:`, so a path that itself contains the delimiter still round-trips. Paths
//! with line breaks cannot be represented and are rejected when saving.

use super::{FileRecord, Snapshot};
use crate::error::{HashcheckError, Result};
use crate::utils::hash::{DIGEST_LEN, is_digest};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Field separator within a record line.
pub const DELIMITER: &str = "::::";

/// Manifest format versions this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// Path and digest only
    V0_1,
    /// Path, digest, size and modification time
    V0_2,
}

impl FormatVersion {
    /// Version written by [`save`].
    pub const CURRENT: Self = Self::V0_2;

    /// Every version [`load`] accepts, newest first.
    pub const SUPPORTED: [Self; 2] = [Self::V0_2, Self::V0_1];

    /// Header string for this version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V0_1 => "0.1",
            Self::V0_2 => "0.2",
        }
    }

    /// Parses a header string, returning `None` for unrecognized versions.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|v| v.as_str() == s)
    }

    /// Number of delimiter-separated fields on each record line.
    #[must_use]
    pub const fn field_count(self) -> usize {
        match self {
            Self::V0_1 => 2,
            Self::V0_2 => 4,
        }
    }

    /// Whether records of this version carry size and modification time.
    #[must_use]
    pub const fn has_metadata(self) -> bool {
        matches!(self, Self::V0_2)
    }

    fn supported_strings() -> Vec<String> {
        Self::SUPPORTED
            .iter()
            .map(|v| v.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot loaded from (or destined for) disk, tagged with its format version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    version: FormatVersion,
    records: BTreeMap<PathBuf, FileRecord>,
}

impl Manifest {
    /// Wraps a snapshot as a current-version manifest.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            version: FormatVersion::CURRENT,
            records: snapshot.into_records(),
        }
    }

    /// Format version the manifest was read as.
    #[must_use]
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// True when the manifest uses a recognized but outdated format.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.version != FormatVersion::CURRENT
    }

    /// Non-fatal warning for outdated formats.
    #[must_use]
    pub fn compatibility_warning(&self) -> Option<HashcheckError> {
        self.is_degraded()
            .then(|| HashcheckError::ManifestVersionDeprecated {
                found: self.version.as_str().to_string(),
                current: FormatVersion::CURRENT.as_str().to_string(),
            })
    }

    /// Looks up the record for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
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

    /// Whether the manifest holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Renders a snapshot in the current manifest format.
///
/// # Errors
///
/// Returns [`HashcheckError::UnencodablePath`] if a path is not valid UTF-8 or
/// contains a line break.
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    let mut out = String::with_capacity(64 * (snapshot.len() + 1));
    out.push_str(FormatVersion::CURRENT.as_str());
    out.push('\n');

    for record in snapshot.records() {
        let path = encodable_path(&record.path)?;
        let digest = record.digest.as_deref().unwrap_or("");
        let size = record.size.map(|s| s.to_string()).unwrap_or_default();
        let modified = record.modified.map(|m| m.to_string()).unwrap_or_default();

        out.push_str(path);
        for field in [digest, size.as_str(), modified.as_str()] {
            out.push_str(DELIMITER);
            out.push_str(field);
        }
        out.push('\n');
    }

    Ok(out)
}

fn encodable_path(path: &Path) -> Result<&str> {
    let s = path.to_str().ok_or_else(|| HashcheckError::UnencodablePath {
        path: path.to_path_buf(),
        reason: "not valid UTF-8",
    })?;
    if s.contains(['\n', '\r']) {
        return Err(HashcheckError::UnencodablePath {
            path: path.to_path_buf(),
            reason: "contains a line break",
        });
    }
    Ok(s)
}

/// Writes a snapshot to `destination` in the current format.
///
/// The file is written to a temporary sibling and renamed into place, so an
/// existing manifest is never left half-written. Parent directories are
/// created as needed.
///
/// # Errors
///
/// Returns [`HashcheckError::UnencodablePath`] before touching the disk if any
/// path cannot be encoded, or [`HashcheckError::ManifestIo`] if writing fails.
pub fn save(snapshot: &Snapshot, destination: &Path) -> Result<()> {
    let content = encode(snapshot)?;
    let io_err = |source| HashcheckError::ManifestIo {
        path: destination.to_path_buf(),
        source,
    };

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_err)?;

    let temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        writer.write_all(content.as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp.persist(destination).map_err(|e| io_err(e.error))?;

    info!(
        manifest = %destination.display(),
        records = snapshot.len(),
        version = %FormatVersion::CURRENT,
        "Manifest saved"
    );
    Ok(())
}

/// Reads a manifest from `source`.
///
/// # Errors
///
/// - [`HashcheckError::ManifestIo`] if the file cannot be read
/// - [`HashcheckError::ManifestVersionUnsupported`] for an unrecognized version
/// - [`HashcheckError::ManifestMalformed`] if the header or any record is invalid
pub fn load(source: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(source).map_err(|e| HashcheckError::ManifestIo {
        path: source.to_path_buf(),
        source: e,
    })?;
    let manifest = decode(&content, source)?;

    if let Some(warning) = manifest.compatibility_warning() {
        info!(manifest = %source.display(), "{warning}");
    }
    info!(
        manifest = %source.display(),
        records = manifest.len(),
        version = %manifest.version(),
        "Manifest loaded"
    );
    Ok(manifest)
}

/// Parses manifest text. `source` is only used in error messages.
///
/// # Errors
///
/// Same as [`load`], minus the I/O failure.
pub fn decode(content: &str, source: &Path) -> Result<Manifest> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| malformed(source, 1, "missing format version".to_string()))?;

    let version =
        FormatVersion::parse(header).ok_or_else(|| HashcheckError::ManifestVersionUnsupported {
            found: header.to_string(),
            supported: FormatVersion::supported_strings(),
        })?;

    let mut records = BTreeMap::new();
    for (index, line) in lines.enumerate() {
        let line_no = index + 2;
        if line.is_empty() {
            continue;
        }
        let record = parse_record(line, version).map_err(|reason| malformed(source, line_no, reason))?;
        if let Some(previous) = records.insert(record.path.clone(), record) {
            debug!(path = %previous.path.display(), line = line_no, "Duplicate manifest entry replaced");
        }
    }

    Ok(Manifest { version, records })
}

fn malformed(source: &Path, line: usize, reason: String) -> HashcheckError {
    HashcheckError::ManifestMalformed {
        path: source.to_path_buf(),
        line,
        reason,
    }
}

fn parse_record(line: &str, version: FormatVersion) -> std::result::Result<FileRecord, String> {
    let expected = version.field_count();
    // rsplitn yields the trailing fields first and leaves the path intact.
    let mut fields: Vec<&str> = line.rsplitn(expected, DELIMITER).collect();
    if fields.len() != expected {
        return Err(format!(
            "expected {expected} fields for version {version}, found {}",
            fields.len()
        ));
    }
    fields.reverse();

    let path = fields[0];
    if path.is_empty() {
        return Err("empty path".to_string());
    }

    let digest = match fields[1] {
        "" => None,
        d if !d.bytes().all(|b| b.is_ascii_hexdigit()) => {
            return Err(format!("invalid digest '{d}'"));
        }
        d if !is_digest(d) => {
            return Err(format!(
                "digest has {} hex characters, expected {DIGEST_LEN}; the manifest was written with a different digest algorithm",
                d.len()
            ));
        }
        d => Some(d.to_ascii_lowercase()),
    };

    let (size, modified) = if version.has_metadata() {
        let size = optional_number::<u64>(fields[2], "size")?;
        let modified = optional_number::<i64>(fields[3], "modification time")?;
        (size, modified)
    } else {
        (None, None)
    };

    Ok(FileRecord {
        path: PathBuf::from(path),
        digest,
        size,
        modified,
    })
}

fn optional_number<T: std::str::FromStr>(
    field: &str,
    what: &str,
) -> std::result::Result<Option<T>, String> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| format!("invalid {what} '{field}'"))
}
