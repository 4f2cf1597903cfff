use crate::error::{HashcheckError, Result};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size and modification time of a file, read without touching its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// File size in bytes
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch
    pub modified: i64,
}

/// Stats `path` (following symlinks).
///
/// # Errors
///
/// Returns [`HashcheckError::FileUnreadable`] if the path no longer exists or
/// the platform cannot report a modification time for it.
pub fn probe(path: &Path) -> Result<FileMeta> {
    let metadata = std::fs::metadata(path).map_err(|e| HashcheckError::unreadable(path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| HashcheckError::unreadable(path, e))?;

    Ok(FileMeta {
        size: metadata.len(),
        modified: system_time_to_nanos(modified),
    })
}

/// Converts a timestamp to signed nanoseconds since the epoch, saturating at
/// the `i64` range (roughly years 1677 to 2262).
#[must_use]
pub fn system_time_to_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}

/// Formats a nanosecond timestamp in local time for display.
#[must_use]
pub fn format_modified(nanos: i64) -> String {
    let dt = chrono::DateTime::from_timestamp_nanos(nanos).with_timezone(&chrono::Local);
    dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
