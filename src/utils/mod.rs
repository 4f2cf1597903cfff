//! Utility functions and helpers.
//!
//! - [`hash`]: streaming content digests
//! - [`thread_pool`]: shared worker pool for parallel capture
//!
//! # Examples
//!
//! ```
//! use hashcheck::utils::format_size;
//!
//! assert_eq!(format_size(1024 * 1024), "1.00 MB");
//! ```

/// Content digests (xxHash3, 128-bit)
pub mod hash;
/// Thread pool configuration for parallel operations
pub mod thread_pool;

/// Formats a byte count into a human-readable string (e.g. "1.50 MB").
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size.round() as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
