//! Content digests.
//!
//! Files are hashed with XXH3-128 by streaming them through a fixed-size
//! buffer, so memory use is bounded by the chunk size no matter how large
//! the file is. The chunk size never changes the digest.

use crate::error::{HashcheckError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Default read buffer for streaming digests (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Number of hex characters in a digest.
pub const DIGEST_LEN: usize = 32;

/// Hashes an in-memory byte slice.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// Hashes a file by reading it sequentially in `chunk_size` pieces.
///
/// A `chunk_size` of zero is treated as [`DEFAULT_CHUNK_SIZE`].
///
/// # Errors
///
/// Returns [`HashcheckError::FileUnreadable`] if the file cannot be opened or
/// a read fails partway through.
pub fn hash_file_streaming(path: &Path, chunk_size: usize) -> Result<String> {
    let chunk_size = if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };

    let mut file = File::open(path).map_err(|e| HashcheckError::unreadable(path, e))?;
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; chunk_size];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashcheckError::unreadable(path, e)),
        };
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.digest128();
    Ok(format!("{hash:032x}"))
}

/// Hashes a file with the default chunk size.
///
/// # Errors
///
/// See [`hash_file_streaming`].
pub fn hash_file(path: &Path) -> Result<String> {
    hash_file_streaming(path, DEFAULT_CHUNK_SIZE)
}

/// Returns true if `s` has the shape of a digest produced by this module.
#[must_use]
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
