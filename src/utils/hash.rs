//! Content addressing using blake3.
//!
//! Version tokens are the leading hex characters of a blake3 digest, so the
//! same content always produces the same token across runs and machines.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let token = hash::version("body{color:red}", 8); // -> "3f2a9c1e"
//! let tag = hash::etag(Path::new("static/css/a.css")); // modification signature
//! ```

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Longest token a blake3 hex digest can provide.
pub const MAX_VERSION_LENGTH: usize = 64;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a byte slice.
    #[inline]
    pub fn of<T: AsRef<[u8]> + ?Sized>(data: &T) -> Self {
        Self(*blake3::hash(data.as_ref()).as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Truncated hex token, clamped to `1..=64` characters.
    pub fn token(self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.clamp(1, MAX_VERSION_LENGTH));
        hex
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Version token of some content.
#[inline]
pub fn version<T: AsRef<[u8]> + ?Sized>(data: &T, len: usize) -> String {
    ContentHash::of(data).token(len)
}

/// Modification signature of a file: path, size and mtime.
///
/// Missing files still get a stable tag derived from the path alone.
pub fn etag(path: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.to_string_lossy().as_bytes());

    if let Ok(meta) = fs::metadata(path) {
        hasher.update(&meta.len().to_le_bytes());
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        hasher.update(&mtime.to_le_bytes());
    }

    hex::encode(hasher.finalize().as_bytes())
}
