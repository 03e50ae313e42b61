//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`uri`]: build-root URLs, host joining, version stamping

pub mod uri;

use std::path::{Path, PathBuf};

/// Resolve `path` against `base` into a lexically clean absolute path.
///
/// Absolute paths are only cleaned; relative ones join `base` first.
/// Symlinks are not resolved, so paths derived from the same root
/// always compare equal.
///
/// # Example
/// ```ignore
/// let dest = absolutize(Path::new("../dest/"), Path::new("/site/src"));
/// assert_eq!(dest, PathBuf::from("/site/dest"));
/// ```
#[inline]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path_clean::clean(path)
    } else {
        path_clean::clean(base.join(path))
    }
}

/// Mirror a path from `from_root` into `to_root`, keeping its relative part.
///
/// Paths outside `from_root` keep only their file name.
pub fn mirror(path: &Path, from_root: &Path, to_root: &Path) -> PathBuf {
    match path.strip_prefix(from_root) {
        Ok(rel) => to_root.join(rel),
        Err(_) => to_root.join(path.file_name().unwrap_or_default()),
    }
}
