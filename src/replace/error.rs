//! Resolver error types.
//!
//! Every variant aborts the build by default; the orchestrator decides how to
//! report it. References to other origins are not errors and never get here.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A marked tag is missing a required attribute.
    #[error("`{attr}` is empty in `{}`: {tag}", file.display())]
    Configuration {
        file: PathBuf,
        tag: String,
        attr: &'static str,
    },

    /// A referenced source file can not be read.
    #[error("can not read `{}`", path.display())]
    Resolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The entry build step did not register a version for this module.
    #[error("can not find `data-main` version for `{}`", path.display())]
    VersionLookup { path: PathBuf },

    /// A destination file could not be written.
    #[error("can not write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A minifier rejected its input.
    #[error("can not minify `{}`: {message}", path.display())]
    Minify { path: PathBuf, message: String },
}

impl ResolveError {
    pub fn read(path: &Path, source: io::Error) -> Self {
        Self::Resolution {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn minify(path: &Path, message: impl Into<String>) -> Self {
        Self::Minify {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Read a source file as UTF-8.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ResolveError::read(path, e))
}

/// Write a destination file, creating parent directories.
pub(crate) fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ResolveError::write(path, e))?;
    }
    std::fs::write(path, contents).map_err(|e| ResolveError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = ResolveError::Configuration {
            file: PathBuf::from("html/index.html"),
            tag: "<script coolie>".into(),
            attr: "data-main",
        };
        let display = err.to_string();
        assert!(display.contains("data-main"));
        assert!(display.contains("html/index.html"));

        let err = ResolveError::read(Path::new("a.css"), io::Error::new(ErrorKind::NotFound, "x"));
        assert!(err.to_string().contains("a.css"));
        assert!(matches!(err, ResolveError::Resolution { ref path, .. } if path == Path::new("a.css")));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.css")).unwrap_err();
        assert!(matches!(err, ResolveError::Resolution { .. }));
    }
}
