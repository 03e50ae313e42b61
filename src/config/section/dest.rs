//! `[dest]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [dest]
//! dirname = "../dest/"                  # destination root (relative to project root)
//! host = "https://cdn.example.com/"     # prefix of emitted URLs, empty for root-relative
//! version-length = 32                   # hex characters in version tokens
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::hash::MAX_VERSION_LENGTH;
use crate::utils::path::uri::is_url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DestConfig {
    pub dirname: PathBuf,
    pub host: String,
    pub version_length: usize,
}

impl Default for DestConfig {
    fn default() -> Self {
        Self {
            dirname: "../dest/".into(),
            host: String::new(),
            version_length: 32,
        }
    }
}

impl DestConfig {
    const DIRNAME: FieldPath = FieldPath::new("dest.dirname");
    const HOST: FieldPath = FieldPath::new("dest.host");
    const VERSION_LENGTH: FieldPath = FieldPath::new("dest.version-length");

    /// Validate the `[dest]` section against the (absolute) project root.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if !(1..=MAX_VERSION_LENGTH).contains(&self.version_length) {
            diag.error_with_hint(
                Self::VERSION_LENGTH,
                format!("{} is out of range", self.version_length),
                format!("use a value between 1 and {MAX_VERSION_LENGTH}"),
            );
        }

        if root.starts_with(&self.dirname) {
            diag.error(
                Self::DIRNAME,
                format!("destination `{}` contains the project root", self.dirname.display()),
            );
        }

        let host = self.host.trim();
        if !host.is_empty() && !host.starts_with('/') && !is_url(host) {
            diag.warn(
                Self::HOST,
                format!("`{host}` is neither a URL nor root-relative, emitted URLs may not resolve"),
            );
        }
    }
}
