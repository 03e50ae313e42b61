//! `[html]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [html]
//! src = ["./html/**/*.html"]   # documents to resolve (globs)
//! minify = true                # minify whole documents
//! mode = "tag"                 # tag | legacy
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::replace::ResolveMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// HTML globs, relative to the project root.
    pub src: Vec<String>,
    pub minify: bool,
    /// Resolver pipeline.
    pub mode: ResolveMode,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            src: Vec::new(),
            minify: true,
            mode: ResolveMode::Tag,
        }
    }
}

impl HtmlConfig {
    const SRC: FieldPath = FieldPath::new("html.src");

    /// Validate the `[html]` section.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.src.is_empty() {
            diag.error_with_hint(
                Self::SRC,
                "no HTML files configured",
                r#"add globs such as `src = ["./html/**/*.html"]`"#,
            );
        }
        if self.src.iter().any(|s| Path::new(s).is_absolute()) {
            diag.error(Self::SRC, "HTML globs must be relative to the project root");
        }
    }
}
