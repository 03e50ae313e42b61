//! `[js]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [js]
//! main = ["./static/js/app/**/*.js"]            # entry modules (globs)
//! coolie-config = "./static/js/coolie-config.js" # loader config
//! base = "./static/js/app/"                     # `data-main` base directory
//! minify = true
//!
//! [js.minify-options]
//! mangle = true
//! compress = true
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::minify::JsMinifyOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct JsConfig {
    /// Entry module globs, relative to the project root.
    pub main: Vec<String>,
    /// Loader configuration file.
    pub coolie_config: Option<PathBuf>,
    /// Directory `data-main` is relative to.
    /// Defaults to the directory of `coolie-config`.
    pub base: Option<PathBuf>,
    /// Minify entry modules and inline scripts.
    pub minify: bool,
    pub minify_options: JsMinifyOptions,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            main: Vec::new(),
            coolie_config: None,
            base: None,
            minify: true,
            minify_options: JsMinifyOptions::default(),
        }
    }
}

impl JsConfig {
    const MAIN: FieldPath = FieldPath::new("js.main");
    const COOLIE_CONFIG: FieldPath = FieldPath::new("js.coolie-config");
    const BASE: FieldPath = FieldPath::new("js.base");

    /// Resolve paths against the project root.
    pub fn normalize(&mut self, root: &Path) {
        let absolutize = |p: &PathBuf| crate::utils::path::absolutize(p, root);
        self.coolie_config = self.coolie_config.as_ref().map(absolutize);
        self.base = self.base.as_ref().map(absolutize);
    }

    /// Base directory of `data-main`, once paths are normalized.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.base.clone().or_else(|| {
            self.coolie_config
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
    }

    /// Validate the `[js]` section.
    ///
    /// # Checks
    /// - entry modules need a loader config to be referenced from HTML
    /// - configured files and directories must exist
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match &self.coolie_config {
            None if !self.main.is_empty() => diag.error_with_hint(
                Self::COOLIE_CONFIG,
                format!("{} is set but {} is not configured", Self::MAIN, Self::COOLIE_CONFIG),
                "point it at the loader configuration file",
            ),
            Some(path) if !path.is_file() => diag.error(
                Self::COOLIE_CONFIG,
                format!("file not found: {}", path.display()),
            ),
            _ => {}
        }

        if let Some(base) = &self.base
            && !base.is_dir()
        {
            diag.error(Self::BASE, format!("directory not found: {}", base.display()));
        }

        if self.main.iter().any(|m| Path::new(m).is_absolute()) {
            diag.error(Self::MAIN, "entry globs must be relative to the project root");
        }
    }
}
