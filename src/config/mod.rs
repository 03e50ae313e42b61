//! Project configuration management for `coolie.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── js         # [js]
//! │   ├── html       # [html]
//! │   ├── css        # [css], [resource]
//! │   └── dest       # [dest]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `copy`       | Globs copied verbatim into the destination       |
//! | `[js]`       | Entry modules, loader config, JS minification    |
//! | `[html]`     | Documents to resolve and the resolver mode       |
//! | `[css]`      | Emitted stylesheets                              |
//! | `[resource]` | Images and fonts referenced from CSS/HTML        |
//! | `[dest]`     | Destination root, URL host, version length       |
//!
//! The project root is the directory containing `coolie.toml`. Every
//! relative path in the file resolves against it, except `css.dest` and
//! `resource.dest`, which live inside the destination root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{CssConfig, DestConfig, HtmlConfig, JsConfig, ResourceConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, ResolveArgs},
    log,
    replace::ResolveMode,
    utils::path::{absolutize, mirror},
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing coolie.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Remove the destination before building (CLI only)
    #[serde(skip)]
    pub clean: bool,

    /// Globs copied as-is, relative to the project root
    pub copy: Vec<String>,

    pub js: JsConfig,
    pub html: HtmlConfig,
    pub css: CssConfig,
    pub resource: ResourceConfig,
    pub dest: DestConfig,
}

impl ProjectConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let Some(config_path) = find_config_file(&cli.config, &cwd) else {
            bail!(ConfigError::NotFound(cwd.join(&cli.config)));
        };

        let mut config = Self::from_path(&config_path)?;
        config.finalize(&absolutize(&config_path, &cwd));
        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Set the config path and resolve every path against the project root.
    pub fn finalize(&mut self, config_path: &Path) {
        self.config_path = path_clean::clean(config_path);
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let root = self.root.clone();
        self.dest.dirname = absolutize(&self.dest.dirname, &root);
        self.js.normalize(&root);
    }

    // ========================================================================
    // derived paths
    // ========================================================================

    /// Source root (the project root).
    pub fn src_root(&self) -> &Path {
        &self.root
    }

    /// Destination root.
    pub fn dest_root(&self) -> &Path {
        &self.dest.dirname
    }

    /// Directory receiving emitted stylesheets.
    pub fn css_dir(&self) -> PathBuf {
        absolutize(&self.css.dest, self.dest_root())
    }

    /// Directory receiving copied resources.
    pub fn resource_dir(&self) -> PathBuf {
        absolutize(&self.resource.dest, self.dest_root())
    }

    /// Destination of the generated loader config.
    pub fn loader_config_dest(&self) -> Option<PathBuf> {
        self.js
            .coolie_config
            .as_deref()
            .map(|src| mirror(src, self.src_root(), self.dest_root()))
    }

    /// Make a source path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Build { build_args } = &cli.command {
            self.clean = build_args.clean;
        }
        self.apply_resolve_args(cli.resolve_args());
    }

    /// Apply resolver arguments from CLI.
    pub fn apply_resolve_args(&mut self, args: &ResolveArgs) {
        crate::logger::set_verbose(args.verbose);

        if let Some(minify) = args.minify {
            self.js.minify = minify;
            self.css.minify = minify;
            self.html.minify = minify;
        }
        if args.legacy {
            self.html.mode = ResolveMode::Legacy;
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the normalized configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.js.validate(&mut diag);
        self.html.validate(&mut diag);
        self.dest.validate(&self.root, &mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
copy = ["./static/img/**/*"]

[js]
main = ["./static/js/app/**/*.js"]
coolie-config = "./static/js/coolie-config.js"

[html]
src = ["./html/**/*.html"]

[css]
dest = "./static/css/"

[dest]
dirname = "../dest/"
host = ""
version-length = 8
"#;

    #[test]
    fn test_parse_invalid_toml() {
        assert!(ProjectConfig::parse_with_ignored("[js\nmain = []").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (config, ignored) =
            ProjectConfig::parse_with_ignored("copy = []\n[unknown_section]\nfield = 1").unwrap();
        assert!(config.copy.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_finalize_paths() {
        let mut config = test_parse_config(SAMPLE);
        config.finalize(Path::new("/site/src/coolie.toml"));

        assert_eq!(config.src_root(), Path::new("/site/src"));
        assert_eq!(config.dest_root(), Path::new("/site/dest"));
        assert_eq!(config.css_dir(), PathBuf::from("/site/dest/static/css"));
        assert_eq!(config.resource_dir(), PathBuf::from("/site/dest/static/res"));
        assert_eq!(
            config.loader_config_dest(),
            Some(PathBuf::from("/site/dest/static/js/coolie-config.js"))
        );
        assert_eq!(
            config.root_relative("/site/src/html/index.html"),
            PathBuf::from("html/index.html")
        );
    }

    #[test]
    fn test_apply_resolve_args() {
        let mut config = test_parse_config(SAMPLE);
        config.apply_resolve_args(&ResolveArgs {
            minify: Some(false),
            legacy: true,
            verbose: false,
        });
        assert!(!config.js.minify && !config.css.minify && !config.html.minify);
        assert_eq!(config.html.mode, ResolveMode::Legacy);
    }

    #[test]
    fn test_validate_sample_project() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("static/js")).unwrap();
        fs::write(src.join("static/js/coolie-config.js"), "").unwrap();
        fs::write(src.join("coolie.toml"), SAMPLE).unwrap();

        let mut config = ProjectConfig::from_path(&src.join("coolie.toml")).unwrap();
        config.finalize(&src.join("coolie.toml"));
        assert!(config.validate().is_ok());

        config.dest.version_length = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dest.version-length"));
    }
}
