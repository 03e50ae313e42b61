//! HTML asset resolution.
//!
//! Rewrites the asset references of one HTML document to versioned output
//! files, emitting those files on the way.
//!
//! # Modes
//!
//! | Mode | Resolvers | Output |
//! |------|-----------|--------|
//! | [`ResolveMode::Tag`] | [`script`], then [`link`] | one CSS file per stylesheet |
//! | [`ResolveMode::Legacy`] | [`legacy`] | one CSS file per `<!--coolie-->` block |
//!
//! All resolvers share [`Addressing`] (where things go, how they are named)
//! and an [`AssetCache`] (what was already emitted during this build).

pub mod cache;
pub mod error;
pub mod legacy;
pub mod link;
pub mod resource;
pub mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub use cache::AssetCache;
pub use error::ResolveError;
use error::Result;
pub use legacy::BundleRecord;
pub use link::{CssRecord, LinkOptions};
pub use script::ScriptOptions;

use crate::minify::minify_html;
use crate::utils::hash;
use crate::utils::path::uri::{join_uri, to_absolute_file, to_root_url};

// ============================================================================
// Addressing
// ============================================================================

/// Source/destination roots and naming rules shared by every resolver.
#[derive(Debug, Clone)]
pub struct Addressing {
    /// Absolute source root; `/x` references resolve against it.
    pub src_root: PathBuf,
    /// Absolute destination root; URLs are computed relative to it.
    pub dest_root: PathBuf,
    /// Prefix for emitted URLs (`""`, `/` or `https://cdn.example.com/`).
    pub dest_host: String,
    /// Number of hex characters in a version token.
    pub version_length: usize,
}

impl Addressing {
    /// Absolute source path of a local reference found in `file`.
    #[inline]
    pub fn resolve(&self, reference: &str, file: &Path) -> PathBuf {
        to_absolute_file(reference, file, &self.src_root)
    }

    /// Host-qualified URL of a destination file.
    pub fn url_for(&self, dest_path: &Path) -> String {
        join_uri(&self.dest_host, &to_root_url(dest_path, &self.dest_root))
    }

    /// Version token of some content.
    #[inline]
    pub fn version<T: AsRef<[u8]> + ?Sized>(&self, data: &T) -> String {
        hash::version(data, self.version_length)
    }

    /// Source path shown in log lines (`/static/css/a.css`).
    pub fn display_src(&self, path: &Path) -> String {
        to_root_url(path, &self.src_root)
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// A resource file copied into the resource directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub src_path: PathBuf,
    pub dest_path: PathBuf,
    pub url: String,
}

/// An emitted stylesheet.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Sources in concatenation order.
    pub source_paths: Vec<PathBuf>,
    pub dest_path: PathBuf,
    pub dest_url: String,
    /// Resources referenced from the emitted CSS.
    pub resources: Vec<ResourceRef>,
}

// ============================================================================
// Version map
// ============================================================================

/// Versions of the built entry modules, keyed by absolute source path.
///
/// Filled by the entry build step, read-only while HTML is resolved.
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    versions: FxHashMap<PathBuf, String>,
}

impl VersionMap {
    /// Version of an entry module; a missing entry is an error.
    pub fn get(&self, path: &Path) -> Result<&str> {
        self.versions
            .get(path)
            .map(String::as_str)
            .ok_or_else(|| ResolveError::VersionLookup {
                path: path.to_path_buf(),
            })
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Entries sorted by path.
    pub fn sorted(&self) -> Vec<(&Path, &str)> {
        let mut entries: Vec<_> = self
            .versions
            .iter()
            .map(|(p, v)| (p.as_path(), v.as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(PathBuf, String)> for VersionMap {
    fn from_iter<I: IntoIterator<Item = (PathBuf, String)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Which resolver pipeline runs over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// `<script>` and `<link>` handled tag by tag.
    #[default]
    Tag,
    /// Whole-document resolver with `<!--coolie-->` bundles.
    Legacy,
}

/// Everything the resolvers need besides the document itself.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub mode: ResolveMode,
    pub addressing: Addressing,
    pub link: LinkOptions,
    pub script: ScriptOptions,
    /// Minify the whole document after resolution.
    pub minify_html: bool,
}

/// Result of resolving one HTML document.
#[derive(Debug, Clone, Default)]
pub struct ResolvedHtml {
    pub code: String,
    /// Stylesheets referenced by `<link>` tags (tag mode).
    pub css_list: Vec<CssRecord>,
    /// Bundles referenced by marker blocks (legacy mode).
    pub bundles: Vec<BundleRecord>,
    /// Root-relative URI of the bootstrap entry module (legacy mode).
    pub main_js: Option<String>,
}

/// Resolves HTML documents against one build session's cache.
///
/// Cheap to share across threads: options are read-only and the cache is
/// internally synchronized.
#[derive(Debug)]
pub struct HtmlAssetResolver {
    options: ResolverOptions,
    cache: Arc<AssetCache>,
}

impl HtmlAssetResolver {
    pub fn new(options: ResolverOptions, cache: Arc<AssetCache>) -> Self {
        Self { options, cache }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Resolve one document located at `file`.
    pub fn resolve(&self, file: &Path, code: &str) -> Result<ResolvedHtml> {
        let opts = &self.options;
        match opts.mode {
            ResolveMode::Tag => {
                let code = script::replace_scripts(file, code, &opts.addressing, &opts.script)?;
                let out =
                    link::replace_links(file, &code, &opts.addressing, &opts.link, &self.cache)?;
                let code = if opts.minify_html {
                    minify_html(&out.code)
                } else {
                    out.code
                };
                Ok(ResolvedHtml {
                    code,
                    css_list: out.css_list,
                    ..ResolvedHtml::default()
                })
            }
            ResolveMode::Legacy => {
                let out = legacy::replace_html(file, code, opts, &self.cache)?;
                Ok(ResolvedHtml {
                    code: out.code,
                    bundles: out.bundles,
                    main_js: out.main_js,
                    ..ResolvedHtml::default()
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::minify::{CssMinifyOptions, JsMinifyOptions};
    use std::fs;
    use tempfile::TempDir;

    /// Fixture project: `src/` with html, css, js and images; `dest/` empty.
    pub(crate) struct Fixture {
        pub dir: TempDir,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let fixture = Self { dir };
            fixture.write("src/static/css/a.css", "body {\n  color: red;\n}\n");
            fixture.write("src/static/css/b.css", ".b {\n  margin: 0 0 0 0;\n}\n");
            fixture.write(
                "src/static/css/bg.css",
                ".bg { background: url(../img/bg.png); }\n",
            );
            fixture.write("src/static/img/bg.png", "png-bytes");
            fixture.write("src/static/img/logo.png", "logo-bytes");
            fixture.write("src/favicon.ico", "ico-bytes");
            fixture.write("src/static/js/coolie.min.js", "var coolie = {};");
            fixture
        }

        pub fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        pub fn write(&self, relative: &str, contents: &str) {
            let path = self.path(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        pub fn addressing(&self, host: &str) -> Addressing {
            Addressing {
                src_root: self.path("src"),
                dest_root: self.path("dest"),
                dest_host: host.to_string(),
                version_length: 8,
            }
        }

        pub fn link_options(&self) -> LinkOptions {
            LinkOptions {
                css_dir: self.path("dest/static/css"),
                resource_dir: self.path("dest/static/res"),
                minify: true,
                minify_options: CssMinifyOptions::default(),
                sign: false,
            }
        }

        pub fn script_options(&self, versions: VersionMap) -> ScriptOptions {
            ScriptOptions {
                base_dir: self.path("src/static/js/app"),
                loader_config: self.path("dest/static/js/coolie-config.js"),
                versions,
                minify: true,
                minify_options: JsMinifyOptions::default(),
            }
        }

        pub fn resolver_options(&self, mode: ResolveMode, versions: VersionMap) -> ResolverOptions {
            ResolverOptions {
                mode,
                addressing: self.addressing(""),
                link: self.link_options(),
                script: self.script_options(versions),
                minify_html: false,
            }
        }

        pub fn css_files(&self) -> Vec<PathBuf> {
            self.files_in("dest/static/css")
        }

        pub fn resource_files(&self) -> Vec<PathBuf> {
            self.files_in("dest/static/res")
        }

        fn files_in(&self, relative: &str) -> Vec<PathBuf> {
            let Ok(entries) = fs::read_dir(self.path(relative)) else {
                return Vec::new();
            };
            let mut files: Vec<_> = entries.map(|e| e.unwrap().path()).collect();
            files.sort();
            files
        }
    }

    #[test]
    fn test_addressing_urls() {
        let fixture = Fixture::new();
        let local = fixture.addressing("");
        let cdn = fixture.addressing("https://cdn.example.com/");
        let dest = fixture.path("dest/static/css/abc.css");

        assert_eq!(local.url_for(&dest), "/static/css/abc.css");
        assert_eq!(cdn.url_for(&dest), "https://cdn.example.com/static/css/abc.css");
        assert_eq!(local.version("body{}").len(), 8);
        assert_eq!(
            local.resolve("/static/css/a.css", &fixture.path("src/html/x.html")),
            fixture.path("src/static/css/a.css")
        );
    }

    #[test]
    fn test_version_map_lookup() {
        let versions: VersionMap = [(PathBuf::from("/p/app/index.js"), "abc".to_string())]
            .into_iter()
            .collect();
        assert_eq!(versions.get(Path::new("/p/app/index.js")).unwrap(), "abc");
        let err = versions.get(Path::new("/p/app/missing.js")).unwrap_err();
        assert!(matches!(err, ResolveError::VersionLookup { .. }));
    }

    #[test]
    fn test_resolver_dedups_across_documents() {
        let fixture = Fixture::new();
        let resolver = HtmlAssetResolver::new(
            fixture.resolver_options(ResolveMode::Tag, VersionMap::default()),
            Arc::new(AssetCache::new()),
        );
        let html = r#"<link rel="stylesheet" href="/static/css/a.css">"#;

        let first = resolver.resolve(&fixture.path("src/html/one.html"), html).unwrap();
        let second = resolver
            .resolve(
                &fixture.path("src/html/two.html"),
                r#"<link href="../static/css/a.css" rel="stylesheet">"#,
            )
            .unwrap();

        assert_eq!(fixture.css_files().len(), 1);
        assert_eq!(first.css_list[0].dest_path, second.css_list[0].dest_path);
        assert_eq!(resolver.cache().styles.len(), 1);
    }

    #[test]
    fn test_resolver_is_deterministic() {
        let html = r#"<head><link rel="stylesheet" href="/static/css/bg.css"></head>"#;
        let run = || {
            let fixture = Fixture::new();
            let resolver = HtmlAssetResolver::new(
                fixture.resolver_options(ResolveMode::Tag, VersionMap::default()),
                Arc::new(AssetCache::new()),
            );
            let out = resolver.resolve(&fixture.path("src/index.html"), html).unwrap();
            let names: Vec<_> = fixture
                .css_files()
                .iter()
                .map(|p| p.file_name().unwrap().to_owned())
                .collect();
            (out.code, names)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_resolver_missing_version_writes_nothing() {
        let fixture = Fixture::new();
        let resolver = HtmlAssetResolver::new(
            fixture.resolver_options(ResolveMode::Tag, VersionMap::default()),
            Arc::new(AssetCache::new()),
        );
        let html = concat!(
            r#"<link rel="stylesheet" href="/static/css/a.css">"#,
            r#"<script coolie src="/static/js/coolie.min.js" data-config="c.js" data-main="nope.js"></script>"#,
        );

        let err = resolver.resolve(&fixture.path("src/index.html"), html).unwrap_err();
        assert!(matches!(err, ResolveError::VersionLookup { .. }));
        assert!(fixture.css_files().is_empty());
        assert!(fixture.resource_files().is_empty());
        assert!(resolver.cache().styles.is_empty());
    }

    #[test]
    fn test_resolver_legacy_missing_version_writes_nothing() {
        let fixture = Fixture::new();
        let resolver = HtmlAssetResolver::new(
            fixture.resolver_options(ResolveMode::Legacy, VersionMap::default()),
            Arc::new(AssetCache::new()),
        );
        let html = concat!(
            r#"<script coolie src="/static/js/coolie.min.js" data-config="c.js" data-main="nope.js"></script>"#,
            r#"<!--coolie--><link href="/static/css/a.css"><!--/coolie-->"#,
        );

        let err = resolver.resolve(&fixture.path("src/index.html"), html).unwrap_err();
        assert!(matches!(err, ResolveError::VersionLookup { .. }));
        assert!(fixture.css_files().is_empty());
        assert!(fixture.resource_files().is_empty());
        assert!(resolver.cache().resources.is_empty());
    }

    #[test]
    fn test_resolver_legacy_mode() {
        let fixture = Fixture::new();
        let resolver = HtmlAssetResolver::new(
            fixture.resolver_options(ResolveMode::Legacy, VersionMap::default()),
            Arc::new(AssetCache::new()),
        );
        let html = r#"<!--coolie--><link href="/static/css/a.css"><!--/coolie-->"#;

        let out = resolver.resolve(&fixture.path("src/index.html"), html).unwrap();
        assert_eq!(out.bundles.len(), 1);
        assert!(out.css_list.is_empty());
        assert!(out.code.starts_with(r#"<link rel="stylesheet" href="/static/css/"#));
    }
}
