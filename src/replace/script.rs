//! `<script>` resolver.
//!
//! Three kinds of script tags are handled:
//! - the loader bootstrap (`<script coolie data-main=".." data-config="..">`),
//!   whose entry module and loader config are pointed at the built files
//! - inline scripts of a JavaScript type, minified when enabled
//! - everything else, left as is

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::error::Result;
use super::link::IGNORE;
use super::{Addressing, ResolveError, VersionMap};
use crate::html::{TagPattern, attr};
use crate::minify::{JsMinifyOptions, minify_js};
use crate::utils::path::uri::{is_url, join_uri, replace_version, to_root_url};

/// Marker attribute of the loader bootstrap tag.
pub const LOADER: &str = "coolie";

/// `type` values treated as JavaScript.
const JS_TYPES: [&str; 7] = [
    "javascript",
    "text/javascript",
    "text/ecmascript",
    "text/ecmascript-6",
    "text/jsx",
    "application/javascript",
    "application/ecmascript",
];

pub(crate) static SCRIPT: LazyLock<TagPattern> = LazyLock::new(|| TagPattern::paired("script"));

// Minified output ending in `}}</script>` is ambiguous for some template engines
static AMBIGUOUS_TAIL: LazyLock<Regex> = LazyLock::new(|| regex(r"\}\};?</script>$"));
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| regex(r"[\n\r]"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+"));

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid script pattern: {e}"))
}

/// Script settings.
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Directory `data-main` is relative to.
    pub base_dir: PathBuf,
    /// Destination path of the generated loader config.
    pub loader_config: PathBuf,
    /// Entry module versions from the entry build step.
    pub versions: VersionMap,
    pub minify: bool,
    pub minify_options: JsMinifyOptions,
}

/// Rewrite the script tags of one document.
pub fn replace_scripts(
    file: &Path,
    code: &str,
    addressing: &Addressing,
    options: &ScriptOptions,
) -> Result<String> {
    SCRIPT.try_replace(code, |tag| {
        if attr::has(tag.source, IGNORE) {
            return Ok(attr::remove(tag.source, IGNORE));
        }

        if attr::has(tag.open, LOADER) {
            let main = required(file, tag.source, "data-main")?;
            required(file, tag.source, "data-config")?;
            return rewrite_loader(tag.source, &main, addressing, options);
        }

        if attr::has(tag.open, "src") {
            return Ok(tag.source.to_string());
        }

        let body = tag.body.unwrap_or_default();
        let body = if options.minify && is_javascript(tag.open) {
            minify_js(file, body, &options.minify_options)?
        } else {
            body.to_string()
        };

        let script = format!("{}{body}</script>", tag.open);
        Ok(AMBIGUOUS_TAIL.replace(&script, "}/**/}</script>").into_owned())
    })
}

/// Point a bootstrap tag at the versioned entry module and the built loader
/// config, then drop the marker and fold the tag onto one line.
///
/// `main` is the tag's `data-main` value.
pub(crate) fn rewrite_loader(
    source: &str,
    main: &str,
    addressing: &Addressing,
    options: &ScriptOptions,
) -> Result<String> {
    let main_path = path_clean::clean(options.base_dir.join(main));
    let version = options.versions.get(&main_path)?;

    let source = attr::set(source, "data-main", &replace_version(main, version));
    let source = attr::set(&source, "data-config", &loader_config_uri(addressing, options));
    let source = attr::remove(&source, LOADER);

    let source = LINE_BREAKS.replace_all(&source, "");
    Ok(SPACES.replace_all(&source, " ").into_owned())
}

/// URI of the built loader config as the loader expects it.
///
/// With a full host URL the config is fetched from the host; otherwise the
/// `~` prefix tells the loader to resolve it against the current origin.
fn loader_config_uri(addressing: &Addressing, options: &ScriptOptions) -> String {
    let uri = to_root_url(&options.loader_config, &addressing.dest_root);
    if is_url(&addressing.dest_host) {
        join_uri(&addressing.dest_host, &uri)
    } else {
        format!("~{uri}")
    }
}

/// A required bootstrap attribute with a non-empty value.
fn required(file: &Path, tag: &str, name: &'static str) -> Result<String> {
    attr::get(tag, name)
        .as_ref()
        .and_then(|v| v.non_empty())
        .map(str::to_string)
        .ok_or_else(|| ResolveError::Configuration {
            file: file.to_path_buf(),
            tag: tag.to_string(),
            attr: name,
        })
}

/// A missing or blank `type` means JavaScript.
fn is_javascript(open: &str) -> bool {
    let value = attr::get(open, "type");
    match value.as_ref().and_then(|v| v.non_empty().map(str::trim)) {
        None => true,
        Some(t) => JS_TYPES.contains(&t),
    }
}
