//! `<link rel="stylesheet">` resolver.
//!
//! Every local stylesheet becomes `<css dir>/<version>.css`, where the version
//! is derived from the minified contents. The same source path always maps to
//! the same artifact within a build, however many documents reference it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use super::cache::AssetCache;
use super::error::{Result, read_source, write_output};
use super::{Addressing, Artifact, ResolveError, ResourceRef};
use crate::debug;
use crate::html::{TagPattern, attr};
use crate::minify::{CssInput, CssMinifyOptions, minify_css};
use crate::utils::path::uri::RefKind;

/// Marker attribute that leaves a tag untouched.
pub const IGNORE: &str = "coolieignore";

static LINK: LazyLock<TagPattern> = LazyLock::new(|| TagPattern::void("link"));

/// Stylesheet settings shared by the tag and legacy resolvers.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Directory receiving the emitted `.css` files.
    pub css_dir: PathBuf,
    /// Directory receiving resources referenced from CSS.
    pub resource_dir: PathBuf,
    pub minify: bool,
    pub minify_options: CssMinifyOptions,
    /// Prepend a banner comment to emitted files.
    pub sign: bool,
}

/// One source file of an emitted stylesheet.
#[derive(Debug, Clone)]
pub struct CssDependency {
    pub src_path: PathBuf,
    pub resources: Vec<ResourceRef>,
}

/// One stylesheet reference found in a document.
#[derive(Debug, Clone)]
pub struct CssRecord {
    pub dest_path: PathBuf,
    pub dependencies: Vec<CssDependency>,
}

#[derive(Debug, Clone, Default)]
pub struct LinkOutput {
    pub code: String,
    /// One record per processed `<link>`, repeats included.
    pub css_list: Vec<CssRecord>,
}

/// Rewrite the stylesheet links of one document.
pub fn replace_links(
    file: &Path,
    code: &str,
    addressing: &Addressing,
    options: &LinkOptions,
    cache: &AssetCache,
) -> Result<LinkOutput> {
    let mut css_list = Vec::new();

    let code = LINK.try_replace::<ResolveError>(code, |tag| {
        let source = tag.source;
        if attr::has(source, IGNORE) {
            return Ok(attr::remove(source, IGNORE));
        }

        let is_stylesheet = attr::get(source, "rel")
            .as_ref()
            .and_then(|rel| rel.non_empty())
            .is_none_or(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"));
        if !is_stylesheet {
            return Ok(source.to_string());
        }

        let href = attr::get(source, "href");
        let Some(href) = href.as_ref().and_then(|v| v.non_empty()) else {
            return Ok(source.to_string());
        };
        if !RefKind::parse(href).is_local() {
            return Ok(source.to_string());
        }

        let src_path = addressing.resolve(href, file);
        let artifact = stylesheet(&src_path, addressing, options, cache)?;

        css_list.push(CssRecord {
            dest_path: artifact.dest_path.clone(),
            dependencies: vec![CssDependency {
                src_path,
                resources: artifact.resources.clone(),
            }],
        });
        Ok(attr::set(source, "href", &artifact.dest_url))
    })?;

    Ok(LinkOutput { code, css_list })
}

/// Emit (or reuse) the artifact of a single stylesheet.
fn stylesheet(
    src_path: &Path,
    addressing: &Addressing,
    options: &LinkOptions,
    cache: &AssetCache,
) -> Result<Arc<Artifact>> {
    let lookup = cache.styles.get_or_try_insert(src_path.to_path_buf(), || {
        let (code, resources) = render_stylesheet(src_path, addressing, options, cache)?;
        let digest = addressing.version(&code);
        emit(vec![src_path.to_path_buf()], code, digest, resources, addressing, options)
    })?;

    if lookup.fresh {
        debug!("css"; "√ {}", addressing.display_src(src_path));
    }
    Ok(lookup.value)
}

/// Read one stylesheet and minify it when enabled.
///
/// Resource rewriting happens as part of minification, so unminified output
/// keeps its original `url(...)` references.
pub(crate) fn render_stylesheet(
    src_path: &Path,
    addressing: &Addressing,
    options: &LinkOptions,
    cache: &AssetCache,
) -> Result<(String, Vec<ResourceRef>)> {
    let source = read_source(src_path)?;
    if !options.minify {
        return Ok((source, Vec::new()));
    }

    let input = CssInput {
        code: &source,
        options: &options.minify_options,
        addressing,
        resource_dir: &options.resource_dir,
        rewrite_resources: true,
    };
    let out = minify_css(src_path, input, cache)?;
    Ok((out.code, out.resources))
}

/// Write a stylesheet named after `digest` and describe it.
///
/// The digest is taken before signing, so the banner never changes names.
pub(crate) fn emit(
    source_paths: Vec<PathBuf>,
    code: String,
    digest: String,
    resources: Vec<ResourceRef>,
    addressing: &Addressing,
    options: &LinkOptions,
) -> Result<Artifact> {
    let dest_path = options.css_dir.join(format!("{digest}.css"));
    let dest_url = addressing.url_for(&dest_path);

    let contents = if options.sign { sign(&code) } else { code };
    write_output(&dest_path, contents)?;

    Ok(Artifact {
        source_paths,
        dest_path,
        dest_url,
        resources,
    })
}

/// Prepend the build banner.
pub(crate) fn sign(code: &str) -> String {
    format!("/*! coolie {} */\n{code}", env!("CARGO_PKG_VERSION"))
}
