//! Whole-document resolver with marker bundles.
//!
//! Older pages group their stylesheets between `<!--coolie-->` and
//! `<!--/coolie-->`. Each group becomes one concatenated stylesheet, shared by
//! every document that lists the same files in the same order. On top of that
//! this resolver versions favicons, images and the loader script itself.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::cache::AssetCache;
use super::error::Result;
use super::link::{emit, render_stylesheet};
use super::resource::replace_tag_resource;
use super::script::{LOADER, SCRIPT, rewrite_loader};
use super::{Artifact, ResolveError, ResolverOptions};
use crate::html::{TagPattern, attr};
use crate::minify::minify_html;
use crate::utils::hash::etag;
use crate::utils::path::uri::{RefKind, to_root_url};
use crate::{debug, log};

/// `rel` values whose `href` is copied as a resource.
const FAVICON_RELS: [&str; 7] = [
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "apple-touch-startup-image",
    "icon",
    "shortcut icon",
    "og:image",
    "msapplication-TileImage",
];

static BUNDLE: LazyLock<TagPattern> = LazyLock::new(|| TagPattern::block("coolie"));
static LINK: LazyLock<TagPattern> = LazyLock::new(|| TagPattern::void("link"));
static IMG: LazyLock<TagPattern> = LazyLock::new(|| TagPattern::void("img"));

/// One marker block of a document.
#[derive(Debug, Clone)]
pub struct BundleRecord {
    /// File name of the bundle (`<version>.css`).
    pub name: String,
    pub url: String,
    pub dest_path: PathBuf,
    /// Concatenated sources, in order.
    pub files: Vec<PathBuf>,
    /// An earlier block (in any document) produced this bundle.
    pub is_repeat: bool,
}

impl BundleRecord {
    fn new(artifact: &Artifact, is_repeat: bool) -> Self {
        let name = artifact
            .dest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            url: artifact.dest_url.clone(),
            dest_path: artifact.dest_path.clone(),
            files: artifact.source_paths.clone(),
            is_repeat,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LegacyOutput {
    pub code: String,
    pub bundles: Vec<BundleRecord>,
    /// Root-relative URI of the entry module named by the bootstrap tag.
    pub main_js: Option<String>,
}

/// Resolve one document in legacy mode.
pub fn replace_html(
    file: &Path,
    code: &str,
    options: &ResolverOptions,
    cache: &AssetCache,
) -> Result<LegacyOutput> {
    let addressing = &options.addressing;
    let resource_dir = options.link.resource_dir.as_path();
    let mut main_js = None;

    // Bootstrap script
    let code = SCRIPT.try_replace(code, |tag| {
        if !attr::has(tag.open, LOADER) {
            return Ok(tag.source.to_string());
        }

        let main = attr::get(tag.open, "data-main");
        let main = main.as_ref().and_then(|v| v.non_empty());
        let has_config = attr::get(tag.open, "data-config")
            .as_ref()
            .and_then(|v| v.non_empty())
            .is_some();
        if main.is_none() {
            log!("warning"; "{}: loader script `data-main` is empty", file.display());
        }
        if !has_config {
            log!("warning"; "{}: loader script `data-config` is empty", file.display());
        }

        let main = main.filter(|_| has_config);
        if let Some(main) = main {
            // fail before the loader script is copied
            let main_path = path_clean::clean(options.script.base_dir.join(main));
            options.script.versions.get(&main_path)?;
            main_js = Some(to_root_url(&main_path, &addressing.src_root));
        }

        let source = replace_tag_resource(file, tag.source, "src", resource_dir, addressing, cache)?;
        match main {
            Some(main) => rewrite_loader(&source, main, addressing, &options.script),
            None => Ok(source),
        }
    })?;

    // Marker bundles
    let mut bundles = Vec::new();
    let code = BUNDLE.try_replace::<ResolveError>(&code, |tag| {
        let body = tag.body.unwrap_or_default();
        let mut kept = String::new();
        let mut files = Vec::new();

        for link in LINK.find_all(body) {
            let href = attr::get(link.source, "href");
            let Some(href) = href.as_ref().and_then(|v| v.non_empty()) else {
                continue;
            };
            if RefKind::parse(href).is_local() {
                files.push(addressing.resolve(href, file));
            } else {
                kept.push_str(link.source);
            }
        }

        if files.is_empty() {
            return Ok(tag.source.to_string());
        }

        let lookup = cache.bundles.get_or_try_insert(files.clone(), || {
            let etags: String = files.iter().map(|f| etag(f)).collect();
            let digest = addressing.version(&etags);

            let mut code = String::new();
            let mut resources = Vec::new();
            for src in &files {
                let (css, refs) = render_stylesheet(src, addressing, &options.link, cache)?;
                if !code.is_empty() {
                    code.push('\n');
                }
                code.push_str(&css);
                resources.extend(refs);
            }

            emit(files.clone(), code, digest, resources, addressing, &options.link)
        })?;

        if lookup.fresh {
            debug!("bundle"; "√ {}", lookup.value.dest_url);
        }
        let record = BundleRecord::new(&lookup.value, !lookup.fresh);
        let replacement = format!(r#"{kept}<link rel="stylesheet" href="{}"/>"#, record.url);
        bundles.push(record);
        Ok(replacement)
    })?;

    // Favicons
    let code = LINK.try_replace(&code, |tag| {
        let is_favicon = attr::get(tag.source, "rel")
            .as_ref()
            .and_then(|rel| rel.as_str())
            .is_some_and(|rel| FAVICON_RELS.contains(&rel.trim()));
        if is_favicon {
            replace_tag_resource(file, tag.source, "href", resource_dir, addressing, cache)
        } else {
            Ok(tag.source.to_string())
        }
    })?;

    // Images
    let code = IMG.try_replace(&code, |tag| {
        replace_tag_resource(file, tag.source, "src", resource_dir, addressing, cache)
    })?;

    let code = if options.minify_html {
        minify_html(&code)
    } else {
        code
    };

    Ok(LegacyOutput {
        code,
        bundles,
        main_js,
    })
}
