//! CSS minification with lightningcss.
//!
//! Besides printing minified CSS, the adapter can rewrite every local
//! `url(...)` to the versioned copy of the resource it points at. Relative
//! URLs resolve against the stylesheet's own directory, root-relative ones
//! against the source root.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::values::url::Url;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};

use super::CssMinifyOptions;
use crate::replace::cache::AssetCache;
use crate::replace::resource::copy_resource;
use crate::replace::{Addressing, ResolveError, ResourceRef, error::Result};
use crate::utils::path::uri::{RefKind, strip_query_fragment};

/// Input of the CSS adapter.
#[derive(Debug, Clone, Copy)]
pub struct CssInput<'a> {
    pub code: &'a str,
    pub options: &'a CssMinifyOptions,
    pub addressing: &'a Addressing,
    /// Where referenced resources are copied.
    pub resource_dir: &'a Path,
    /// Rewrite `url(...)` references to versioned resource URLs.
    pub rewrite_resources: bool,
}

/// Output of the CSS adapter.
#[derive(Debug, Clone, Default)]
pub struct CssOutput {
    pub code: String,
    /// Resources referenced by the stylesheet, in order of appearance.
    pub resources: Vec<ResourceRef>,
}

/// Minify one stylesheet located at `path`.
pub fn minify_css(path: &Path, input: CssInput<'_>, cache: &AssetCache) -> Result<CssOutput> {
    let parser_options = ParserOptions {
        filename: path.display().to_string(),
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(input.code, parser_options)
        .map_err(|e| ResolveError::minify(path, e.to_string()))?;

    let mut resources = Vec::new();
    if input.rewrite_resources {
        let mut rewriter = UrlRewriter {
            css_file: path,
            input: &input,
            cache,
            resources: &mut resources,
        };
        stylesheet.visit(&mut rewriter)?;
    }

    if input.options.merge_rules {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| ResolveError::minify(path, e.to_string()))?;
    }

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| ResolveError::minify(path, e.to_string()))?;

    Ok(CssOutput {
        code: printed.code,
        resources,
    })
}

struct UrlRewriter<'a> {
    css_file: &'a Path,
    input: &'a CssInput<'a>,
    cache: &'a AssetCache,
    resources: &'a mut Vec<ResourceRef>,
}

impl<'i> Visitor<'i> for UrlRewriter<'_> {
    type Error = ResolveError;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS)
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> Result<(), Self::Error> {
        let raw = url.url.to_string();
        if !RefKind::parse(&raw).is_local() || strip_query_fragment(&raw).is_empty() {
            return Ok(());
        }

        let addressing = self.input.addressing;
        let source = addressing.resolve(&raw, self.css_file);
        let resource = copy_resource(&source, self.input.resource_dir, addressing, self.cache)?;

        let fragment = raw.find('#').map_or("", |i| &raw[i..]);
        url.url = format!("{}{fragment}", resource.url).into();
        self.resources.push(ResourceRef::clone(&resource));
        Ok(())
    }
}
