//! Whole-document HTML minification.

use minify_html::{Cfg, minify};

/// Minify an HTML document.
///
/// Inline scripts and styles are left alone: the resolvers have already
/// processed them with the project's own JS/CSS settings.
pub fn minify_html(code: &str) -> String {
    let mut cfg = Cfg::spec_compliant();
    cfg.keep_comments = false;
    cfg.minify_css = false;
    cfg.minify_js = false;

    let out = minify(code.as_bytes(), &cfg);
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
