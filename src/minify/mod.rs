//! Minifier adapters.
//!
//! Pure transforms with a fixed contract: code in, minified code out. The CSS
//! adapter also rewrites `url(...)` references to versioned resources and
//! reports which ones it touched.
//!
//! - [`css`]: lightningcss
//! - [`js`]: oxc
//! - [`html`]: minify-html

pub mod css;
pub mod html;
pub mod js;

use serde::{Deserialize, Serialize};

pub use css::{CssInput, minify_css};
pub use html::minify_html;
pub use js::minify_js;

/// Options passed through to the CSS minifier (`[css.minify-options]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CssMinifyOptions {
    /// Merge and deduplicate rules, not only strip whitespace.
    pub merge_rules: bool,
}

impl Default for CssMinifyOptions {
    fn default() -> Self {
        Self { merge_rules: true }
    }
}

/// Options passed through to the JS minifier (`[js.minify-options]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct JsMinifyOptions {
    /// Shorten local identifiers.
    pub mangle: bool,
    /// Apply compressing transforms (dead code, constant folding).
    pub compress: bool,
}

impl Default for JsMinifyOptions {
    fn default() -> Self {
        Self {
            mangle: true,
            compress: true,
        }
    }
}
