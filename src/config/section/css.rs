//! `[css]` and `[resource]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [css]
//! dest = "./static/css/"       # emitted stylesheets, inside the destination
//! minify = true
//! sign = false                 # prepend a banner comment
//!
//! [css.minify-options]
//! merge-rules = true
//!
//! [resource]
//! dest = "./static/res/"       # images and fonts referenced by CSS/HTML
//! ```

use crate::minify::CssMinifyOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CssConfig {
    /// Output directory, relative to the destination root.
    pub dest: PathBuf,
    pub minify: bool,
    pub sign: bool,
    pub minify_options: CssMinifyOptions,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            dest: "./static/css/".into(),
            minify: true,
            sign: false,
            minify_options: CssMinifyOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Output directory, relative to the destination root.
    pub dest: PathBuf,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            dest: "./static/res/".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.css.dest, PathBuf::from("./static/css/"));
        assert!(config.css.minify);
        assert!(!config.css.sign);
        assert!(config.css.minify_options.merge_rules);
        assert_eq!(config.resource.dest, PathBuf::from("./static/res/"));
    }

    #[test]
    fn test_parse_css_section() {
        let config = test_parse_config(
            "[css]\ndest = \"./css/\"\nsign = true\n[css.minify-options]\nmerge-rules = false\n[resource]\ndest = \"./res/\"",
        );
        assert_eq!(config.css.dest, PathBuf::from("./css/"));
        assert!(config.css.sign);
        assert!(!config.css.minify_options.merge_rules);
        assert_eq!(config.resource.dest, PathBuf::from("./res/"));
    }
}
