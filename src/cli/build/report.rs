//! Dependency report (`coolie-map.json`).
//!
//! One entry per resolved document, keyed by its root-relative source path.
//! Source paths are shown relative to the source root and emitted files
//! relative to the destination root, so the report is stable across machines.

use crate::replace::{Addressing, BundleRecord, CssRecord, ResolvedHtml, error::write_output};
use crate::utils::path::uri::to_root_url;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the report inside the destination root.
pub const REPORT_NAME: &str = "coolie-map.json";

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct DependencyReport {
    documents: BTreeMap<String, DocumentEntry>,
}

#[derive(Debug, Default, Serialize)]
struct DocumentEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    css: Vec<CssEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bundles: Vec<BundleEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    main: Option<String>,
}

#[derive(Debug, Serialize)]
struct CssEntry {
    dest: String,
    deps: Vec<DependencyEntry>,
}

#[derive(Debug, Serialize)]
struct DependencyEntry {
    src: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    res: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BundleEntry {
    name: String,
    dest: String,
    files: Vec<String>,
    /// Produced by an earlier block, in this or another document.
    repeat: bool,
}

impl DependencyReport {
    /// Build the report from resolved documents.
    pub fn new(addressing: &Addressing, documents: &[(PathBuf, ResolvedHtml)]) -> Self {
        let documents = documents
            .iter()
            .map(|(file, resolved)| {
                let entry = DocumentEntry {
                    css: resolved
                        .css_list
                        .iter()
                        .map(|record| css_entry(addressing, record))
                        .collect(),
                    bundles: resolved
                        .bundles
                        .iter()
                        .map(|bundle| bundle_entry(addressing, bundle))
                        .collect(),
                    main: resolved.main_js.clone(),
                };
                (addressing.display_src(file), entry)
            })
            .collect();
        Self { documents }
    }

    /// Write the report as pretty JSON into `dest_root`.
    pub fn write(&self, dest_root: &Path) -> Result<PathBuf> {
        let path = dest_root.join(REPORT_NAME);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        write_output(&path, json)?;
        Ok(path)
    }
}

fn css_entry(addressing: &Addressing, record: &CssRecord) -> CssEntry {
    CssEntry {
        dest: to_root_url(&record.dest_path, &addressing.dest_root),
        deps: record
            .dependencies
            .iter()
            .map(|dep| DependencyEntry {
                src: addressing.display_src(&dep.src_path),
                res: dep
                    .resources
                    .iter()
                    .map(|r| to_root_url(&r.dest_path, &addressing.dest_root))
                    .collect(),
            })
            .collect(),
    }
}

fn bundle_entry(addressing: &Addressing, bundle: &BundleRecord) -> BundleEntry {
    BundleEntry {
        name: bundle.name.clone(),
        dest: to_root_url(&bundle.dest_path, &addressing.dest_root),
        files: bundle
            .files
            .iter()
            .map(|f| addressing.display_src(f))
            .collect(),
        repeat: bundle.is_repeat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replace::ResourceRef;
    use crate::replace::link::CssDependency;
    use tempfile::TempDir;

    fn addressing() -> Addressing {
        Addressing {
            src_root: "/p/src".into(),
            dest_root: "/p/dest".into(),
            dest_host: "https://cdn.example.com/".into(),
            version_length: 8,
        }
    }

    #[test]
    fn test_report_paths_are_root_relative() {
        let resolved = ResolvedHtml {
            css_list: vec![CssRecord {
                dest_path: "/p/dest/static/css/abcd1234.css".into(),
                dependencies: vec![CssDependency {
                    src_path: "/p/src/static/css/a.css".into(),
                    resources: vec![ResourceRef {
                        src_path: "/p/src/static/img/bg.png".into(),
                        dest_path: "/p/dest/static/res/ffff0000.png".into(),
                        url: "https://cdn.example.com/static/res/ffff0000.png".into(),
                    }],
                }],
            }],
            ..ResolvedHtml::default()
        };
        let report = DependencyReport::new(
            &addressing(),
            &[(PathBuf::from("/p/src/html/index.html"), resolved)],
        );

        let json = serde_json::to_value(&report).unwrap();
        let css = &json["/html/index.html"]["css"][0];
        assert_eq!(css["dest"], "/static/css/abcd1234.css");
        assert_eq!(css["deps"][0]["src"], "/static/css/a.css");
        assert_eq!(css["deps"][0]["res"][0], "/static/res/ffff0000.png");
        assert!(json["/html/index.html"].get("bundles").is_none());
    }

    #[test]
    fn test_report_bundles() {
        let bundle = BundleRecord {
            name: "0badf00d.css".into(),
            url: "https://cdn.example.com/static/css/0badf00d.css".into(),
            dest_path: "/p/dest/static/css/0badf00d.css".into(),
            files: vec!["/p/src/static/css/a.css".into(), "/p/src/static/css/b.css".into()],
            is_repeat: true,
        };
        let resolved = ResolvedHtml {
            bundles: vec![bundle],
            main_js: Some("/static/js/app/index.js".into()),
            ..ResolvedHtml::default()
        };
        let report = DependencyReport::new(
            &addressing(),
            &[(PathBuf::from("/p/src/about.html"), resolved)],
        );

        let json = serde_json::to_value(&report).unwrap();
        let entry = &json["/about.html"];
        assert_eq!(entry["bundles"][0]["name"], "0badf00d.css");
        assert_eq!(entry["bundles"][0]["dest"], "/static/css/0badf00d.css");
        assert_eq!(entry["bundles"][0]["files"][1], "/static/css/b.css");
        assert_eq!(entry["bundles"][0]["repeat"], true);
        assert_eq!(entry["main"], "/static/js/app/index.js");
        assert!(entry.get("css").is_none());
    }

    #[test]
    fn test_report_write() {
        let dir = TempDir::new().unwrap();
        let report = DependencyReport::new(
            &addressing(),
            &[(PathBuf::from("/p/src/a.html"), ResolvedHtml::default())],
        );

        let path = report.write(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(REPORT_NAME));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"/a.html\": {}"));
    }
}
