//! Generic resource rewriter.
//!
//! Copies a referenced file (image, font, favicon, loader script) into the
//! resource directory as `<version>.<ext>` and points the reference at the
//! copy. Used for tag attributes here and for CSS `url(...)` by the CSS
//! minifier adapter.

use std::path::Path;
use std::sync::Arc;

use super::cache::AssetCache;
use super::error::{Result, write_output};
use super::{Addressing, ResolveError, ResourceRef};
use crate::debug;
use crate::html::attr;
use crate::utils::path::uri::{RefKind, strip_query_fragment};

/// Copy `source` into `resource_dir` under a content-derived name.
///
/// Memoized per source path: the file is read and written once per build.
pub fn copy_resource(
    source: &Path,
    resource_dir: &Path,
    addressing: &Addressing,
    cache: &AssetCache,
) -> Result<Arc<ResourceRef>> {
    let lookup = cache.resources.get_or_try_insert(source.to_path_buf(), || {
        let bytes = std::fs::read(source).map_err(|e| ResolveError::read(source, e))?;
        let token = addressing.version(&bytes);
        let name = match source.extension() {
            Some(ext) => format!("{token}.{}", ext.to_string_lossy()),
            None => token,
        };

        let dest_path = resource_dir.join(name);
        write_output(&dest_path, &bytes)?;
        let url = addressing.url_for(&dest_path);

        Ok(ResourceRef {
            src_path: source.to_path_buf(),
            dest_path,
            url,
        })
    })?;

    if lookup.fresh {
        debug!("resource"; "√ {}", addressing.display_src(source));
    }
    Ok(lookup.value)
}

/// Rewrite `attr_name` of one tag to the versioned copy of what it references.
///
/// Returns the tag unchanged when the attribute is missing, empty or not a
/// local reference. A `#fragment` on the reference is carried over.
pub fn replace_tag_resource(
    file: &Path,
    tag: &str,
    attr_name: &str,
    resource_dir: &Path,
    addressing: &Addressing,
    cache: &AssetCache,
) -> Result<String> {
    let Some(value) = attr::get(tag, attr_name) else {
        return Ok(tag.to_string());
    };
    let Some(reference) = value.non_empty() else {
        return Ok(tag.to_string());
    };
    let reference = reference.trim();
    if !RefKind::parse(reference).is_local() || strip_query_fragment(reference).is_empty() {
        return Ok(tag.to_string());
    }

    let source = addressing.resolve(reference, file);
    let resource = copy_resource(&source, resource_dir, addressing, cache)?;
    let fragment = reference.find('#').map_or("", |i| &reference[i..]);

    Ok(attr::set(tag, attr_name, &format!("{}{fragment}", resource.url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replace::tests::Fixture;
    use std::fs;

    #[test]
    fn test_copy_resource_once() {
        let fixture = Fixture::new();
        let addressing = fixture.addressing("");
        let cache = AssetCache::new();
        let dir = fixture.path("dest/static/res");
        let source = fixture.path("src/static/img/logo.png");

        let first = copy_resource(&source, &dir, &addressing, &cache).unwrap();
        let second = copy_resource(&source, &dir, &addressing, &cache).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fs::read(&first.dest_path).unwrap(), b"logo-bytes");
        assert!(first.url.starts_with("/static/res/"));
        assert!(first.url.ends_with(".png"));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_replace_tag_resource() {
        let fixture = Fixture::new();
        let addressing = fixture.addressing("https://cdn.example.com/");
        let cache = AssetCache::new();
        let html = fixture.path("src/html/index.html");
        let dir = fixture.path("dest/static/res");

        let tag = r#"<img src="../static/img/logo.png" alt="logo">"#;
        let out = replace_tag_resource(&html, tag, "src", &dir, &addressing, &cache).unwrap();
        assert!(out.starts_with(r#"<img src="https://cdn.example.com/static/res/"#));
        assert!(out.ends_with(r#".png" alt="logo">"#));

        let sprite = r##"<img src="/static/img/logo.png#icon">"##;
        let out = replace_tag_resource(&html, sprite, "src", &dir, &addressing, &cache).unwrap();
        assert!(out.contains(".png#icon\""));
        assert_eq!(cache.resources.len(), 1);
    }

    #[test]
    fn test_replace_tag_resource_skips_non_local() {
        let fixture = Fixture::new();
        let addressing = fixture.addressing("");
        let cache = AssetCache::new();
        let html = fixture.path("src/index.html");
        let dir = fixture.path("dest/res");

        for tag in [
            r#"<img src="https://x.com/a.png">"#,
            r#"<img src="data:image/png;base64,AAAA">"#,
            r#"<img src="">"#,
            "<img src>",
            "<img alt=\"none\">",
        ] {
            let out = replace_tag_resource(&html, tag, "src", &dir, &addressing, &cache).unwrap();
            assert_eq!(out, tag);
        }
        assert!(cache.resources.is_empty());
    }

    #[test]
    fn test_replace_tag_resource_missing_file() {
        let fixture = Fixture::new();
        let addressing = fixture.addressing("");
        let err = replace_tag_resource(
            &fixture.path("src/index.html"),
            r#"<img src="missing.png">"#,
            "src",
            &fixture.path("dest/res"),
            &addressing,
            &AssetCache::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Resolution { .. }));
    }
}
