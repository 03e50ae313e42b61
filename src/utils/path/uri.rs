//! Conversion between filesystem paths and build-root URLs.
//!
//! Three URL spaces meet here:
//! - **filesystem**: absolute paths under the source or destination root
//! - **root-relative**: `/static/css/abc.css`, relative to a build root
//! - **host-qualified**: the root-relative path joined with `[dest].host`
//!
//! All functions are pure; none of them touch the filesystem.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Syntactic classification of a reference found in a tag attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind<'a> {
    /// URL pointing elsewhere (`https://`, `//cdn`, `data:`, `#frag`).
    External(&'a str),
    /// Build-root-relative path (`/static/a.css`).
    SiteRoot(&'a str),
    /// Relative to the referencing file (`../a.css`, `a.css`).
    FileRelative(&'a str),
}

impl<'a> RefKind<'a> {
    /// Parse a reference into its kind.
    #[inline]
    pub fn parse(reference: &'a str) -> Self {
        if !is_relatived(reference) {
            Self::External(reference)
        } else if reference.starts_with('/') {
            Self::SiteRoot(reference)
        } else {
            Self::FileRelative(reference)
        }
    }

    /// Whether the reference names a local file.
    #[inline]
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

/// Check if a link has a URL scheme (`http:`, `data:`, `mailto:`, ...).
///
/// A valid scheme has at least one character before the colon and only
/// contains ASCII alphanumerics or `+`, `-`, `.`.
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if a string is a fully-qualified (or protocol-relative) web URL.
///
/// ```ignore
/// assert!(is_url("https://cdn.example.com/"));
/// assert!(is_url("//cdn.example.com/"));
/// assert!(!is_url("/static/"));
/// ```
pub fn is_url(value: &str) -> bool {
    let value = value.trim();
    if value.starts_with("//") {
        return true;
    }
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Check if a reference is a local path that the build can resolve.
pub fn is_relatived(reference: &str) -> bool {
    let reference = reference.trim();
    !reference.is_empty()
        && !reference.starts_with('#')
        && !reference.starts_with("//")
        && !is_external_link(reference)
}

/// Strip `?query` and `#fragment` from a reference.
#[inline]
pub fn strip_query_fragment(reference: &str) -> &str {
    reference.split(['?', '#']).next().unwrap_or(reference)
}

/// Resolve a local reference found in `file` to an absolute source path.
///
/// Root-relative references join `src_root`, everything else joins the
/// directory of the referencing file.
pub fn to_absolute_file(reference: &str, file: &Path, src_root: &Path) -> PathBuf {
    let raw = strip_query_fragment(reference.trim());
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    let joined = match decoded.strip_prefix('/') {
        Some(rest) => src_root.join(rest),
        None => file.parent().unwrap_or(src_root).join(&decoded),
    };
    path_clean::clean(joined)
}

/// Root-relative URL of `path` inside `root` (always starts with `/`).
///
/// ```ignore
/// to_root_url("/p/dest/static/css/a.css", "/p/dest") // -> "/static/css/a.css"
/// ```
pub fn to_root_url(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let segments: Vec<String> = path_clean::clean(relative)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Join a destination host with a root-relative path.
///
/// An empty host or `/` leaves the path root-relative.
pub fn join_uri(host: &str, path: &str) -> String {
    let host = host.trim();
    let path = path.trim_start_matches('/');
    let host = host.trim_end_matches('/');
    format!("{host}/{path}")
}

/// Insert a version token before the extension of the last path segment.
///
/// ```ignore
/// replace_version("app.js", "abc12345")          // -> "app.abc12345.js"
/// replace_version("js/app", "abc12345")          // -> "js/app.abc12345"
/// replace_version("/a/b.min.js?x=1", "v")        // -> "/a/b.min.v.js?x=1"
/// ```
pub fn replace_version(uri: &str, version: &str) -> String {
    let split_at = uri.find(['?', '#']).unwrap_or(uri.len());
    let (path, suffix) = uri.split_at(split_at);

    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];

    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let at = name_start + dot;
            format!("{}.{version}{}{suffix}", &path[..at], &path[at..])
        }
        _ => format!("{path}.{version}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_kind() {
        assert_eq!(RefKind::parse("https://a.com/x.css"), RefKind::External("https://a.com/x.css"));
        assert_eq!(RefKind::parse("//cdn/x.css"), RefKind::External("//cdn/x.css"));
        assert_eq!(RefKind::parse("data:image/png;base64,AA"), RefKind::External("data:image/png;base64,AA"));
        assert_eq!(RefKind::parse("#top"), RefKind::External("#top"));
        assert_eq!(RefKind::parse("/static/a.css"), RefKind::SiteRoot("/static/a.css"));
        assert_eq!(RefKind::parse("../a.css"), RefKind::FileRelative("../a.css"));
        assert!(!RefKind::parse("").is_local());
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://cdn.example.com/"));
        assert!(is_url("http://cdn.example.com"));
        assert!(is_url("//cdn.example.com/"));
        assert!(!is_url("/"));
        assert!(!is_url(""));
        assert!(!is_url("static/"));
    }

    #[test]
    fn test_to_absolute_file() {
        let root = Path::new("/site/src");
        let html = Path::new("/site/src/html/index.html");

        assert_eq!(
            to_absolute_file("/static/css/a.css", html, root),
            PathBuf::from("/site/src/static/css/a.css")
        );
        assert_eq!(
            to_absolute_file("../static/css/a.css?v=1#x", html, root),
            PathBuf::from("/site/src/static/css/a.css")
        );
        assert_eq!(
            to_absolute_file("./my%20style.css", html, root),
            PathBuf::from("/site/src/html/my style.css")
        );
    }

    #[test]
    fn test_to_root_url() {
        assert_eq!(
            to_root_url(Path::new("/p/dest/static/css/a.css"), Path::new("/p/dest")),
            "/static/css/a.css"
        );
        assert_eq!(to_root_url(Path::new("/p/dest"), Path::new("/p/dest")), "/");
    }

    #[test]
    fn test_join_uri() {
        assert_eq!(join_uri("", "/static/a.css"), "/static/a.css");
        assert_eq!(join_uri("/", "/static/a.css"), "/static/a.css");
        assert_eq!(
            join_uri("https://cdn.example.com/", "/static/a.css"),
            "https://cdn.example.com/static/a.css"
        );
        assert_eq!(
            join_uri("https://cdn.example.com/assets", "static/a.css"),
            "https://cdn.example.com/assets/static/a.css"
        );
    }

    #[test]
    fn test_replace_version() {
        assert_eq!(replace_version("app.js", "abc12345"), "app.abc12345.js");
        assert_eq!(replace_version("js/app", "abc"), "js/app.abc");
        assert_eq!(replace_version("/a/b.min.js?x=1", "v"), "/a/b.min.v.js?x=1");
        assert_eq!(replace_version("./.hidden", "v"), "./.hidden.v");
    }
}
