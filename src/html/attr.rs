//! Attribute access on a single tag's source text.
//!
//! Works on the raw source of one tag (`<link rel="stylesheet" href="a.css">`)
//! without building a DOM. Only the opening tag is scanned, so passing a
//! whole `<script ...>body</script>` is fine: the body is never touched.
//!
//! Boolean attributes (present, no value) read as [`AttrValue::Flag`].

use std::ops::Range;

/// Value of an attribute as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Present without a value (`<script coolie>`).
    Flag,
    /// Present with a (possibly empty) value.
    Value(String),
}

impl AttrValue {
    /// The value, if the attribute has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Flag => None,
            Self::Value(v) => Some(v),
        }
    }

    /// The value, if the attribute has a non-blank one.
    pub fn non_empty(&self) -> Option<&str> {
        self.as_str().filter(|v| !v.trim().is_empty())
    }
}

/// Located attribute inside a tag.
#[derive(Debug)]
struct AttrSpan {
    /// Start of the whitespace preceding the name.
    start: usize,
    name: Range<usize>,
    /// Value contents, quotes excluded.
    value: Option<Range<usize>>,
    /// End of the attribute, closing quote included.
    end: usize,
}

/// Scan the attributes of the opening tag at the start of `tag`.
///
/// Returns the spans and the offset right after the tag name (the insert
/// position when there are no attributes).
fn scan(tag: &str) -> (Vec<AttrSpan>, usize) {
    let bytes = tag.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();

    let mut i = usize::from(bytes.first() == Some(&b'<'));
    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }
    let name_end = i;

    loop {
        let start = i;
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            break;
        }
        if matches!(bytes[i], b'/' | b'=' | b'"' | b'\'') {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        let name = name_start..i;

        // Look past whitespace for `=`, without consuming it otherwise
        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value = None;
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j + 1;
                let mut k = value_start;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                value = Some(value_start..k);
                i = (k + 1).min(len);
            } else {
                let value_start = j;
                while j < len && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
                value = Some(value_start..j);
                i = j;
            }
        }

        spans.push(AttrSpan {
            start,
            name,
            value,
            end: i,
        });
    }

    (spans, name_end)
}

fn find<'a>(tag: &str, spans: &'a [AttrSpan], name: &str) -> Option<&'a AttrSpan> {
    spans
        .iter()
        .find(|s| tag[s.name.clone()].eq_ignore_ascii_case(name))
}

#[inline]
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "&quot;"))
}

/// Read an attribute.
///
/// # Example
/// ```ignore
/// assert_eq!(get(r#"<link href="a.css">"#, "href"), Some(AttrValue::Value("a.css".into())));
/// assert_eq!(get("<script coolie>", "coolie"), Some(AttrValue::Flag));
/// ```
pub fn get(tag: &str, name: &str) -> Option<AttrValue> {
    let (spans, _) = scan(tag);
    let span = find(tag, &spans, name)?;
    Some(match &span.value {
        Some(range) => AttrValue::Value(tag[range.clone()].to_string()),
        None => AttrValue::Flag,
    })
}

/// Check if an attribute is present at all.
#[inline]
pub fn has(tag: &str, name: &str) -> bool {
    get(tag, name).is_some()
}

/// Set an attribute, replacing the existing value or appending it.
pub fn set(tag: &str, name: &str, value: &str) -> String {
    let (spans, name_end) = scan(tag);

    if let Some(span) = find(tag, &spans, name) {
        let mut out = String::with_capacity(tag.len() + value.len());
        out.push_str(&tag[..span.name.end]);
        out.push('=');
        out.push_str(&quote(value));
        out.push_str(&tag[span.end..]);
        return out;
    }

    let at = spans.last().map_or(name_end, |s| s.end);
    let mut out = String::with_capacity(tag.len() + name.len() + value.len() + 4);
    out.push_str(&tag[..at]);
    out.push(' ');
    out.push_str(name);
    out.push('=');
    out.push_str(&quote(value));
    out.push_str(&tag[at..]);
    out
}

/// Remove every occurrence of an attribute, including its leading whitespace.
pub fn remove(tag: &str, name: &str) -> String {
    let (spans, _) = scan(tag);
    let mut out = tag.to_string();

    for span in spans
        .iter()
        .rev()
        .filter(|s| tag[s.name.clone()].eq_ignore_ascii_case(name))
    {
        out.replace_range(span.start..span.end, "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &str) -> Option<AttrValue> {
        Some(AttrValue::Value(v.to_string()))
    }

    #[test]
    fn test_get_quoted_unquoted_flag() {
        let tag = r#"<link rel=stylesheet href='a.css' data-x="1" disabled>"#;
        assert_eq!(get(tag, "rel"), value("stylesheet"));
        assert_eq!(get(tag, "href"), value("a.css"));
        assert_eq!(get(tag, "data-x"), value("1"));
        assert_eq!(get(tag, "disabled"), Some(AttrValue::Flag));
        assert_eq!(get(tag, "type"), None);
    }

    #[test]
    fn test_get_is_case_insensitive_and_exact() {
        let tag = r#"<script DATA-MAIN="app.js" main="no">"#;
        assert_eq!(get(tag, "data-main"), value("app.js"));
        assert_eq!(get(tag, "main"), value("no"));
        assert_eq!(get(tag, "data"), None);
    }

    #[test]
    fn test_get_ignores_script_body() {
        let source = r#"<script>var s = '<a href="x">';</script>"#;
        assert_eq!(get(source, "href"), None);
    }

    #[test]
    fn test_get_tolerates_whitespace_around_equals() {
        let tag = "<link\n  href = \"a.css\"\n/>";
        assert_eq!(get(tag, "href"), value("a.css"));
    }

    #[test]
    fn test_set_existing_value() {
        let tag = r#"<link rel="stylesheet" href="a.css">"#;
        assert_eq!(
            set(tag, "href", "/static/css/abc.css"),
            r#"<link rel="stylesheet" href="/static/css/abc.css">"#
        );
    }

    #[test]
    fn test_set_flag_and_missing() {
        assert_eq!(set("<script coolie>", "coolie", "1"), r#"<script coolie="1">"#);
        assert_eq!(
            set(r#"<link href="a"/>"#, "rel", "icon"),
            r#"<link href="a" rel="icon"/>"#
        );
        assert_eq!(set("<img>", "src", "x.png"), r#"<img src="x.png">"#);
    }

    #[test]
    fn test_set_escapes_quotes() {
        assert_eq!(set("<img>", "alt", "a\"b"), r#"<img alt="a&quot;b">"#);
    }

    #[test]
    fn test_remove() {
        assert_eq!(
            remove(r#"<link coolieignore href="a.css">"#, "coolieignore"),
            r#"<link href="a.css">"#
        );
        assert_eq!(
            remove(r#"<script src="a.js" coolie></script>"#, "coolie"),
            r#"<script src="a.js"></script>"#
        );
        assert_eq!(remove("<img>", "src"), "<img>");
    }

    #[test]
    fn test_attr_value_helpers() {
        assert_eq!(AttrValue::Flag.non_empty(), None);
        assert_eq!(AttrValue::Value("  ".into()).non_empty(), None);
        assert_eq!(AttrValue::Value("a".into()).non_empty(), Some("a"));
    }
}
