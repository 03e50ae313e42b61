//! Tag-shape matching over raw HTML.
//!
//! The resolvers never see a DOM. They ask this module for every occurrence
//! of a tag shape and hand back the replacement text, which keeps any
//! surrounding markup (malformed or not) byte-for-byte intact.
//!
//! | Shape | Example | `open` | `body` |
//! |-------|---------|--------|--------|
//! | [`TagShape::Void`] | `<link ...>` | whole tag | `None` |
//! | [`TagShape::Paired`] | `<script ...>...</script>` | opening tag | inner text |
//! | [`TagShape::Block`] | `<!--coolie-->...<!--/coolie-->` | whole block | inner text |

use regex::Regex;

/// Kind of markup a [`TagPattern`] matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    Void,
    Paired,
    Block,
}

/// One match of a [`TagPattern`].
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    /// Full matched source.
    pub source: &'a str,
    /// Opening tag (`<script ...>`), or the full source for void tags.
    pub open: &'a str,
    /// Inner text for paired tags and marker blocks.
    pub body: Option<&'a str>,
}

/// Compiled matcher for one tag shape.
#[derive(Debug)]
pub struct TagPattern {
    shape: TagShape,
    regex: Regex,
}

impl TagPattern {
    /// Void element such as `<link>` or `<img>`, matched up to the first `>`.
    pub fn void(name: &str) -> Self {
        Self::compile(TagShape::Void, &format!(r"(?i)<{name}\b[\s\S]*?>"))
    }

    /// Element with a body, such as `<script>...</script>`.
    pub fn paired(name: &str) -> Self {
        Self::compile(
            TagShape::Paired,
            &format!(r"(?i)(<{name}\b[\s\S]*?>)([\s\S]*?)</{name}\s*>"),
        )
    }

    /// Region between `<!--marker-->` and `<!--/marker-->`.
    pub fn block(marker: &str) -> Self {
        Self::compile(
            TagShape::Block,
            &format!(r"(?i)<!--\s*?{marker}\s*?-->([\s\S]*?)<!--\s*?/{marker}\s*?-->"),
        )
    }

    fn compile(shape: TagShape, pattern: &str) -> Self {
        // Patterns are assembled from fixed tag names, never from user input
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid tag pattern: {e}"));
        Self { shape, regex }
    }

    fn to_tag<'a>(&self, caps: &regex::Captures<'a>) -> Tag<'a> {
        let source = caps.get(0).map_or("", |m| m.as_str());
        match self.shape {
            TagShape::Void => Tag {
                source,
                open: source,
                body: None,
            },
            TagShape::Paired => Tag {
                source,
                open: caps.get(1).map_or(source, |m| m.as_str()),
                body: Some(caps.get(2).map_or("", |m| m.as_str())),
            },
            TagShape::Block => Tag {
                source,
                open: source,
                body: Some(caps.get(1).map_or("", |m| m.as_str())),
            },
        }
    }

    /// All matches in document order.
    pub fn find_all<'a>(&self, code: &'a str) -> Vec<Tag<'a>> {
        self.regex
            .captures_iter(code)
            .map(|caps| self.to_tag(&caps))
            .collect()
    }

    /// Replace every match with the text returned by `f`.
    ///
    /// Stops at the first error; nothing is returned for partial documents.
    pub fn try_replace<E>(
        &self,
        code: &str,
        mut f: impl FnMut(Tag<'_>) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut out = String::with_capacity(code.len());
        let mut last = 0;

        for caps in self.regex.captures_iter(code) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&code[last..whole.start()]);
            out.push_str(&f(self.to_tag(&caps))?);
            last = whole.end();
        }

        out.push_str(&code[last..]);
        Ok(out)
    }
}
