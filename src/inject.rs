use std::ops::Range;
use std::path::Path;

use anyhow::Context as _;

use crate::config::ImageClass;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// The marker comment a section's content replaces.
pub fn placeholder_comment(section_id: &str) -> String {
    format!("<!-- {section_id} section content will be injected here -->")
}

/// The page template, held in memory for the duration of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    html: String,
}

impl Template {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("read template: {}", path.display()))?;
        Ok(Self { html })
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, &self.html)
            .with_context(|| format!("write template: {}", path.display()))
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn has_placeholder(&self, section_id: &str) -> bool {
        self.html.contains(&placeholder_comment(section_id))
    }

    /// Replaces the placeholder of `section_id` with `content`.
    ///
    /// The content has absolute asset paths made relative and, when
    /// `image_class` is given, matching `<img>` tags tagged with its class.
    /// The placeholder is consumed: a second injection for the same section
    /// fails.
    pub fn inject(
        &mut self,
        section_id: &str,
        content: &str,
        image_class: Option<&ImageClass>,
    ) -> anyhow::Result<()> {
        let marker = placeholder_comment(section_id);
        let Some(start) = self.html.find(&marker) else {
            anyhow::bail!("section {section_id} not found in template");
        };

        let mut content = normalize_asset_paths(content);
        if let Some(image_class) = image_class {
            content = add_image_class(&content, &image_class.needle, &image_class.class);
        }

        self.html.replace_range(start..start + marker.len(), &content);
        Ok(())
    }
}

/// Rewrites `src="/assets/..."` and `href="/assets/..."` to relative paths.
pub fn normalize_asset_paths(html: &str) -> String {
    let mut out = html.to_owned();
    for attr in ["src", "href"] {
        for quote in ['"', '\''] {
            out = out.replace(
                &format!("{attr}={quote}/assets/"),
                &format!("{attr}={quote}assets/"),
            );
        }
    }
    out
}

/// Adds `class` to every `<img>` whose `src` contains `needle`.
///
/// Tags that already carry the class are left untouched.
pub fn add_image_class(html: &str, needle: &str, class: &str) -> String {
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;

    while let Some(rel_lt) = html[cursor..].find('<') {
        let lt = cursor + rel_lt;
        out.push_str(&html[cursor..lt]);

        if html[lt..].starts_with(COMMENT_OPEN) {
            let body = lt + COMMENT_OPEN.len();
            let Some(rel_end) = html[body..].find(COMMENT_CLOSE) else {
                out.push_str(&html[lt..]);
                return out;
            };
            cursor = body + rel_end + COMMENT_CLOSE.len();
            out.push_str(&html[lt..cursor]);
            continue;
        }

        // Quotes only open an attribute value right after `=`.
        let mut in_quote: Option<u8> = None;
        let mut after_eq = false;
        let mut gt = lt + 1;
        while gt < bytes.len() {
            let b = bytes[gt];
            if let Some(q) = in_quote {
                if b == q {
                    in_quote = None;
                }
            } else if b == b'>' {
                break;
            } else if b == b'=' {
                after_eq = true;
            } else if after_eq && (b == b'"' || b == b'\'') {
                in_quote = Some(b);
                after_eq = false;
            } else if !b.is_ascii_whitespace() {
                after_eq = false;
            }
            gt += 1;
        }
        if gt >= bytes.len() {
            out.push_str(&html[lt..]);
            return out;
        }

        let raw_tag = &html[lt..=gt];
        cursor = gt + 1;

        let name_end = raw_tag[1..]
            .find(|c: char| !c.is_ascii_alphabetic())
            .map_or(raw_tag.len(), |i| i + 1);
        if !raw_tag[1..name_end].eq_ignore_ascii_case("img") {
            out.push_str(raw_tag);
            continue;
        }

        let attrs = parse_attrs(raw_tag, name_end);
        let src = attr_value(raw_tag, &attrs, "src");
        if !src.is_some_and(|src| src.contains(needle)) {
            out.push_str(raw_tag);
            continue;
        }

        match attrs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("class"))
            .and_then(|(_, value)| value.clone())
        {
            Some(range) => {
                let existing = &raw_tag[range.clone()];
                if existing.split_ascii_whitespace().any(|c| c == class) {
                    out.push_str(raw_tag);
                } else {
                    out.push_str(&raw_tag[..range.end]);
                    if !existing.trim().is_empty() {
                        out.push(' ');
                    }
                    out.push_str(class);
                    out.push_str(&raw_tag[range.end..]);
                }
            }
            None => {
                let body = raw_tag[..raw_tag.len() - 1].trim_end();
                let (head, self_closed) = match body.strip_suffix('/') {
                    Some(head) => (head.trim_end(), true),
                    None => (body, false),
                };
                out.push_str(head);
                out.push_str(&format!(" class=\"{class}\""));
                out.push_str(if self_closed { " />" } else { ">" });
            }
        }
    }

    out.push_str(&html[cursor..]);
    out
}

/// Attribute names with the byte range of their (unquoted) value inside `tag`.
fn parse_attrs(tag: &str, name_end: usize) -> Vec<(&str, Option<Range<usize>>)> {
    let bytes = tag.as_bytes();
    let end = tag.len() - 1;
    let mut attrs = Vec::new();
    let mut i = name_end;

    while i < end {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < end && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        let name = &tag[name_start..i];

        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end || bytes[i] != b'=' {
            attrs.push((name, None));
            continue;
        }
        i += 1;
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < end && matches!(bytes[i], b'"' | b'\'') {
            let quote = bytes[i] as char;
            let value_start = i + 1;
            let value_end = tag[value_start..end]
                .find(quote)
                .map_or(end, |rel| value_start + rel);
            i = (value_end + 1).min(end);
            value_start..value_end
        } else {
            let value_start = i;
            while i < end && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            value_start..i
        };
        attrs.push((name, Some(value)));
    }

    attrs
}

fn attr_value<'a>(
    tag: &'a str,
    attrs: &[(&str, Option<Range<usize>>)],
    name: &str,
) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.clone())
        .map(|range| &tag[range])
}
