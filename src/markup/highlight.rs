//! Best-effort excerpt highlighting inside a fetched post.

use super::text::DecodedText;
use super::tokenizer::tokenize;

/// Result of [`highlight_first`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub html: String,
    /// `false` when the needle was not found in any single text node; `html`
    /// is then the input unchanged
    pub matched: bool,
}

/// Wrap the first occurrence of `needle` (plain text) in
/// `<span class="{class}">…</span>`.
///
/// Only text nodes are searched, one at a time, so a needle that spans an
/// element boundary is a miss. Everything outside the wrapped range is
/// returned byte-for-byte. An empty (or all-whitespace) needle never matches.
pub fn highlight_first(html: &str, needle: &str, class: &str) -> Highlighted {
    if needle.trim().is_empty() {
        return Highlighted {
            html: html.to_string(),
            matched: false,
        };
    }

    for token in tokenize(html).iter().filter(|t| t.is_text()) {
        let decoded = DecodedText::new(&html[token.span.clone()]);
        let Some(pos) = decoded.as_str().find(needle) else {
            continue;
        };
        let local = decoded.raw_range(pos..pos + needle.len());
        let start = token.span.start + local.start;
        let end = token.span.start + local.end;

        let mut out = String::with_capacity(html.len() + class.len() + 24);
        out.push_str(&html[..start]);
        out.push_str("<span class=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(class));
        out.push_str("\">");
        out.push_str(&html[start..end]);
        out.push_str("</span>");
        out.push_str(&html[end..]);
        return Highlighted {
            html: out,
            matched: true,
        };
    }

    Highlighted {
        html: html.to_string(),
        matched: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_first_occurrence_only() {
        let result = highlight_first("<p>Hello world, nice day.</p>", "world", "highlighted");
        assert!(result.matched);
        assert_eq!(
            result.html,
            "<p>Hello <span class=\"highlighted\">world</span>, nice day.</p>"
        );

        let twice = highlight_first("<p>ab ab</p>", "ab", "hl");
        assert_eq!(twice.html, "<p><span class=\"hl\">ab</span> ab</p>");
    }

    #[test]
    fn test_miss_returns_input_unchanged() {
        let html = "<p>Hello world, nice day.</p>";
        let result = highlight_first(html, "xyz", "highlighted");
        assert!(!result.matched);
        assert_eq!(result.html, html);
    }

    #[test]
    fn test_attribute_text_is_not_searched() {
        let html = r#"<a title="world">link</a><p>world</p>"#;
        let result = highlight_first(html, "world", "hl");
        assert_eq!(
            result.html,
            r#"<a title="world">link</a><p><span class="hl">world</span></p>"#
        );
    }

    #[test]
    fn test_needle_with_entity_keeps_raw_encoding() {
        let html = "<p>Fish &amp; chips</p>";
        let result = highlight_first(html, "Fish & chips", "hl");
        assert!(result.matched);
        assert_eq!(result.html, "<p><span class=\"hl\">Fish &amp; chips</span></p>");
    }

    #[test]
    fn test_needle_across_elements_is_a_miss() {
        let result = highlight_first("<p>Hello <b>world</b></p>", "Hello world", "hl");
        assert!(!result.matched);
    }

    #[test]
    fn test_blank_needle_is_a_miss() {
        assert!(!highlight_first("<p> </p>", "  ", "hl").matched);
        assert!(!highlight_first("<p>x</p>", "", "hl").matched);
    }
}
