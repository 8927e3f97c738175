//! A forgiving tokenizer for cooked post HTML.
//!
//! Cooked markup is produced by the forum's own renderer, so the tokenizer
//! only needs to be good enough to find element boundaries: it splits the
//! source into start tags, end tags, comments/declarations and text, each
//! carrying the byte span it was read from. Anything that does not parse as
//! a tag is treated as text, so tokens always tile the whole input.
//! The content of `<script>`, `<style>` and `<textarea>` is a single text
//! token, whatever it looks like.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTR_REGEX: OnceLock<Regex> = OnceLock::new();

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text up to their closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?xs)
            (?P<comment><!--.*?-->)
            |
            (?P<decl><![^>]*>)
            |
            </\s*(?P<end>[A-Za-z][A-Za-z0-9:-]*)\s*>
            |
            <(?P<start>[A-Za-z][A-Za-z0-9:-]*)
             (?P<attrs>(?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)
             \s*(?P<selfclose>/?)>
            "#,
        )
        .expect("Failed to compile tag regex")
    })
}

fn attr_regex() -> &'static Regex {
    ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Failed to compile attribute regex")
    })
}

/// A single `name="value"` pair. Names are lowercased, values are
/// entity-decoded; a bare attribute has an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text,
    /// Comments, doctype and other `<!...>` declarations
    Comment,
}

/// One token and the byte range of the source it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// Tag name for start and end tags
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::StartTag { name, .. } | TokenKind::EndTag { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_start(&self, tag: &str) -> bool {
        matches!(&self.kind, TokenKind::StartTag { name, .. } if name == tag)
    }

    pub fn is_end(&self, tag: &str) -> bool {
        matches!(&self.kind, TokenKind::EndTag { name } if name == tag)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text)
    }

    /// Value of an attribute on a start tag
    pub fn attr(&self, attr: &str) -> Option<&str> {
        match &self.kind {
            TokenKind::StartTag { attrs, .. } => attrs
                .iter()
                .find(|a| a.name == attr)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Whether a start tag's `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Whether this start tag opens an element that has content and a
    /// closing tag
    pub fn opens_element(&self) -> bool {
        match &self.kind {
            TokenKind::StartTag {
                name, self_closing, ..
            } => !*self_closing && !is_void(name),
            _ => false,
        }
    }
}

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn parse_attrs(raw: &str) -> Vec<Attribute> {
    attr_regex()
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            Attribute {
                name: caps[1].to_ascii_lowercase(),
                value,
            }
        })
        .collect()
}

/// Split `html` into tokens that cover every byte exactly once.
pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = tag_regex().captures_at(html, cursor) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.start() > cursor {
            tokens.push(Token {
                kind: TokenKind::Text,
                span: cursor..whole.start(),
            });
        }

        let kind = if caps.name("comment").is_some() || caps.name("decl").is_some() {
            TokenKind::Comment
        } else if let Some(end) = caps.name("end") {
            TokenKind::EndTag {
                name: end.as_str().to_ascii_lowercase(),
            }
        } else {
            let name = caps
                .name("start")
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            let attrs = caps
                .name("attrs")
                .map(|m| parse_attrs(m.as_str()))
                .unwrap_or_default();
            let self_closing = caps.name("selfclose").is_some_and(|m| !m.is_empty());
            TokenKind::StartTag {
                name,
                attrs,
                self_closing,
            }
        };

        let raw_text = match &kind {
            TokenKind::StartTag {
                name,
                self_closing: false,
                ..
            } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };
        tokens.push(Token {
            kind,
            span: whole.range(),
        });
        cursor = whole.end();

        if let Some(name) = raw_text {
            let end = raw_text_end(html, cursor, &name);
            if end > cursor {
                tokens.push(Token {
                    kind: TokenKind::Text,
                    span: cursor..end,
                });
            }
            cursor = end;
        }
    }

    if cursor < html.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            span: cursor..html.len(),
        });
    }
    tokens
}

/// Start of the tag closing a raw-text element, or the end of the input
/// when it is never closed.
fn raw_text_end(html: &str, from: usize, name: &str) -> usize {
    let closing = format!("</{name}");
    html[from..]
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(html.len(), |offset| from + offset)
}

/// Index of the end tag closing the element opened at `tokens[open]`.
///
/// Counts nested elements of the same name. Returns `None` for void or
/// self-closing tags and when the element is never closed.
pub fn matching_end(tokens: &[Token], open: usize) -> Option<usize> {
    let token = tokens.get(open)?;
    if !token.opens_element() {
        return None;
    }
    let name = token.tag_name()?;

    let mut depth = 0usize;
    for (offset, t) in tokens[open + 1..].iter().enumerate() {
        if t.is_start(name) && t.opens_element() {
            depth += 1;
        } else if t.is_end(name) {
            if depth == 0 {
                return Some(open + 1 + offset);
            }
            depth -= 1;
        }
    }
    None
}
