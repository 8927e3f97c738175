//! Plain-text views of markup.

use super::tokenizer::tokenize;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();

fn entity_regex() -> &'static Regex {
    ENTITY_REGEX.get_or_init(|| {
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
            .expect("Failed to compile entity regex")
    })
}

/// Text content of an HTML fragment: every text node entity-decoded and
/// concatenated in document order. Tags and comments contribute nothing.
pub fn plain_text(html: &str) -> String {
    tokenize(html)
        .iter()
        .filter(|t| t.is_text())
        .map(|t| html_escape::decode_html_entities(&html[t.span.clone()]))
        .collect()
}

#[derive(Debug, Clone)]
struct Piece {
    raw: Range<usize>,
    decoded: Range<usize>,
    /// Literal runs map byte-for-byte; entities map as a unit
    literal: bool,
}

/// Decoded text of one raw text node, with enough bookkeeping to map a
/// range of the decoded text back onto the raw source.
#[derive(Debug, Clone)]
pub struct DecodedText {
    text: String,
    pieces: Vec<Piece>,
}

impl DecodedText {
    pub fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut pieces = Vec::new();
        let mut cursor = 0;

        let mut push = |text: &mut String, raw_range: Range<usize>, decoded: &str, literal| {
            let start = text.len();
            text.push_str(decoded);
            pieces.push(Piece {
                raw: raw_range,
                decoded: start..text.len(),
                literal,
            });
        };

        for m in entity_regex().find_iter(raw) {
            if m.start() > cursor {
                push(&mut text, cursor..m.start(), &raw[cursor..m.start()], true);
            }
            let decoded = html_escape::decode_html_entities(m.as_str());
            // Unknown named entities decode to themselves and stay literal
            let literal = decoded == m.as_str();
            push(&mut text, m.range(), decoded.as_ref(), literal);
            cursor = m.end();
        }
        if cursor < raw.len() {
            push(&mut text, cursor..raw.len(), &raw[cursor..], true);
        }

        Self { text, pieces }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw byte range covering the decoded range `decoded`.
    ///
    /// A boundary falling inside a decoded entity widens to include the
    /// whole entity.
    pub fn raw_range(&self, decoded: Range<usize>) -> Range<usize> {
        let start = self
            .pieces
            .iter()
            .find(|p| decoded.start < p.decoded.end)
            .map(|p| {
                if p.literal {
                    p.raw.start + (decoded.start - p.decoded.start)
                } else {
                    p.raw.start
                }
            })
            .unwrap_or_else(|| self.raw_len());

        let end = self
            .pieces
            .iter()
            .find(|p| decoded.end <= p.decoded.end && decoded.end > p.decoded.start)
            .map(|p| {
                if p.literal {
                    p.raw.start + (decoded.end - p.decoded.start)
                } else {
                    p.raw.end
                }
            })
            .unwrap_or(start);

        start..end.max(start)
    }

    fn raw_len(&self) -> usize {
        self.pieces.last().map_or(0, |p| p.raw.end)
    }
}
