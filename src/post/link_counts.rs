//! Click-count badges on links in cooked post content.

use crate::markup::{Token, TokenKind, matching_end, tokenize};

/// How often a link in the post has been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCount {
    pub url: String,
    pub clicks: u64,
}

impl LinkCount {
    pub fn new(url: impl Into<String>, clicks: u64) -> Self {
        Self {
            url: url.into(),
            clicks,
        }
    }
}

/// Badge markup appended inside a counted link
pub fn badge_html(clicks: u64, title: &str) -> String {
    format!(
        "<span class=\"badge badge-notification clicks\" title=\"{}\">{}</span>",
        html_escape::encode_double_quoted_attribute(title),
        clicks
    )
}

/// Append a click badge inside every `<a href>` whose href matches a count.
///
/// Counts with zero clicks are skipped. Links inside a `.badge-category`
/// never get a badge; links inside a `.onebox-result` only get one when the
/// anchor itself carries `track-link`. Badges for several counts on the same
/// link are appended in count order. Everything else is left untouched.
pub fn apply_link_counts(html: &str, counts: &[LinkCount], title: &str) -> String {
    let counts: Vec<&LinkCount> = counts.iter().filter(|c| c.clicks > 0).collect();
    if counts.is_empty() {
        return html.to_string();
    }

    let tokens = tokenize(html);
    let eligible = eligible_anchors(&tokens);

    // (insertion offset, badge markup), in count order per anchor
    let mut insertions: Vec<(usize, String)> = Vec::new();
    for count in &counts {
        for &(open, close) in &eligible {
            if tokens[open].attr("href") == Some(count.url.as_str()) {
                insertions.push((tokens[close].span.start, badge_html(count.clicks, title)));
            }
        }
    }
    if insertions.is_empty() {
        return html.to_string();
    }
    // Stable: keeps count order for badges at the same offset
    insertions.sort_by_key(|(offset, _)| *offset);

    let mut out = String::with_capacity(html.len() + insertions.len() * 64);
    let mut cursor = 0;
    for (offset, badge) in insertions {
        out.push_str(&html[cursor..offset]);
        out.push_str(&badge);
        cursor = offset;
    }
    out.push_str(&html[cursor..]);
    out
}

/// `(start, end)` token indices of anchors allowed to carry a badge.
fn eligible_anchors(tokens: &[Token]) -> Vec<(usize, usize)> {
    // Open elements as (name, in badge-category, in onebox-result)
    let mut stack: Vec<(String, bool, bool)> = Vec::new();
    let mut anchors = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::StartTag { name, .. } => {
                let (in_category, in_onebox) = stack
                    .last()
                    .map(|(_, c, o)| (*c, *o))
                    .unwrap_or((false, false));
                let in_category = in_category || token.has_class("badge-category");
                let in_onebox = in_onebox || token.has_class("onebox-result");

                if name == "a"
                    && token.attr("href").is_some()
                    && !in_category
                    && (!in_onebox || token.has_class("track-link"))
                    && let Some(close) = matching_end(tokens, i)
                {
                    anchors.push((i, close));
                }

                if token.opens_element() {
                    stack.push((name.clone(), in_category, in_onebox));
                }
            }
            TokenKind::EndTag { name } => {
                if let Some(pos) = stack.iter().rposition(|(open, _, _)| open == name) {
                    stack.truncate(pos);
                }
            }
            _ => {}
        }
    }
    anchors
}
