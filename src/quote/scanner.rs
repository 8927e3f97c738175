//! Discovers quotation blocks in cooked post HTML.
//!
//! A quotation is rendered as:
//!
//! ```html
//! <aside class="quote" data-post="3" data-topic="12" data-full="true">
//!   <div class="title">
//!     <div class="quote-controls"></div>
//!     alice said:
//!   </div>
//!   <blockquote>excerpt</blockquote>
//! </aside>
//! ```
//!
//! A quotation nested inside another one's excerpt is scanned as part of
//! the outer quotation's body (see [`QuoteDescriptor::body`]). An
//! `<aside class="quote">` without a `<blockquote>` is left as plain markup.

use super::block::{QuoteDescriptor, QuoteMarkup};
use crate::markup::{Token, matching_end, tokenize};
use post_view_content::TopicId;

const CONTROLS_OPEN: &str = "<div class=\"quote-controls\">";
const CONTROLS_CLOSE: &str = "</div>";

/// A piece of scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Markup(String),
    Quote(QuoteDescriptor),
}

/// Scanned content in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedContent {
    pub segments: Vec<Segment>,
}

impl ScannedContent {
    /// Top-level quotations, in document order
    pub fn quotes(&self) -> impl Iterator<Item = &QuoteDescriptor> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Quote(q) => Some(q),
            Segment::Markup(_) => None,
        })
    }

    /// Number of quotations, nested ones included
    pub fn quote_count(&self) -> usize {
        count_quotes(&self.segments)
    }

    /// Reassemble the scanned source
    pub fn source_html(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Markup(m) => m.clone(),
                Segment::Quote(q) => q.source_html(),
            })
            .collect()
    }
}

fn count_quotes(segments: &[Segment]) -> usize {
    segments
        .iter()
        .map(|s| match s {
            Segment::Quote(q) => 1 + count_quotes(&q.body),
            Segment::Markup(_) => 0,
        })
        .sum()
}

/// Split `html` into markup and quotation descriptors.
pub fn scan(html: &str) -> ScannedContent {
    let content = ScannedContent {
        segments: split_segments(html),
    };
    log::debug!("Scanned {} quote blocks", content.quote_count());
    content
}

fn split_segments(html: &str) -> Vec<Segment> {
    let tokens = tokenize(html);
    let mut segments = Vec::new();
    let mut last = 0;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if token.is_start("aside")
            && token.has_class("quote")
            && let Some(close) = matching_end(&tokens, i)
            && let Some(descriptor) = describe(html, &tokens, i, close)
        {
            if token.span.start > last {
                segments.push(Segment::Markup(html[last..token.span.start].to_string()));
            }
            segments.push(Segment::Quote(descriptor));
            last = tokens[close].span.end;
            i = close + 1;
            continue;
        }
        i += 1;
    }

    if last < html.len() {
        segments.push(Segment::Markup(html[last..].to_string()));
    }
    segments
}

/// First start tag in `range` satisfying `pred`.
fn find_start(
    tokens: &[Token],
    range: std::ops::Range<usize>,
    pred: impl Fn(&Token) -> bool,
) -> Option<usize> {
    range.into_iter().find(|&k| pred(&tokens[k]))
}

/// Element opened at `open` and closed before `limit`
fn element_within(tokens: &[Token], open: usize, limit: usize) -> Option<(usize, usize)> {
    matching_end(tokens, open)
        .filter(|&end| end < limit)
        .map(|end| (open, end))
}

fn describe(html: &str, tokens: &[Token], open: usize, close: usize) -> Option<QuoteDescriptor> {
    let aside = &tokens[open];
    let first_blockquote = find_start(tokens, open + 1..close, |t| t.is_start("blockquote"))?;

    let title = find_start(tokens, open + 1..first_blockquote, |t| {
        t.is_start("div") && t.has_class("title")
    })
    .and_then(|t| element_within(tokens, t, first_blockquote));

    let body_search_from = title.map_or(open + 1, |(_, end)| end + 1);
    let (bq_open, bq_close) = find_start(tokens, body_search_from..close, |t| {
        t.is_start("blockquote")
    })
    .and_then(|b| element_within(tokens, b, close))?;

    let body_start = tokens[bq_open].span.end;
    let body_end = tokens[bq_close].span.start;
    let aside_start = aside.span.start;
    let aside_end = tokens[close].span.end;

    let markup = match title {
        Some((title_open, title_close)) => {
            let controls = find_start(tokens, title_open + 1..title_close, |t| {
                t.is_start("div") && t.has_class("quote-controls")
            })
            .and_then(|c| element_within(tokens, c, title_close));

            match controls {
                Some((c_open, c_close)) => QuoteMarkup {
                    lead: html[aside_start..tokens[c_open].span.end].to_string(),
                    controls: html[tokens[c_open].span.end..tokens[c_close].span.start]
                        .to_string(),
                    middle: html[tokens[c_close].span.start..body_start].to_string(),
                    trail: html[body_end..aside_end].to_string(),
                    has_header: true,
                },
                None => {
                    // Synthesize an empty controls region at the start of the title
                    let title_content = tokens[title_open].span.end;
                    QuoteMarkup {
                        lead: format!("{}{}", &html[aside_start..title_content], CONTROLS_OPEN),
                        controls: String::new(),
                        middle: format!("{}{}", CONTROLS_CLOSE, &html[title_content..body_start]),
                        trail: html[body_end..aside_end].to_string(),
                        has_header: true,
                    }
                }
            }
        }
        None => QuoteMarkup {
            lead: html[aside_start..body_start].to_string(),
            controls: String::new(),
            middle: String::new(),
            trail: html[body_end..aside_end].to_string(),
            has_header: false,
        },
    };

    Some(QuoteDescriptor {
        referenced_post_number: parse_post_number(aside.attr("data-post")),
        referenced_topic_id: parse_topic_id(aside.attr("data-topic")),
        is_full_quote: aside
            .attr("data-full")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        body_html: html[body_start..body_end].to_string(),
        body: split_segments(&html[body_start..body_end]),
        markup,
    })
}

fn parse_post_number(value: Option<&str>) -> Option<u64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring malformed data-post attribute {:?}", raw);
            None
        }
    }
}

fn parse_topic_id(value: Option<&str>) -> Option<TopicId> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<TopicId>() {
        Ok(id) => Some(id),
        Err(_) => {
            log::warn!("Ignoring malformed data-topic attribute {:?}", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str = concat!(
        r#"<aside class="quote" data-post="3" data-topic="12">"#,
        r#"<div class="title"><div class="quote-controls"></div>alice said:</div>"#,
        r#"<blockquote><p>excerpt</p></blockquote></aside>"#
    );

    #[test]
    fn test_scan_finds_quote_and_metadata() {
        let html = format!("<p>before</p>{QUOTE}<p>after</p>");
        let content = scan(&html);
        assert_eq!(content.segments.len(), 3);
        let quote = content.quotes().next().unwrap();
        assert_eq!(quote.referenced_post_number, Some(3));
        assert_eq!(quote.referenced_topic_id, Some(TopicId(12)));
        assert!(!quote.is_full_quote);
        assert_eq!(quote.body_html, "<p>excerpt</p>");
        assert!(quote.markup.has_header);
        assert_eq!(content.source_html(), html);
    }

    #[test]
    fn test_missing_controls_region_is_synthesized() {
        let html = r#"<aside class="quote" data-post="2"><div class="title">bob:</div><blockquote>x</blockquote></aside>"#;
        let content = scan(html);
        let quote = content.quotes().next().unwrap();
        assert!(quote.markup.lead.ends_with(CONTROLS_OPEN));
        assert!(quote.markup.middle.starts_with(CONTROLS_CLOSE));
        assert_eq!(quote.body_html, "x");
    }

    #[test]
    fn test_quote_without_title_has_no_header() {
        let html = r#"<aside class="quote" data-post="2"><blockquote>x</blockquote></aside>"#;
        let content = scan(html);
        let quote = content.quotes().next().unwrap();
        assert!(!quote.markup.has_header);
        assert_eq!(content.source_html(), html);
    }

    #[test]
    fn test_aside_without_blockquote_stays_markup() {
        let html = r#"<aside class="quote" data-post="2"><div class="title">t</div></aside>"#;
        let content = scan(html);
        assert_eq!(content.quote_count(), 0);
        assert_eq!(content.segments, vec![Segment::Markup(html.to_string())]);
    }

    #[test]
    fn test_non_quote_aside_is_ignored() {
        let html = r#"<aside class="onebox"><blockquote>x</blockquote></aside>"#;
        assert_eq!(scan(html).quote_count(), 0);
    }

    #[test]
    fn test_nested_quote_is_scanned_into_outer_body() {
        let html = format!(
            r#"<aside class="quote" data-post="1"><div class="title"></div><blockquote><p>see</p>{QUOTE}</blockquote></aside>"#
        );
        let content = scan(&html);
        assert_eq!(content.quotes().count(), 1);
        assert_eq!(content.quote_count(), 2);

        let outer = content.quotes().next().unwrap();
        assert_eq!(outer.referenced_post_number, Some(1));
        assert_eq!(outer.body_html, format!("<p>see</p>{QUOTE}"));
        assert_eq!(outer.body.len(), 2);
        let Segment::Quote(inner) = &outer.body[1] else {
            panic!("expected nested quote, got {:?}", outer.body[1]);
        };
        assert_eq!(inner.referenced_post_number, Some(3));
        assert_eq!(content.source_html(), html);
    }

    #[test]
    fn test_full_flag_and_malformed_numbers() {
        let html = r#"<aside class="quote" data-post="abc" data-topic="t" data-full="TRUE"><div class="title"></div><blockquote>x</blockquote></aside>"#;
        let quote = scan(html).quotes().next().cloned().unwrap();
        assert!(quote.is_full_quote);
        assert_eq!(quote.referenced_post_number, None);
        assert_eq!(quote.referenced_topic_id, None);
    }

    #[test]
    fn test_multiple_quotes_in_order() {
        let second = QUOTE.replace("data-post=\"3\"", "data-post=\"9\"");
        let html = format!("{QUOTE}<hr>{second}");
        let numbers: Vec<Option<u64>> = scan(&html)
            .quotes()
            .map(|q| q.referenced_post_number)
            .collect();
        assert_eq!(numbers, vec![Some(3), Some(9)]);
    }

    #[test]
    fn test_quote_markup_inside_script_is_not_a_quote() {
        let html = format!("<script>document.write('{QUOTE}');</script><p>x</p>");
        let content = scan(&html);
        assert_eq!(content.quote_count(), 0);
        assert_eq!(content.source_html(), html);
    }
}
