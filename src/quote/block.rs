//! Per-quote state record.
//!
//! A [`QuoteBlock`] is the source of truth for one quotation embedded in a
//! post; the markup the controller renders is a projection of it.

use super::scanner::Segment;
use post_view_content::TopicId;
use std::fmt;

/// Identifies a block within one render pass of one post's content.
///
/// Ids from an earlier pass stop resolving once the content is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuoteId {
    pub(crate) epoch: u64,
    pub(crate) index: usize,
}

impl QuoteId {
    /// Position of the block among the quotes of its render pass
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (render {})", self.index, self.epoch)
    }
}

/// Where a block is in its expand/collapse cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Showing the original excerpt
    Collapsed,
    /// Expanded, showing the loading placeholder (fetch in flight or failed)
    Expanding,
    /// Showing the fetched, highlighted post
    Expanded,
}

/// Markup surrounding the two mutable regions of a quote block.
///
/// Rendering is `lead + controls + middle + body + trail`. With the
/// original controls and body this reproduces the scanned source exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMarkup {
    /// Source up to where the controls region's content begins
    pub lead: String,
    /// Original content of the controls region
    pub controls: String,
    /// Source between the controls region and the body's content
    pub middle: String,
    /// Source from the end of the body through the closing `</aside>`
    pub trail: String,
    /// Whether the quote has a title header that can carry controls
    pub has_header: bool,
}

/// A quotation found by the scanner, before any controller state exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDescriptor {
    pub referenced_post_number: Option<u64>,
    pub referenced_topic_id: Option<TopicId>,
    pub is_full_quote: bool,
    /// Content of the `<blockquote>` as scanned
    pub body_html: String,
    /// `body_html` split around nested quotations
    pub body: Vec<Segment>,
    pub markup: QuoteMarkup,
}

impl QuoteDescriptor {
    /// The scanned source of the whole `<aside>`
    pub fn source_html(&self) -> String {
        let m = &self.markup;
        [
            m.lead.as_str(),
            m.controls.as_str(),
            m.middle.as_str(),
            self.body_html.as_str(),
            m.trail.as_str(),
        ]
        .concat()
    }
}

/// A piece of a block list: literal markup or the block at an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Markup(String),
    Quote(usize),
}

/// Live state of one quotation.
#[derive(Debug, Clone)]
pub struct QuoteBlock {
    pub(crate) id: QuoteId,
    /// Block whose excerpt contains this one
    pub(crate) parent: Option<QuoteId>,
    /// Excerpt split around nested blocks; `None` while the body shows
    /// anything other than the excerpt
    pub(crate) body_slots: Option<Vec<Slot>>,
    /// Set when an enclosing block replaced its excerpt
    pub(crate) destroyed: bool,
    pub(crate) referenced_post_number: Option<u64>,
    pub(crate) referenced_topic_id: Option<TopicId>,
    pub(crate) is_full_quote: bool,
    pub(crate) state: QuoteState,
    /// Body as of the first expansion; set once, never overwritten
    pub(crate) original_excerpt_html: Option<String>,
    pub(crate) highlight_text: String,
    pub(crate) controls_attached: bool,
    pub(crate) controls_html: String,
    pub(crate) body_html: String,
    /// Generation of the most recent fetch request
    pub(crate) request_generation: u64,
    /// Generation whose result is still wanted
    pub(crate) awaiting: Option<u64>,
    pub(crate) markup: QuoteMarkup,
}

impl QuoteBlock {
    pub(crate) fn from_descriptor(
        id: QuoteId,
        parent: Option<QuoteId>,
        descriptor: QuoteDescriptor,
    ) -> Self {
        let controls_html = descriptor.markup.controls.clone();
        Self {
            id,
            parent,
            body_slots: None,
            destroyed: false,
            referenced_post_number: descriptor.referenced_post_number,
            referenced_topic_id: descriptor.referenced_topic_id,
            is_full_quote: descriptor.is_full_quote,
            state: QuoteState::Collapsed,
            original_excerpt_html: None,
            highlight_text: String::new(),
            controls_attached: false,
            controls_html,
            body_html: descriptor.body_html,
            request_generation: 0,
            awaiting: None,
            markup: descriptor.markup,
        }
    }

    pub fn id(&self) -> QuoteId {
        self.id
    }

    /// The block whose excerpt contains this one
    pub fn parent(&self) -> Option<QuoteId> {
        self.parent
    }

    pub fn referenced_post_number(&self) -> Option<u64> {
        self.referenced_post_number
    }

    pub fn referenced_topic_id(&self) -> Option<TopicId> {
        self.referenced_topic_id
    }

    pub fn is_full_quote(&self) -> bool {
        self.is_full_quote
    }

    pub fn expanded(&self) -> bool {
        self.state != QuoteState::Collapsed
    }

    pub fn state(&self) -> QuoteState {
        self.state
    }

    pub fn original_excerpt_html(&self) -> Option<&str> {
        self.original_excerpt_html.as_deref()
    }

    pub fn highlight_text(&self) -> &str {
        &self.highlight_text
    }

    pub fn controls_attached(&self) -> bool {
        self.controls_attached
    }

    /// Current content of the header's controls region
    pub fn controls_html(&self) -> &str {
        &self.controls_html
    }

    /// Current content of the body region
    pub fn body_html(&self) -> &str {
        &self.body_html
    }

    pub fn has_header(&self) -> bool {
        self.markup.has_header
    }

    /// A fetch has been issued whose result has not arrived yet
    pub fn is_fetch_pending(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Whether a header interaction can toggle this block once attached.
    pub fn is_interactive(&self) -> bool {
        !self.is_full_quote && self.referenced_post_number.is_some() && self.markup.has_header
    }

    /// The block as markup, reflecting its current state.
    pub fn render(&self) -> String {
        let m = &self.markup;
        [
            m.lead.as_str(),
            self.controls_html.as_str(),
            m.middle.as_str(),
            self.body_html.as_str(),
            m.trail.as_str(),
        ]
        .concat()
    }
}
