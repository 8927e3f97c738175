//! Quote blocks: discovery in cooked HTML, header controls, and the
//! expand/collapse cycle backed by a [`ContentStore`](post_view_content::ContentStore).

pub mod block;
pub mod controller;
pub mod error;
pub mod links;
pub mod reporter;
pub mod scanner;

pub use block::{QuoteBlock, QuoteDescriptor, QuoteId, QuoteMarkup, QuoteState};
pub use controller::{
    ApplyOutcome, ClickOutcome, ClickTarget, QuoteController, QuoteEvent, ToggleOutcome,
    ViewContext,
};
pub use error::QuoteError;
pub use links::{NavLink, TopicRef, VIA_QUOTE_SLUG, resolve_nav_link};
pub use reporter::{ErrorReporter, LogReporter};
pub use scanner::{ScannedContent, Segment, scan};
