//! Quote expansion controller.
//!
//! Owns every [`QuoteBlock`] of one post's content and drives the
//! expand/collapse cycle:
//!
//! ```text
//! Collapsed --toggle--> Expanding --fetch ok--> Expanded --toggle--> Collapsed
//!                           |
//!                           +--fetch failed--> Expanding (placeholder stays)
//! ```
//!
//! All state is mutated on the owner's thread. Fetches run as spawned tokio
//! tasks and post their outcome back over an unbounded channel; the owner
//! applies them with [`QuoteController::process_pending`] or
//! [`QuoteController::settle_next`]. A result is applied only if the block
//! is still waiting for that exact request, so a collapse (or a newer
//! expansion, or a content replacement) silently supersedes it.
//!
//! Quotations nested in an excerpt are blocks of their own. Expanding the
//! enclosing block destroys them along with the excerpt; collapsing it
//! scans the restored excerpt into fresh blocks.

use super::block::{QuoteBlock, QuoteId, QuoteState, Slot};
use super::error::QuoteError;
use super::links::{NavLink, TopicRef, resolve_nav_link};
use super::reporter::ErrorReporter;
use super::scanner::{Segment, scan};
use crate::markup::{highlight_first, plain_text};
use post_view_config::Config;
use post_view_content::{ContentError, ContentStore, TopicId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The post whose content holds the quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    /// Topic currently being viewed, if any; drives same-topic links
    pub topic: Option<TopicRef>,
    /// Topic the post belongs to; used to fetch quotes without a topic
    pub post_topic_id: TopicId,
}

impl ViewContext {
    /// A post viewed inside its own topic
    pub fn in_topic(topic: TopicRef) -> Self {
        Self {
            post_topic_id: topic.id,
            topic: Some(topic),
        }
    }
}

/// Outcome of a fetch, posted back to the owner.
#[derive(Debug)]
pub struct QuoteEvent {
    pub id: QuoteId,
    pub generation: u64,
    pub result: Result<String, ContentError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Full quote, no post number or no handler bound; nothing changed
    Ignored,
    /// Placeholder shown and a fetch started
    Expanding,
    /// Snapshot restored
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Fetched post shown; `highlighted` is false on a highlight miss
    Expanded { highlighted: bool },
    /// Fetch failed and was reported; placeholder remains
    Failed,
    /// Result no longer wanted and dropped
    Stale,
}

/// What part of a quote header was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The navigation link
    Link,
    /// Anywhere else on the header
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Follow the link; the block is untouched
    Navigate(String),
    Toggled(ToggleOutcome),
}

/// Quote expansion controller for one post's content.
pub struct QuoteController<S: ContentStore> {
    store: Arc<S>,
    reporter: Arc<dyn ErrorReporter>,
    config: Arc<Config>,
    context: ViewContext,
    /// Bumped on each content replacement; ids carry it
    epoch: u64,
    slots: Vec<Slot>,
    /// Every block of this epoch, destroyed ones included
    blocks: Vec<QuoteBlock>,
    /// Spawned fetches whose outcome has not been received yet
    in_flight: usize,
    events_tx: mpsc::UnboundedSender<QuoteEvent>,
    events_rx: mpsc::UnboundedReceiver<QuoteEvent>,
}

impl<S: ContentStore> QuoteController<S> {
    /// Create a controller with no content.
    ///
    /// # Arguments
    /// * `store` - Resolves quoted posts.
    /// * `reporter` - Receives fetch failures.
    /// * `config` - Labels, base path and highlight class.
    /// * `context` - The post the quotes live in.
    pub fn new(
        store: Arc<S>,
        reporter: Arc<dyn ErrorReporter>,
        config: Arc<Config>,
        context: ViewContext,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store,
            reporter,
            config,
            context,
            epoch: 0,
            slots: Vec::new(),
            blocks: Vec::new(),
            in_flight: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    /// Change the viewing context and re-render every attached header.
    pub fn set_context(&mut self, context: ViewContext) {
        self.context = context;
        for id in self.quote_ids() {
            if self.blocks[id.index].controls_attached {
                self.render_controls(id.index);
            }
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace the post's content.
    ///
    /// Every existing block is destroyed, including any in-flight fetch
    /// interest; the new content is scanned into fresh blocks.
    pub fn replace_content(&mut self, html: &str) -> Vec<QuoteId> {
        self.epoch += 1;
        self.blocks.clear();
        self.slots = self.build_slots(scan(html).segments, None);

        let ids = self.quote_ids();
        log::info!(
            "Post content replaced (render {}): {} quote blocks",
            self.epoch,
            ids.len()
        );
        ids
    }

    /// Turn scanned segments into slots, creating a block per quotation
    /// (nested ones included) under `parent`.
    fn build_slots(&mut self, segments: Vec<Segment>, parent: Option<QuoteId>) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Markup(markup) => slots.push(Slot::Markup(markup)),
                Segment::Quote(mut descriptor) => {
                    let body = std::mem::take(&mut descriptor.body);
                    let id = QuoteId {
                        epoch: self.epoch,
                        index: self.blocks.len(),
                    };
                    self.blocks
                        .push(QuoteBlock::from_descriptor(id, parent, descriptor));
                    let body_slots = self.build_slots(body, Some(id));
                    self.blocks[id.index].body_slots = Some(body_slots);
                    slots.push(Slot::Quote(id.index));
                }
            }
        }
        slots
    }

    /// Ids of the live blocks, outer quotes before the quotes they contain.
    pub fn quote_ids(&self) -> Vec<QuoteId> {
        let mut ids = Vec::new();
        self.collect_ids(&self.slots, &mut ids);
        ids
    }

    fn collect_ids(&self, slots: &[Slot], ids: &mut Vec<QuoteId>) {
        for slot in slots {
            if let Slot::Quote(index) = slot {
                let block = &self.blocks[*index];
                ids.push(block.id);
                if let Some(body) = &block.body_slots {
                    self.collect_ids(body, ids);
                }
            }
        }
    }

    /// The live blocks in document order.
    pub fn blocks(&self) -> Vec<&QuoteBlock> {
        self.quote_ids()
            .into_iter()
            .map(|id| &self.blocks[id.index])
            .collect()
    }

    pub fn block(&self, id: QuoteId) -> Option<&QuoteBlock> {
        self.index_of(id).map(|i| &self.blocks[i])
    }

    fn index_of(&self, id: QuoteId) -> Option<usize> {
        (id.epoch == self.epoch
            && id.index < self.blocks.len()
            && !self.blocks[id.index].destroyed)
            .then_some(id.index)
    }

    fn require(&self, id: QuoteId) -> Result<usize, QuoteError> {
        self.index_of(id).ok_or(QuoteError::UnknownBlock(id))
    }

    /// The content as markup, reflecting every block's current state.
    pub fn render(&self) -> String {
        self.render_slots(&self.slots)
    }

    fn render_slots(&self, slots: &[Slot]) -> String {
        slots
            .iter()
            .map(|slot| match slot {
                Slot::Markup(m) => m.clone(),
                Slot::Quote(index) => self.blocks[*index].render(),
            })
            .collect()
    }

    /// Re-render the excerpts enclosing a block after it changed.
    fn propagate(&mut self, index: usize) {
        let mut current = self.blocks[index].parent;
        while let Some(parent) = current {
            if let Some(slots) = &self.blocks[parent.index].body_slots {
                let body = self.render_slots(slots);
                self.blocks[parent.index].body_html = body;
            }
            current = self.blocks[parent.index].parent;
        }
    }

    // =========================================================================
    // Header controls
    // =========================================================================

    /// Header link for a block, re-evaluated against the current context.
    pub fn nav_link(&self, id: QuoteId) -> Result<Option<NavLink>, QuoteError> {
        let block = &self.blocks[self.require(id)?];
        Ok(resolve_nav_link(
            block.referenced_post_number,
            block.referenced_topic_id,
            self.context.topic.as_ref(),
            &self.config,
        ))
    }

    fn render_controls(&mut self, index: usize) {
        let block = &self.blocks[index];
        if !block.markup.has_header {
            return;
        }

        let mut html = String::new();
        if !block.is_full_quote {
            let direction = if block.expanded() { "up" } else { "down" };
            html.push_str(&format!(
                "<i class=\"icon-chevron-{}\" title=\"{}\"></i>",
                direction,
                html_escape::encode_double_quoted_attribute(&self.config.labels.expand_collapse)
            ));
        }
        if let Some(link) = resolve_nav_link(
            block.referenced_post_number,
            block.referenced_topic_id,
            self.context.topic.as_ref(),
            &self.config,
        ) {
            html.push_str(&link.to_html(&self.config.labels.follow_quote));
        }

        self.blocks[index].controls_html = html;
        self.propagate(index);
    }

    /// Render a block's header controls and bind its interaction handler.
    ///
    /// Safe to call on every render pass: the header is re-rendered each
    /// time but the handler is bound at most once per block. Returns whether
    /// a handler was newly bound.
    pub fn attach(&mut self, id: QuoteId) -> Result<bool, QuoteError> {
        let index = self.require(id)?;
        self.render_controls(index);

        let block = &mut self.blocks[index];
        if block.controls_attached || !block.is_interactive() {
            return Ok(false);
        }
        block.controls_attached = true;
        log::debug!("Quote controls attached to block {}", id);
        Ok(true)
    }

    /// Attach every block of the current content, nested ones included.
    /// Returns how many handlers were newly bound.
    pub fn attach_all(&mut self) -> usize {
        self.quote_ids()
            .into_iter()
            .filter(|&id| matches!(self.attach(id), Ok(true)))
            .count()
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Dispatch a click on a block's header.
    pub fn click_header(
        &mut self,
        id: QuoteId,
        target: ClickTarget,
    ) -> Result<ClickOutcome, QuoteError> {
        if target == ClickTarget::Link
            && let Some(link) = self.nav_link(id)?
        {
            return Ok(ClickOutcome::Navigate(link.href().to_string()));
        }
        self.toggle(id).map(ClickOutcome::Toggled)
    }

    /// Flip a block between collapsed and expanded.
    ///
    /// Expanding starts a fetch on the tokio runtime, so this must be
    /// called from within one.
    pub fn toggle(&mut self, id: QuoteId) -> Result<ToggleOutcome, QuoteError> {
        let index = self.require(id)?;
        let block = &self.blocks[index];
        if block.is_full_quote || !block.controls_attached {
            return Ok(ToggleOutcome::Ignored);
        }
        let Some(post_number) = block.referenced_post_number else {
            return Ok(ToggleOutcome::Ignored);
        };

        if block.expanded() {
            self.collapse(index);
            Ok(ToggleOutcome::Collapsed)
        } else {
            self.expand(index, post_number);
            Ok(ToggleOutcome::Expanding)
        }
    }

    fn expand(&mut self, index: usize, post_number: u64) {
        self.blocks[index].state = QuoteState::Expanding;
        self.render_controls(index);
        self.destroy_nested(index);

        let loading = html_escape::encode_text(&self.config.labels.loading).into_owned();
        let fallback_topic = self.context.post_topic_id;
        let block = &mut self.blocks[index];

        if block.original_excerpt_html.is_none() {
            block.highlight_text = plain_text(&block.body_html).trim().to_string();
            block.original_excerpt_html = Some(std::mem::take(&mut block.body_html));
        }
        block.body_html = loading;

        block.request_generation += 1;
        let generation = block.request_generation;
        block.awaiting = Some(generation);

        let topic_id = block.referenced_topic_id.unwrap_or(fallback_topic);
        let id = block.id;

        log::debug!(
            "Expanding quote {}: fetching post {} of topic {} (request {})",
            id,
            post_number,
            topic_id,
            generation
        );

        let store = Arc::clone(&self.store);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_post(topic_id, post_number).await;
            // The controller may have been dropped; nothing to apply then
            let _ = tx.send(QuoteEvent {
                id,
                generation,
                result,
            });
        });
        self.in_flight += 1;
        self.propagate(index);
    }

    /// Destroy every block nested in a block's excerpt.
    fn destroy_nested(&mut self, index: usize) {
        let Some(slots) = self.blocks[index].body_slots.take() else {
            return;
        };
        for slot in slots {
            if let Slot::Quote(child) = slot {
                self.blocks[child].destroyed = true;
                self.blocks[child].awaiting = None;
                self.destroy_nested(child);
            }
        }
    }

    fn collapse(&mut self, index: usize) {
        let block = &mut self.blocks[index];
        block.state = QuoteState::Collapsed;
        block.awaiting = None;

        if let Some(original) = block.original_excerpt_html.clone() {
            let id = block.id;
            let bind = block.controls_attached;
            block.body_html = original.clone();

            // The restored excerpt already carries its nested headers, so
            // the recreated blocks are bound without re-rendering them
            let body_slots = self.build_slots(scan(&original).segments, Some(id));
            self.blocks[index].body_slots = Some(body_slots);
            if bind {
                self.bind_nested(index);
            }
        }

        self.render_controls(index);
        log::debug!("Collapsed quote {}", self.blocks[index].id);
    }

    fn bind_nested(&mut self, index: usize) {
        let Some(slots) = self.blocks[index].body_slots.clone() else {
            return;
        };
        for slot in slots {
            if let Slot::Quote(child) = slot {
                let block = &mut self.blocks[child];
                block.controls_attached = block.is_interactive();
                self.bind_nested(child);
            }
        }
    }

    // =========================================================================
    // Fetch results
    // =========================================================================

    /// Apply a fetch outcome if its block still wants it.
    pub fn apply_event(&mut self, event: QuoteEvent) -> ApplyOutcome {
        let Some(index) = self.index_of(event.id) else {
            log::debug!("Dropping result for destroyed quote {}", event.id);
            return ApplyOutcome::Stale;
        };

        let highlight_class = self.config.highlight_class.clone();
        let fallback_topic = self.context.post_topic_id;
        let block = &mut self.blocks[index];
        if !block.expanded() || block.awaiting != Some(event.generation) {
            log::debug!(
                "Dropping stale result for quote {} (request {})",
                event.id,
                event.generation
            );
            return ApplyOutcome::Stale;
        }
        block.awaiting = None;

        match event.result {
            Ok(cooked) => {
                let highlighted = highlight_first(&cooked, &block.highlight_text, &highlight_class);
                if !highlighted.matched {
                    log::debug!("Excerpt not found verbatim in quote {}", event.id);
                }
                block.body_html = highlighted.html;
                block.state = QuoteState::Expanded;
                self.propagate(index);
                ApplyOutcome::Expanded {
                    highlighted: highlighted.matched,
                }
            }
            Err(source) => {
                let error = QuoteError::FetchFailure {
                    topic_id: block.referenced_topic_id.unwrap_or(fallback_topic),
                    post_number: block.referenced_post_number.unwrap_or_default(),
                    source,
                };
                self.reporter.report(&error);
                ApplyOutcome::Failed
            }
        }
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn process_pending(&mut self) -> Vec<ApplyOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(self.apply_event(event));
        }
        outcomes
    }

    /// Wait for the next outcome and apply it.
    ///
    /// Returns `None` at once when no fetch is in flight.
    pub async fn settle_next(&mut self) -> Option<ApplyOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.events_rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(self.apply_event(event))
    }

    /// Spawned fetches whose outcome has not been received, stale ones
    /// included
    pub fn fetches_in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether any live block is waiting on a fetch
    pub fn has_pending_fetches(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| !b.destroyed && b.awaiting.is_some())
    }
}
