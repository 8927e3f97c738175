//! A rendered post: quote controls, link badges, parent and replies
//! panels, read tracking and selection.

use super::decorate::{ContentDecorator, decorate_all};
use super::error::PostViewError;
use super::link_counts::apply_link_counts;
use super::model::{Post, PostType};
use super::read_tracking::ReadTracker;
use super::selection::{Modifiers, MultiSelect};
use crate::quote::{
    ApplyOutcome, ClickOutcome, ClickTarget, ErrorReporter, QuoteController, QuoteId, TopicRef,
    ViewContext,
};
use post_view_config::Config;
use post_view_content::{ContentError, ContentStore, ReplyPost};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The post a reply responds to, shown above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentPost {
    pub post_number: u64,
    pub cooked: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelToggle {
    /// Fetch started; the panel shows once it completes
    Loading,
    /// A fetch for this panel is already in flight
    Pending,
    Hidden,
}

/// A change applied while settling background work.
#[derive(Debug, Clone)]
pub enum ViewUpdate {
    Quote(ApplyOutcome),
    ParentShown,
    RepliesShown,
    /// Result arrived after the panel was closed again
    Stale,
    Failed(PostViewError),
}

#[derive(Debug)]
enum PanelEvent {
    Parent {
        generation: u64,
        post_number: u64,
        result: Result<String, ContentError>,
    },
    Replies {
        generation: u64,
        result: Result<Vec<ReplyPost>, ContentError>,
    },
}

/// View of a single post.
pub struct PostView<S: ContentStore, R: ReadTracker> {
    post: Post,
    store: Arc<S>,
    tracker: Arc<R>,
    config: Arc<Config>,
    quotes: QuoteController<S>,
    decorators: Vec<Arc<dyn ContentDecorator>>,
    inserted: bool,
    ready: bool,

    parent: Option<ParentPost>,
    parent_generation: u64,
    parent_awaiting: Option<u64>,

    replies: Vec<ReplyPost>,
    replies_shown: bool,
    replies_generation: u64,
    replies_awaiting: Option<u64>,

    /// Panel fetches whose outcome has not been received yet
    panels_in_flight: usize,
    events_tx: mpsc::UnboundedSender<PanelEvent>,
    events_rx: mpsc::UnboundedReceiver<PanelEvent>,
}

impl<S: ContentStore, R: ReadTracker> PostView<S, R> {
    /// Create a view for `post`, displayed while viewing `topic`.
    pub fn new(
        post: Post,
        topic: Option<TopicRef>,
        store: Arc<S>,
        tracker: Arc<R>,
        reporter: Arc<dyn ErrorReporter>,
        config: Arc<Config>,
    ) -> Self {
        let context = ViewContext {
            topic,
            post_topic_id: post.topic_id,
        };
        let mut quotes =
            QuoteController::new(Arc::clone(&store), reporter, Arc::clone(&config), context);
        quotes.replace_content(&post.cooked);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            post,
            store,
            tracker,
            config,
            quotes,
            decorators: Vec::new(),
            inserted: false,
            ready: false,
            parent: None,
            parent_generation: 0,
            parent_awaiting: None,
            replies: Vec::new(),
            replies_shown: false,
            replies_generation: 0,
            replies_awaiting: None,
            panels_in_flight: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn quotes(&self) -> &QuoteController<S> {
        &self.quotes
    }

    /// Add a markup hook, applied from the next content load on.
    pub fn add_decorator(&mut self, decorator: Arc<dyn ContentDecorator>) {
        self.decorators.push(decorator);
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn ContentDecorator>) -> Self {
        self.add_decorator(decorator);
        self
    }

    /// Whether the view has been inserted and decorated
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current markup of the post body
    pub fn render(&self) -> String {
        self.quotes.render()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// The view's element was added to the page.
    ///
    /// Starts read tracking, adds link badges, runs the decorators and
    /// inserts quote controls.
    pub fn did_insert_element(&mut self) {
        self.tracker
            .track(&self.post.element_id(), self.post.post_number);
        self.inserted = true;
        self.load_content();
        self.ready = true;
        log::info!(
            "Post {} inserted with {} quotes",
            self.post.post_number,
            self.quotes.quote_ids().len()
        );
    }

    /// The view's element is about to leave the page.
    pub fn will_destroy_element(&mut self) {
        self.tracker.stop_tracking(&self.post.element_id());
        self.inserted = false;
        self.ready = false;
        log::debug!("Post {} destroyed", self.post.post_number);
    }

    /// The post's cooked HTML changed. Returns the ids of the new blocks.
    pub fn set_cooked(&mut self, cooked: impl Into<String>) -> Vec<QuoteId> {
        self.post.cooked = cooked.into();
        if self.inserted {
            self.load_content()
        } else {
            self.quotes.replace_content(&self.post.cooked)
        }
    }

    fn load_content(&mut self) -> Vec<QuoteId> {
        let html = apply_link_counts(
            &self.post.cooked,
            &self.post.link_counts,
            &self.config.labels.clicks,
        );
        let html = decorate_all(html, &self.decorators);
        let ids = self.quotes.replace_content(&html);
        self.insert_quote_controls();
        ids
    }

    /// Render controls on every quote; safe to repeat after any render.
    pub fn insert_quote_controls(&mut self) -> usize {
        self.quotes.attach_all()
    }

    pub fn click_quote_header(
        &mut self,
        id: QuoteId,
        target: ClickTarget,
    ) -> Result<ClickOutcome, PostViewError> {
        Ok(self.quotes.click_header(id, target)?)
    }

    // =========================================================================
    // Parent post
    // =========================================================================

    pub fn parent_post(&self) -> Option<&ParentPost> {
        self.parent.as_ref()
    }

    pub fn is_loading_parent(&self) -> bool {
        self.parent_awaiting.is_some()
    }

    /// Show or hide the post this one replies to.
    ///
    /// Toggling while the parent is loading cancels the load.
    pub fn toggle_parent(&mut self) -> Result<PanelToggle, PostViewError> {
        if self.parent.take().is_some() || self.parent_awaiting.take().is_some() {
            return Ok(PanelToggle::Hidden);
        }
        let Some(parent_number) = self.post.reply_to_post_number else {
            return Err(PostViewError::NoParent {
                post_number: self.post.post_number,
            });
        };

        self.parent_generation += 1;
        let generation = self.parent_generation;
        self.parent_awaiting = Some(generation);

        let store = Arc::clone(&self.store);
        let tx = self.events_tx.clone();
        let topic_id = self.post.topic_id;
        tokio::spawn(async move {
            let result = store.fetch_post(topic_id, parent_number).await;
            let _ = tx.send(PanelEvent::Parent {
                generation,
                post_number: parent_number,
                result,
            });
        });
        self.panels_in_flight += 1;
        Ok(PanelToggle::Loading)
    }

    // =========================================================================
    // Replies
    // =========================================================================

    /// Replies, when the replies panel is shown
    pub fn replies(&self) -> Option<&[ReplyPost]> {
        self.replies_shown.then_some(self.replies.as_slice())
    }

    pub fn replies_hidden(&self) -> bool {
        !self.replies_shown
    }

    /// Show or hide replies to this post, loading them first when showing.
    pub fn toggle_replies(&mut self) -> PanelToggle {
        if self.replies_shown {
            self.replies_shown = false;
            return PanelToggle::Hidden;
        }
        if self.replies_awaiting.is_some() {
            return PanelToggle::Pending;
        }

        self.replies_generation += 1;
        let generation = self.replies_generation;
        self.replies_awaiting = Some(generation);

        let store = Arc::clone(&self.store);
        let tx = self.events_tx.clone();
        let (topic_id, post_number) = (self.post.topic_id, self.post.post_number);
        tokio::spawn(async move {
            let result = store.fetch_replies(topic_id, post_number).await;
            let _ = tx.send(PanelEvent::Replies { generation, result });
        });
        self.panels_in_flight += 1;
        PanelToggle::Loading
    }

    // =========================================================================
    // Background results
    // =========================================================================

    fn apply_panel_event(&mut self, event: PanelEvent) -> ViewUpdate {
        match event {
            PanelEvent::Parent {
                generation,
                post_number,
                result,
            } => {
                if self.parent_awaiting != Some(generation) {
                    log::debug!("Dropping stale parent post {}", post_number);
                    return ViewUpdate::Stale;
                }
                self.parent_awaiting = None;
                match result {
                    Ok(cooked) => {
                        self.parent = Some(ParentPost {
                            post_number,
                            cooked,
                        });
                        ViewUpdate::ParentShown
                    }
                    Err(source) => {
                        let error = PostViewError::ParentFetch {
                            topic_id: self.post.topic_id,
                            post_number,
                            source,
                        };
                        log::error!("{error}");
                        ViewUpdate::Failed(error)
                    }
                }
            }
            PanelEvent::Replies { generation, result } => {
                if self.replies_awaiting != Some(generation) {
                    return ViewUpdate::Stale;
                }
                self.replies_awaiting = None;
                match result {
                    Ok(replies) => {
                        self.replies = replies;
                        self.replies_shown = true;
                        ViewUpdate::RepliesShown
                    }
                    Err(source) => {
                        let error = PostViewError::RepliesFetch {
                            topic_id: self.post.topic_id,
                            post_number: self.post.post_number,
                            source,
                        };
                        log::error!("{error}");
                        ViewUpdate::Failed(error)
                    }
                }
            }
        }
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn process_pending(&mut self) -> Vec<ViewUpdate> {
        let mut updates: Vec<ViewUpdate> = self
            .quotes
            .process_pending()
            .into_iter()
            .map(ViewUpdate::Quote)
            .collect();
        while let Ok(event) = self.events_rx.try_recv() {
            self.panels_in_flight = self.panels_in_flight.saturating_sub(1);
            updates.push(self.apply_panel_event(event));
        }
        updates
    }

    /// Wait for the next quote or panel result and apply it.
    ///
    /// Returns `None` at once when nothing is in flight.
    pub async fn settle_next(&mut self) -> Option<ViewUpdate> {
        enum Next {
            Quote(Option<ApplyOutcome>),
            Panel(Option<PanelEvent>),
        }

        let quotes_busy = self.quotes.fetches_in_flight() > 0;
        let panels_busy = self.panels_in_flight > 0;
        if !quotes_busy && !panels_busy {
            return None;
        }

        let next = tokio::select! {
            outcome = self.quotes.settle_next(), if quotes_busy => Next::Quote(outcome),
            event = self.events_rx.recv(), if panels_busy => Next::Panel(event),
        };
        match next {
            Next::Quote(outcome) => outcome.map(ViewUpdate::Quote),
            Next::Panel(event) => {
                let event = event?;
                self.panels_in_flight = self.panels_in_flight.saturating_sub(1);
                Some(self.apply_panel_event(event))
            }
        }
    }

    // =========================================================================
    // Selection and classes
    // =========================================================================

    /// Mouse released over the post. Returns whether the selection changed.
    pub fn mouse_up(&self, selection: &mut MultiSelect, modifiers: Modifiers) -> bool {
        if selection.is_active() && modifiers.selects() {
            selection.toggle_post(self.post.post_number);
            true
        } else {
            false
        }
    }

    pub fn selected(&self, selection: &MultiSelect) -> bool {
        selection.is_selected(self.post.post_number)
    }

    pub fn select_text(&self, selection: &MultiSelect) -> String {
        selection.select_text(self.post.post_number, &self.config.labels)
    }

    /// CSS classes of the post's element
    pub fn class_names(&self, selection: &MultiSelect) -> Vec<&'static str> {
        let mut classes = vec!["topic-post", "clearfix"];
        classes.push(match self.post.post_type {
            PostType::ModeratorAction => "moderator",
            PostType::Regular => "regular",
        });
        if self.selected(selection) {
            classes.push("selected");
        }
        if self.post.hidden {
            classes.push("hidden");
        }
        if self.post.deleted {
            classes.push("deleted");
        }
        if self.parent.is_some() {
            classes.push("replies-above");
        }
        if self.ready {
            classes.push("ready");
        }
        classes
    }
}
