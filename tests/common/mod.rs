//! Shared integration test helpers for post-view.
//!
//! Include with `mod common;` at the top of a test file. The
//! `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use parking_lot::Mutex;
use post_view::quote::{ErrorReporter, QuoteController, QuoteError, TopicRef, ViewContext};
use post_view_config::Config;
use post_view_content::{ContentError, ContentStore, ReplyPost, TopicId};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

/// A fetch issued to [`ManualStore`] and not yet answered.
pub struct PendingFetch {
    pub topic_id: TopicId,
    pub post_number: u64,
    responder: oneshot::Sender<Result<String, ContentError>>,
}

/// Content store whose fetches complete only when the test says so.
///
/// Lets tests interleave user actions with fetch completions in any order.
#[derive(Default)]
pub struct ManualStore {
    pending: Mutex<Vec<PendingFetch>>,
    fetches: AtomicUsize,
}

impl ManualStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Requests as `(topic, post)`, oldest first
    pub fn pending_requests(&self) -> Vec<(TopicId, u64)> {
        self.pending
            .lock()
            .iter()
            .map(|p| (p.topic_id, p.post_number))
            .collect()
    }

    /// Yield to spawned tasks until `count` fetches have been issued.
    pub async fn wait_for_fetches(&self, count: usize) {
        for _ in 0..1000 {
            if self.fetch_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {} fetches, store saw {}",
            count,
            self.fetch_count()
        );
    }

    /// Answer the oldest outstanding fetch.
    pub fn resolve_oldest(&self, result: Result<String, ContentError>) {
        let fetch = {
            let mut pending = self.pending.lock();
            assert!(!pending.is_empty(), "no outstanding fetch to resolve");
            pending.remove(0)
        };
        let _ = fetch.responder.send(result);
    }

    /// Answer the newest outstanding fetch.
    pub fn resolve_newest(&self, result: Result<String, ContentError>) {
        let fetch = self
            .pending
            .lock()
            .pop()
            .expect("no outstanding fetch to resolve");
        let _ = fetch.responder.send(result);
    }
}

impl ContentStore for ManualStore {
    fn fetch_post(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<String, ContentError>> + Send {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(PendingFetch {
            topic_id,
            post_number,
            responder: tx,
        });
        self.fetches.fetch_add(1, Ordering::SeqCst);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(ContentError::Transport("fetch abandoned".to_string())))
        }
    }

    fn fetch_replies(
        &self,
        _topic_id: TopicId,
        _post_number: u64,
    ) -> impl Future<Output = Result<Vec<ReplyPost>, ContentError>> + Send {
        std::future::ready(Ok(Vec::new()))
    }
}

/// Reporter that records every failure it receives.
#[derive(Default)]
pub struct RecordingReporter {
    errors: Mutex<Vec<QuoteError>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn errors(&self) -> Vec<QuoteError> {
        self.errors.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &QuoteError) {
        self.errors.lock().push(error.clone());
    }
}

/// Topic 1, "welcome", viewed as the current topic.
pub fn welcome_topic() -> TopicRef {
    TopicRef::new(TopicId(1), "welcome")
}

/// Controller viewing `welcome_topic()` with default config.
pub fn controller_in_welcome<S: ContentStore>(
    store: Arc<S>,
    reporter: Arc<RecordingReporter>,
) -> QuoteController<S> {
    QuoteController::new(
        store,
        reporter,
        Arc::new(Config::default()),
        ViewContext::in_topic(welcome_topic()),
    )
}

/// An excerpt quote of post `post` with an empty controls region.
pub fn excerpt_quote(post: u64, excerpt: &str) -> String {
    format!(
        concat!(
            r#"<aside class="quote" data-post="{}">"#,
            r#"<div class="title"><div class="quote-controls"></div>alice:</div>"#,
            r#"<blockquote>{}</blockquote></aside>"#
        ),
        post, excerpt
    )
}

/// Like [`excerpt_quote`] but from another topic.
pub fn cross_topic_quote(topic: u64, post: u64, excerpt: &str) -> String {
    format!(
        concat!(
            r#"<aside class="quote" data-post="{}" data-topic="{}">"#,
            r#"<div class="title"><div class="quote-controls"></div>carol:</div>"#,
            r#"<blockquote>{}</blockquote></aside>"#
        ),
        post, topic, excerpt
    )
}

/// A quote of an entire post.
pub fn full_quote(post: u64, body: &str) -> String {
    format!(
        concat!(
            r#"<aside class="quote" data-post="{}" data-full="true">"#,
            r#"<div class="title"><div class="quote-controls"></div>bob:</div>"#,
            r#"<blockquote>{}</blockquote></aside>"#
        ),
        post, body
    )
}
