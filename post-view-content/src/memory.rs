//! In-memory content store, used by tests and by the CLI's directory mode.

use crate::error::ContentError;
use crate::store::{ContentStore, ReplyPost, TopicId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A post held by [`MemoryContentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPost {
    pub cooked: String,
    /// Post number this post replies to, if any
    pub reply_to_post_number: Option<u64>,
}

/// [`ContentStore`] over a map of `(topic, post number)` → post.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    posts: RwLock<HashMap<(TopicId, u64), StoredPost>>,
    /// Number of `fetch_post` calls served (hits and misses)
    fetches: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a post
    pub fn insert(&self, topic_id: TopicId, post_number: u64, cooked: impl Into<String>) {
        self.insert_post(
            topic_id,
            post_number,
            StoredPost {
                cooked: cooked.into(),
                reply_to_post_number: None,
            },
        );
    }

    /// Insert a post that replies to `reply_to`
    pub fn insert_reply(
        &self,
        topic_id: TopicId,
        post_number: u64,
        reply_to: u64,
        cooked: impl Into<String>,
    ) {
        self.insert_post(
            topic_id,
            post_number,
            StoredPost {
                cooked: cooked.into(),
                reply_to_post_number: Some(reply_to),
            },
        );
    }

    pub fn insert_post(&self, topic_id: TopicId, post_number: u64, post: StoredPost) {
        self.posts.write().insert((topic_id, post_number), post);
    }

    pub fn remove(&self, topic_id: TopicId, post_number: u64) -> Option<StoredPost> {
        self.posts.write().remove(&(topic_id, post_number))
    }

    pub fn len(&self) -> usize {
        self.posts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.read().is_empty()
    }

    /// How many times `fetch_post` has been called
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Load every `<dir>/<topic id>/<post number>.html` file.
    ///
    /// Entries whose names are not numeric are skipped with a warning.
    /// Returns the number of posts loaded.
    pub fn load_dir(&self, dir: &Path) -> io::Result<usize> {
        let mut loaded = 0;
        for topic_entry in fs::read_dir(dir)? {
            let topic_entry = topic_entry?;
            if !topic_entry.file_type()?.is_dir() {
                continue;
            }
            let Some(topic_id) = topic_entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<TopicId>().ok())
            else {
                log::warn!("Skipping non-numeric topic directory {:?}", topic_entry.path());
                continue;
            };

            for post_entry in fs::read_dir(topic_entry.path())? {
                let path = post_entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let Some(post_number) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse::<u64>().ok())
                else {
                    log::warn!("Skipping non-numeric post file {:?}", path);
                    continue;
                };
                self.insert(topic_id, post_number, fs::read_to_string(&path)?);
                loaded += 1;
            }
        }
        log::info!("Loaded {} posts from {:?}", loaded, dir);
        Ok(loaded)
    }
}

impl ContentStore for MemoryContentStore {
    fn fetch_post(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<String, ContentError>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self
            .posts
            .read()
            .get(&(topic_id, post_number))
            .map(|post| post.cooked.clone())
            .ok_or(ContentError::NotFound {
                topic_id,
                post_number,
            });
        std::future::ready(result)
    }

    fn fetch_replies(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<Vec<ReplyPost>, ContentError>> + Send {
        let posts = self.posts.read();
        let result = if posts.contains_key(&(topic_id, post_number)) {
            let mut replies: Vec<ReplyPost> = posts
                .iter()
                .filter(|((topic, _), post)| {
                    *topic == topic_id && post.reply_to_post_number == Some(post_number)
                })
                .map(|((_, number), post)| ReplyPost {
                    post_number: *number,
                    cooked: post.cooked.clone(),
                })
                .collect();
            replies.sort_by_key(|r| r.post_number);
            Ok(replies)
        } else {
            Err(ContentError::NotFound {
                topic_id,
                post_number,
            })
        };
        std::future::ready(result)
    }
}
