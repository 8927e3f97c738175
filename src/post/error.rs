use crate::quote::QuoteError;
use post_view_content::{ContentError, TopicId};
use thiserror::Error;

/// Failures surfaced by a post view.
#[derive(Debug, Clone, Error)]
pub enum PostViewError {
    /// The post does not reply to another post
    #[error("post {post_number} has no parent post")]
    NoParent { post_number: u64 },

    #[error("failed to load parent post {post_number} of topic {topic_id}: {source}")]
    ParentFetch {
        topic_id: TopicId,
        post_number: u64,
        #[source]
        source: ContentError,
    },

    #[error("failed to load replies to post {post_number} of topic {topic_id}: {source}")]
    RepliesFetch {
        topic_id: TopicId,
        post_number: u64,
        #[source]
        source: ContentError,
    },

    #[error(transparent)]
    Quote(#[from] QuoteError),
}
