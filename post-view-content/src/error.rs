//! Errors produced while resolving posts from a content store.

use crate::store::TopicId;
use thiserror::Error;

/// Why a post could not be resolved.
///
/// Opaque to the quote controller: it only reports these, never branches on
/// the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("post {post_number} in topic {topic_id} was not found")]
    NotFound { topic_id: TopicId, post_number: u64 },

    #[error("not permitted to read post {post_number} in topic {topic_id}")]
    Forbidden { topic_id: TopicId, post_number: u64 },

    /// Connection, TLS, timeout or unexpected status
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body was not the expected JSON document
    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid content store URL: {0}")]
    InvalidUrl(String),
}
