//! The content store contract.

use crate::error::ContentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// Identifier of a forum topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub u64);

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TopicId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TopicId)
    }
}

impl From<u64> for TopicId {
    fn from(id: u64) -> Self {
        TopicId(id)
    }
}

/// A post that replies to another post, as returned by
/// [`ContentStore::fetch_replies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPost {
    pub post_number: u64,
    /// Rendered body HTML
    pub cooked: String,
}

/// Resolves rendered post bodies by `(topic, post number)`.
///
/// Implementations are shared read-only between every quote block of every
/// post view, so they must be `Send + Sync`. Returned futures are spawned on
/// the tokio runtime.
pub trait ContentStore: Send + Sync + 'static {
    /// Fetch the cooked (rendered) HTML body of a post.
    fn fetch_post(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<String, ContentError>> + Send;

    /// Fetch the posts that reply directly to `post_number`, in post order.
    fn fetch_replies(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<Vec<ReplyPost>, ContentError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_id_parses_trimmed_digits() {
        assert_eq!(" 42 ".parse::<TopicId>(), Ok(TopicId(42)));
        assert!("abc".parse::<TopicId>().is_err());
        assert_eq!(TopicId(7).to_string(), "7");
    }
}
