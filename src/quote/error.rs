use super::block::QuoteId;
use post_view_content::{ContentError, TopicId};
use thiserror::Error;

/// Failures surfaced by the quote controller.
#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    /// The id belongs to content that has since been replaced, or never existed
    #[error("quote block {0} does not exist in the current content")]
    UnknownBlock(QuoteId),

    /// The quoted post could not be fetched; the block keeps its placeholder
    #[error("failed to load quoted post {post_number} of topic {topic_id}: {source}")]
    FetchFailure {
        topic_id: TopicId,
        post_number: u64,
        #[source]
        source: ContentError,
    },
}
