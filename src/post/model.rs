//! The post a view renders.

use super::link_counts::LinkCount;
use post_view_content::TopicId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostType {
    #[default]
    Regular,
    ModeratorAction,
}

/// A post as delivered with its topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub topic_id: TopicId,
    pub post_number: u64,
    /// Post this one replies to, if any
    pub reply_to_post_number: Option<u64>,
    /// Rendered HTML body
    pub cooked: String,
    pub link_counts: Vec<LinkCount>,
    pub post_type: PostType,
    pub hidden: bool,
    pub deleted: bool,
}

impl Post {
    pub fn new(topic_id: TopicId, post_number: u64, cooked: impl Into<String>) -> Self {
        Self {
            topic_id,
            post_number,
            reply_to_post_number: None,
            cooked: cooked.into(),
            link_counts: Vec::new(),
            post_type: PostType::Regular,
            hidden: false,
            deleted: false,
        }
    }

    pub fn with_reply_to(mut self, post_number: u64) -> Self {
        self.reply_to_post_number = Some(post_number);
        self
    }

    pub fn with_link_counts(mut self, link_counts: Vec<LinkCount>) -> Self {
        self.link_counts = link_counts;
        self
    }

    /// Id of the element the post renders into
    pub fn element_id(&self) -> String {
        format!("post_{}", self.post_number)
    }
}
