//! Content store backed by the forum's JSON endpoints.
//!
//! - `GET <base>/posts/by_number/<topic>/<post>.json` → `{"cooked": "..."}`
//! - `GET <base>/posts/by_number/<topic>/<post>/replies.json` →
//!   `[{"post_number": n, "cooked": "..."}, ...]`
//!
//! ureq is blocking, so each request runs under `spawn_blocking`.

use crate::error::ContentError;
use crate::http::{self, HttpFailure};
use crate::store::{ContentStore, ReplyPost, TopicId};
use post_view_config::ContentConfig;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PostResponse {
    cooked: String,
}

/// [`ContentStore`] that talks to a live forum over HTTP(S).
#[derive(Clone)]
pub struct HttpContentStore {
    base_url: String,
    agent: ureq::Agent,
    max_response_bytes: u64,
}

impl HttpContentStore {
    /// Build a store from configuration, validating the base URL.
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let parsed = http::validate_base_url(&config.base_url)?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        log::info!("HTTP content store at {}", base_url);
        Ok(Self {
            base_url,
            agent: http::agent(Duration::from_secs(config.timeout_secs)),
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a single post's JSON document
    pub fn post_url(&self, topic_id: TopicId, post_number: u64) -> String {
        format!(
            "{}/posts/by_number/{}/{}.json",
            self.base_url, topic_id, post_number
        )
    }

    /// URL of the replies to a post
    pub fn replies_url(&self, topic_id: TopicId, post_number: u64) -> String {
        format!(
            "{}/posts/by_number/{}/{}/replies.json",
            self.base_url, topic_id, post_number
        )
    }

    async fn get_json<T>(
        &self,
        url: String,
        topic_id: TopicId,
        post_number: u64,
    ) -> Result<T, ContentError>
    where
        T: for<'de> Deserialize<'de> + Send + 'static,
    {
        let agent = self.agent.clone();
        let limit = self.max_response_bytes;
        log::debug!("Fetching {}", url);

        tokio::task::spawn_blocking(move || {
            let bytes = http::get_bytes(&agent, &url, limit)
                .map_err(|failure| map_failure(failure, topic_id, post_number))?;
            serde_json::from_slice::<T>(&bytes).map_err(|e| ContentError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| ContentError::Transport(format!("request task failed: {e}")))?
    }
}

fn map_failure(failure: HttpFailure, topic_id: TopicId, post_number: u64) -> ContentError {
    match failure {
        HttpFailure::Status(404) => ContentError::NotFound {
            topic_id,
            post_number,
        },
        HttpFailure::Status(401) | HttpFailure::Status(403) => ContentError::Forbidden {
            topic_id,
            post_number,
        },
        HttpFailure::Status(code) => ContentError::Transport(format!("HTTP status {code}")),
        HttpFailure::Transport(msg) => ContentError::Transport(msg),
    }
}

impl ContentStore for HttpContentStore {
    fn fetch_post(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<String, ContentError>> + Send {
        let url = self.post_url(topic_id, post_number);
        async move {
            let post: PostResponse = self.get_json(url, topic_id, post_number).await?;
            Ok(post.cooked)
        }
    }

    fn fetch_replies(
        &self,
        topic_id: TopicId,
        post_number: u64,
    ) -> impl Future<Output = Result<Vec<ReplyPost>, ContentError>> + Send {
        let url = self.replies_url(topic_id, post_number);
        async move {
            let mut replies: Vec<ReplyPost> = self.get_json(url, topic_id, post_number).await?;
            replies.sort_by_key(|r| r.post_number);
            Ok(replies)
        }
    }
}
