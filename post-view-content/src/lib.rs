//! Content store abstraction for post-view.
//!
//! Provides:
//! - `store`: the [`ContentStore`] trait and [`TopicId`]
//! - `http_store`: a store backed by the forum's JSON endpoints
//! - `memory`: an in-memory store for tests and offline use
//! - `http`: agent construction and base URL validation

pub mod error;
pub mod http;
pub mod http_store;
pub mod memory;
pub mod store;

pub use error::ContentError;
pub use http_store::HttpContentStore;
pub use memory::{MemoryContentStore, StoredPost};
pub use store::{ContentStore, ReplyPost, TopicId};
