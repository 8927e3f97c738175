// Library exports for the post-view binary and for embedding.
//
// Threading model:
//
//   - Quote and post view state is owned by one thread (the one rendering
//     the post) and mutated only through `&mut self`.
//   - Content fetches run as tokio tasks and report back over unbounded
//     mpsc channels; the owner applies results with `process_pending()` or
//     `settle_next().await`.
//   - `parking_lot` locks guard shared sync-only state (in-memory stores,
//     trackers, the log file).

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod markup;
pub mod post;
pub mod quote;

pub use post_view_config::Config;
pub use post_view_content::{ContentError, ContentStore, TopicId};
