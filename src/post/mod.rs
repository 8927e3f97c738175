//! Post view: everything done to a post's element once it is on the page.

pub mod decorate;
pub mod error;
pub mod link_counts;
pub mod model;
pub mod read_tracking;
pub mod selection;
pub mod view;

pub use decorate::ContentDecorator;
pub use error::PostViewError;
pub use link_counts::{LinkCount, apply_link_counts};
pub use model::{Post, PostType};
pub use read_tracking::{ReadTracker, ScreenTracker};
pub use selection::{Modifiers, MultiSelect};
pub use view::{PanelToggle, ParentPost, PostView, ViewUpdate};
