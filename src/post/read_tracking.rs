//! Screen-time tracking of rendered posts.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Receives notice of posts entering and leaving the page.
pub trait ReadTracker: Send + Sync {
    /// Start tracking the element rendering `post_number`
    fn track(&self, element_id: &str, post_number: u64);

    fn stop_tracking(&self, element_id: &str);
}

/// In-memory [`ReadTracker`] keyed by element id.
#[derive(Debug, Default)]
pub struct ScreenTracker {
    tracked: Mutex<HashMap<String, u64>>,
}

impl ScreenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self, element_id: &str) -> bool {
        self.tracked.lock().contains_key(element_id)
    }

    /// Post number tracked for an element
    pub fn tracked_post(&self, element_id: &str) -> Option<u64> {
        self.tracked.lock().get(element_id).copied()
    }

    pub fn len(&self) -> usize {
        self.tracked.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.lock().is_empty()
    }
}

impl ReadTracker for ScreenTracker {
    fn track(&self, element_id: &str, post_number: u64) {
        log::trace!("Tracking {} (post {})", element_id, post_number);
        self.tracked
            .lock()
            .insert(element_id.to_string(), post_number);
    }

    fn stop_tracking(&self, element_id: &str) {
        if self.tracked.lock().remove(element_id).is_some() {
            log::trace!("Stopped tracking {}", element_id);
        }
    }
}
