//! Multi-select of posts within a topic.

use post_view_config::Labels;
use std::collections::BTreeSet;

/// Keyboard modifiers held during a mouse event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Whether these modifiers add a post to the selection on mouse-up
    pub fn selects(&self) -> bool {
        self.meta || self.ctrl
    }
}

/// Selection state shared by every post view of a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelect {
    active: bool,
    selected: BTreeSet<u64>,
}

impl MultiSelect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn multi-select on or off; turning it off clears the selection.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.selected.clear();
        }
    }

    /// Toggle a post in the selection. Returns whether it is now selected.
    pub fn toggle_post(&mut self, post_number: u64) -> bool {
        if self.selected.remove(&post_number) {
            false
        } else {
            self.selected.insert(post_number);
            true
        }
    }

    pub fn is_selected(&self, post_number: u64) -> bool {
        self.selected.contains(&post_number)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_posts(&self) -> impl Iterator<Item = u64> + '_ {
        self.selected.iter().copied()
    }

    /// Label for a post's select button
    pub fn select_text(&self, post_number: u64, labels: &Labels) -> String {
        if self.is_selected(post_number) {
            labels.selected.replace("{count}", &self.count().to_string())
        } else {
            labels.select.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_labels() {
        let labels = Labels::default();
        let mut selection = MultiSelect::new();
        selection.set_active(true);

        assert!(selection.toggle_post(4));
        assert!(selection.toggle_post(9));
        assert_eq!(selection.select_text(4, &labels), "selected (2)");
        assert_eq!(selection.select_text(5, &labels), labels.select);

        assert!(!selection.toggle_post(4));
        assert_eq!(selection.selected_posts().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn test_deactivating_clears() {
        let mut selection = MultiSelect::new();
        selection.set_active(true);
        selection.toggle_post(1);
        selection.set_active(false);
        assert_eq!(selection.count(), 0);
    }

    #[test]
    fn test_modifiers() {
        assert!(Modifiers::meta().selects());
        assert!(Modifiers::ctrl().selects());
        assert!(!Modifiers::default().selects());
    }
}
