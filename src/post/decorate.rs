//! Markup hooks run when a post's content is loaded.

use std::sync::Arc;

/// Rewrites a post's cooked HTML before its quote blocks are scanned.
///
/// Decorators run in the order they were added, after link badges. Quote
/// blocks they leave in the markup still get controls.
pub trait ContentDecorator: Send + Sync {
    fn decorate(&self, html: &str) -> String;
}

impl<F> ContentDecorator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn decorate(&self, html: &str) -> String {
        self(html)
    }
}

/// Apply decorators in order.
pub fn decorate_all(html: String, decorators: &[Arc<dyn ContentDecorator>]) -> String {
    decorators
        .iter()
        .fold(html, |html, decorator| decorator.decorate(&html))
}
