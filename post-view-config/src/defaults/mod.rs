//! Default value functions for configuration.
//!
//! Each sub-module groups related `default_*` free functions used as
//! `#[serde(default = "crate::defaults::...")]` attributes on `Config` fields.

mod content;
mod labels;

// ── Content store ──────────────────────────────────────────────────────────
pub use content::{base_url, max_response_bytes, timeout_secs};

// ── Display labels ─────────────────────────────────────────────────────────
pub use labels::{clicks, expand_collapse, follow_quote, loading, select, selected};

/// Path prefix prepended to every generated forum URL.
pub fn base_path() -> String {
    String::new()
}

/// CSS class applied to the span wrapping a highlighted excerpt.
pub fn highlight_class() -> String {
    "highlighted".to_string()
}
