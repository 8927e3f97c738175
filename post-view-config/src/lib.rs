//! Configuration system for the post-view quote expansion library.
//!
//! This crate provides configuration loading, saving, and default values:
//!
//! - Forum path prefix and highlight class
//! - Content store connection settings
//! - User-visible labels emitted into generated markup
//! - Log level for the debug log file

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{Config, ContentConfig, Labels};
pub use error::ConfigError;
pub use types::LogLevel;
