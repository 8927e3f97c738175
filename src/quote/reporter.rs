//! Shared error-reporting path for non-fatal quote failures.

use super::error::QuoteError;

/// Receives failures that are contained at the block level.
///
/// Injected into the controller so embedders can route failures to their
/// own notification surface.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &QuoteError);
}

/// Reporter that writes failures to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &QuoteError) {
        log::error!("{error}");
    }
}
