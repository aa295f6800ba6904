//! Click event model for asynchronous click accounting.

/// A successful redirect waiting to be counted.
///
/// Sent from the redirect path to
/// [`crate::domain::click_worker::run_click_worker`] through a bounded
/// channel, so the redirect never waits on the counter write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}
