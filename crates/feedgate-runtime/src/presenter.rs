#![forbid(unsafe_code)]

//! Presenter boundary.
//!
//! The orchestrator never touches rendering primitives. All visual outcomes
//! cross this trait: exactly one terminal notification per fetch cycle
//! (reveal, no-content, or failure), delivered on the single orchestration
//! context.

use feedgate_core::LayoutMode;

/// Why a cycle ended without revealing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoContentReason {
    /// A settle decision ran with no items populated.
    EmptyFeed,
    /// The absolute deadline elapsed with no arrivals at all.
    NetworkStall,
}

impl NoContentReason {
    /// Stable string representation for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyFeed => "empty_feed",
            Self::NetworkStall => "network_stall",
        }
    }
}

/// Visual-side collaborator notified of terminal cycle outcomes.
pub trait Presenter {
    /// Content is ready; render it with the committed layout mode.
    fn on_reveal(&mut self, mode: LayoutMode);

    /// The cycle ended without content to show.
    fn on_no_content(&mut self, reason: NoContentReason);

    /// The cycle failed; surface the message through the error display.
    fn on_failure(&mut self, message: &str);
}

/// Recording presenter for tests.
///
/// Captures every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    /// Layout modes from `on_reveal`, in order.
    pub reveals: Vec<LayoutMode>,
    /// Reasons from `on_no_content`, in order.
    pub no_content: Vec<NoContentReason>,
    /// Messages from `on_failure`, in order.
    pub failures: Vec<String>,
}

impl RecordingPresenter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total notifications received.
    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.reveals.len() + self.no_content.len() + self.failures.len()
    }
}

impl Presenter for RecordingPresenter {
    fn on_reveal(&mut self, mode: LayoutMode) {
        self.reveals.push(mode);
    }

    fn on_no_content(&mut self, reason: NoContentReason) {
        self.no_content.push(reason);
    }

    fn on_failure(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}
