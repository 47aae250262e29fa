#![forbid(unsafe_code)]

//! Settle timing configuration.
//!
//! Three independent windows govern when a fetch cycle is judged settled:
//!
//! - **Debounce** (short): restarted on every item arrival; fires only once
//!   no new item lands within the window.
//! - **Grace** (longer): armed when the debounce fires with too few items to
//!   be confident; bounds worst-case latency for legitimately small feeds.
//! - **Absolute deadline**: armed once at fetch start; the outer safety net
//!   for feeds that trickle or stall.
//!
//! The debounce/grace pair and the absolute deadline are deliberately kept
//! as independent safety nets rather than collapsed into one policy.

use std::time::Duration;

/// Timing windows and thresholds for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct SettleConfig {
    /// Quiet-period window restarted on every item arrival.
    /// Default: 500ms
    pub debounce: Duration,

    /// Fallback window armed when the debounce fires below the confidence
    /// threshold. When it fires, settlement is forced regardless of count.
    /// Default: 2000ms
    pub grace: Duration,

    /// Absolute worst-case bound, armed once at fetch start. Forces a
    /// reveal only if at least one item has arrived by then.
    /// Default: 8000ms
    pub absolute_deadline: Duration,

    /// Minimum materialized item count for a confident settle at the
    /// debounce boundary.
    /// Default: 3
    pub min_confident_items: u64,

    /// Syndicated feeds settling below this count render as hero cards.
    /// Default: 15
    pub compact_hero_max_items: u64,

    /// Enable the JSONL decision log.
    pub enable_logging: bool,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            grace: Duration::from_millis(2000),
            absolute_deadline: Duration::from_millis(8000),
            min_confident_items: 3,
            compact_hero_max_items: 15,
            enable_logging: false,
        }
    }
}

impl SettleConfig {
    /// Set the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the low-confidence grace window.
    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Set the absolute deadline.
    #[must_use]
    pub fn with_absolute_deadline(mut self, deadline: Duration) -> Self {
        self.absolute_deadline = deadline;
        self
    }

    /// Set the confident-settle item threshold.
    #[must_use]
    pub fn with_min_confident_items(mut self, count: u64) -> Self {
        self.min_confident_items = count;
        self
    }

    /// Set the compact-hero item ceiling.
    #[must_use]
    pub fn with_compact_hero_max_items(mut self, count: u64) -> Self {
        self.compact_hero_max_items = count;
        self
    }

    /// Enable or disable decision logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}
