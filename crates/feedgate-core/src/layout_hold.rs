#![forbid(unsafe_code)]

//! Cross-cutting layout-hold flag.
//!
//! An external layout negotiation (sidebar visibility, adaptive breakpoint
//! resolution) can ask the reveal gate to wait until it has finished. That
//! readiness is a property of the whole UI, not of one fetch cycle, so the
//! flag is deliberately *sticky across fetch boundaries*: it is only ever
//! cleared explicitly by its owner, never implicitly reset when a new fetch
//! begins.
//!
//! Ownership contract: the external subsystem holds a clone and calls
//! [`hold`](LayoutHold::hold) / [`release`](LayoutHold::release); the reveal
//! gate holds a clone and only ever reads [`is_held`](LayoutHold::is_held).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, sticky "layout negotiation pending" flag.
///
/// Clones share one underlying flag. Reads and writes are relaxed-ordering
/// atomics; the orchestration context observes the flag at discrete event
/// deliveries, so no cross-write ordering is required.
#[derive(Debug, Clone, Default)]
pub struct LayoutHold {
    held: Arc<AtomicBool>,
}

impl LayoutHold {
    /// Create a released flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the external layout negotiation as pending.
    pub fn hold(&self) {
        self.held.store(true, Ordering::Relaxed);
    }

    /// Mark the external layout negotiation as complete.
    pub fn release(&self) {
        self.held.store(false, Ordering::Relaxed);
    }

    /// Whether a negotiation is still pending.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }
}
