#![forbid(unsafe_code)]

//! The one-way reveal gate.
//!
//! Exactly two externally visible states per fetch cycle: `Hidden` and
//! `Revealed`. The transition is terminal for a token; a new token starts
//! fresh at `Hidden`. Every settle point funnels into
//! [`evaluate`](RevealGate::evaluate), which applies the guards in order:
//!
//! 1. stale token — drop
//! 2. already revealed — idempotent no-op
//! 3. external layout negotiation pending — wait (the gate only reads the
//!    sticky [`LayoutHold`] flag, it never owns it)
//! 4. nothing populated — reject; revealing an empty view is never allowed,
//!    callers route this to an explicit no-content signal instead
//!
//! On transition the layout mode is selected from the settled count,
//! committed immutably for the cycle, and returned so the controller can
//! cancel remaining timers and notify the presenter.

use feedgate_core::{CategoryKind, FetchToken, LayoutHold, LayoutMode};

use crate::layout_policy::select_layout_mode;

/// Externally visible gate state for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Content is not yet visible.
    #[default]
    Hidden,
    /// Content has been revealed; terminal for this cycle.
    Revealed,
}

/// Outcome of one [`RevealGate::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Transitioned Hidden -> Revealed with the committed mode.
    Reveal(LayoutMode),
    /// Event carried a superseded token.
    Stale,
    /// Gate already revealed for this token; nothing changed.
    AlreadyRevealed,
    /// External layout negotiation is still pending.
    Held,
    /// Evaluation ran with nothing populated; reveal rejected.
    EmptyRejected,
}

/// Reveal gate for the active fetch cycle.
#[derive(Debug)]
pub struct RevealGate {
    token: Option<FetchToken>,
    kind: CategoryKind,
    state: GateState,
    committed: Option<LayoutMode>,
    network_failure_detected: bool,
    layout_hold: LayoutHold,
}

impl RevealGate {
    /// Create a gate reading the given layout-hold flag.
    ///
    /// The flag is shared, sticky, and owned by the external layout
    /// negotiation subsystem; `begin` deliberately does not touch it.
    #[must_use]
    pub fn new(layout_hold: LayoutHold) -> Self {
        Self {
            token: None,
            kind: CategoryKind::Aggregated,
            state: GateState::Hidden,
            committed: None,
            network_failure_detected: false,
            layout_hold,
        }
    }

    /// Reset per-cycle state for a new token. The layout-hold flag is
    /// explicitly *not* reset here.
    pub fn begin(&mut self, token: FetchToken, kind: CategoryKind) {
        self.token = Some(token);
        self.kind = kind;
        self.state = GateState::Hidden;
        self.committed = None;
        self.network_failure_detected = false;
    }

    /// Evaluate whether to reveal for `token`.
    ///
    /// Safe to call repeatedly; all guard outcomes are no-ops on gate
    /// state. On `Reveal`, the layout mode has been committed and the
    /// transition is permanent for this token.
    pub fn evaluate(
        &mut self,
        token: FetchToken,
        settled_count: u64,
        items_populated: bool,
        compact_hero_max_items: u64,
    ) -> GateDecision {
        if self.token != Some(token) {
            tracing::trace!(token = token.get(), "stale evaluate dropped");
            return GateDecision::Stale;
        }
        if self.state == GateState::Revealed {
            return GateDecision::AlreadyRevealed;
        }
        if self.layout_hold.is_held() {
            tracing::debug!(token = token.get(), "reveal deferred: layout negotiation pending");
            return GateDecision::Held;
        }
        if !items_populated {
            tracing::warn!(token = token.get(), "empty reveal rejected");
            return GateDecision::EmptyRejected;
        }

        let mode = select_layout_mode(settled_count, self.kind, compact_hero_max_items);
        self.committed = Some(mode);
        self.state = GateState::Revealed;
        tracing::info!(
            token = token.get(),
            settled_count,
            kind = self.kind.as_str(),
            mode = mode.as_str(),
            "revealed"
        );
        GateDecision::Reveal(mode)
    }

    /// Record that the cycle's deadline elapsed with no content.
    pub fn mark_network_failure(&mut self, token: FetchToken) {
        if self.token == Some(token) {
            self.network_failure_detected = true;
        }
    }

    /// Whether a network failure was detected for the current cycle.
    #[must_use]
    pub fn network_failure_detected(&self) -> bool {
        self.network_failure_detected
    }

    /// Current gate state.
    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether the current cycle has revealed.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.state == GateState::Revealed
    }

    /// Layout mode committed at reveal, if any.
    #[must_use]
    pub fn committed_mode(&self) -> Option<LayoutMode> {
        self.committed
    }

    /// Backend kind of the current cycle.
    #[must_use]
    pub fn category_kind(&self) -> CategoryKind {
        self.kind
    }
}
