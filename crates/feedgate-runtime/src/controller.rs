#![forbid(unsafe_code)]

//! Fetch-lifecycle controller.
//!
//! Ties the sequencer, arrival tracker, reveal gate, and presenter together
//! into the full control flow: a fetch starts, arrivals re-arm the quiet
//! window, settle points ask the gate to evaluate, and exactly one terminal
//! outcome per cycle crosses the presenter boundary (reveal, no-content, or
//! failure).
//!
//! The controller runs on the single orchestration context. Completions
//! produced on background execution contexts must be marshalled here by the
//! embedder before calling in; every entry point validates the carried
//! token against the sequencer, so late deliveries for superseded cycles
//! are guaranteed no-ops.
//!
//! Timers never run on their own thread. The embedding event loop calls
//! [`tick`](FeedController::tick) with the current instant, sleeping until
//! [`next_deadline`](FeedController::next_deadline) between events.

use std::time::Instant;

use feedgate_core::{CategoryKind, FetchSequencer, FetchToken, LayoutHold};

use crate::arrival::{ArrivalTracker, TrackerAction};
use crate::config::SettleConfig;
use crate::decision_log::DecisionLog;
use crate::presenter::{NoContentReason, Presenter};
use crate::reveal::{GateDecision, GateState, RevealGate};

/// Snapshot of the current cycle for dashboards and tests.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Current cycle token, if a fetch is active.
    pub token: Option<FetchToken>,
    /// Gate state for the current cycle.
    pub gate: GateState,
    /// Materialized item count.
    pub item_count: u64,
    /// Image loads still pending.
    pub pending_images: u32,
    /// Whether the hero image has finished loading.
    pub hero_image_loaded: bool,
    /// Whether arrivals have settled.
    pub settled: bool,
    /// Layout mode committed at reveal, if revealed.
    pub committed_mode: Option<feedgate_core::LayoutMode>,
}

/// Orchestrates fetch cycles against a presenter.
#[derive(Debug)]
pub struct FeedController<P: Presenter> {
    config: SettleConfig,
    sequencer: FetchSequencer,
    tracker: ArrivalTracker,
    gate: RevealGate,
    presenter: P,
    layout_hold: LayoutHold,
    terminal_notified: bool,
}

impl<P: Presenter> FeedController<P> {
    /// Create a controller with the given configuration and presenter.
    #[must_use]
    pub fn new(config: SettleConfig, presenter: P) -> Self {
        let layout_hold = LayoutHold::new();
        let gate = RevealGate::new(layout_hold.clone());
        let tracker = ArrivalTracker::new(config.clone());
        Self {
            config,
            sequencer: FetchSequencer::new(),
            tracker,
            gate,
            presenter,
            layout_hold,
            terminal_notified: false,
        }
    }

    /// Start a fetch cycle for a view of `kind`, superseding any prior one.
    pub fn start_fetch(&mut self, kind: CategoryKind, now: Instant) -> FetchToken {
        let token = self.sequencer.begin_cycle();
        self.tracker.begin(token, now);
        self.gate.begin(token, kind);
        self.terminal_notified = false;
        token
    }

    /// A text item materialized for `token`.
    pub fn item_arrived(&mut self, token: FetchToken, now: Instant) {
        if !self.sequencer.is_current(token) {
            tracing::trace!(token = token.get(), "stale item arrival dropped");
            return;
        }
        let action = self.tracker.record_item_arrived(token, now);
        self.execute(action, token, now);
    }

    /// An image load started for `token`.
    pub fn image_load_started(&mut self, token: FetchToken, now: Instant) {
        if !self.sequencer.is_current(token) {
            tracing::trace!(token = token.get(), "stale image start dropped");
            return;
        }
        let action = self.tracker.record_image_load_started(token, now);
        self.execute(action, token, now);
    }

    /// An image load finished for `token`.
    pub fn image_load_finished(&mut self, token: FetchToken, was_hero: bool, now: Instant) {
        if !self.sequencer.is_current(token) {
            tracing::trace!(token = token.get(), "stale image finish dropped");
            return;
        }
        let action = self.tracker.record_image_load_finished(token, was_hero, now);
        self.execute(action, token, now);
    }

    /// Process every timer due at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        for fire in self.tracker.drain_due(now) {
            if !self.sequencer.is_current(fire.token) {
                continue;
            }
            let action = self.tracker.on_timer_fire(fire, now);
            self.execute(action, fire.token, now);
        }
    }

    /// The external layout negotiation released its hold; re-run the reveal
    /// decision for the current cycle if it had already settled.
    pub fn notify_layout_hold_released(&mut self, now: Instant) {
        let Some(token) = self.sequencer.current() else {
            return;
        };
        if !self.tracker.is_settled() || self.gate.is_revealed() {
            return;
        }
        let settled_count = self.tracker.settled_item_count().unwrap_or(0);
        self.evaluate(token, settled_count, now);
    }

    /// Tear down the current cycle without starting a new one. Every
    /// outstanding completion becomes stale; timers are cancelled.
    pub fn shutdown(&mut self) {
        self.sequencer.invalidate();
        self.tracker.shutdown();
    }

    /// Earliest armed timer deadline, for precise event-loop sleeps.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracker.next_deadline()
    }

    /// Clone of the shared layout-hold flag for the external negotiation
    /// subsystem to own.
    #[must_use]
    pub fn layout_hold(&self) -> LayoutHold {
        self.layout_hold.clone()
    }

    /// Current cycle token, if a fetch is active.
    #[must_use]
    pub fn current_token(&self) -> Option<FetchToken> {
        self.sequencer.current()
    }

    /// The presenter.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The presenter, mutably.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// The decision log.
    #[must_use]
    pub fn decisions(&self) -> &DecisionLog {
        self.tracker.decisions()
    }

    /// Snapshot of the current cycle.
    #[must_use]
    pub fn stats(&self) -> CycleStats {
        let state = self.tracker.state();
        CycleStats {
            token: self.sequencer.current(),
            gate: self.gate.state(),
            item_count: state.map(|s| s.item_count).unwrap_or(0),
            pending_images: state.map(|s| s.pending_image_count).unwrap_or(0),
            hero_image_loaded: state.map(|s| s.hero_image_loaded).unwrap_or(false),
            settled: self.tracker.is_settled(),
            committed_mode: self.gate.committed_mode(),
        }
    }

    // --- Internal methods ---

    fn execute(&mut self, action: TrackerAction, token: FetchToken, now: Instant) {
        match action {
            TrackerAction::None => {}
            TrackerAction::Evaluate { settled_count, .. } => {
                self.evaluate(token, settled_count, now);
            }
            TrackerAction::NetworkStall => {
                self.gate.mark_network_failure(token);
                // A stalled cycle is terminal. Invalidate the token so any
                // completion that straggles in afterwards is stale.
                self.sequencer.invalidate();
                if !self.terminal_notified {
                    self.terminal_notified = true;
                    self.presenter
                        .on_failure("feed did not respond before the deadline");
                }
            }
        }
    }

    fn evaluate(&mut self, token: FetchToken, settled_count: u64, now: Instant) {
        let items_populated = self
            .tracker
            .state()
            .map(|s| s.items_populated)
            .unwrap_or(false);
        let decision = self.gate.evaluate(
            token,
            settled_count,
            items_populated,
            self.config.compact_hero_max_items,
        );
        match decision {
            GateDecision::Reveal(mode) => {
                self.tracker.finalize(token);
                self.tracker
                    .decisions_mut()
                    .record(token, now, "reveal", settled_count, 0, false);
                self.terminal_notified = true;
                self.presenter.on_reveal(mode);
            }
            GateDecision::EmptyRejected => {
                self.tracker
                    .decisions_mut()
                    .record(token, now, "empty_reveal_rejected", 0, 0, false);
                if !self.terminal_notified {
                    self.terminal_notified = true;
                    self.presenter.on_no_content(NoContentReason::EmptyFeed);
                }
            }
            GateDecision::Held | GateDecision::Stale | GateDecision::AlreadyRevealed => {}
        }
    }
}
