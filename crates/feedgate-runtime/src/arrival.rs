#![forbid(unsafe_code)]

//! Arrival counting and the debounce/settle state machine.
//!
//! The tracker counts text items and pending image loads for the active
//! fetch cycle and decides when arrivals have *settled*. Three timers
//! compose into one monotonic decision:
//!
//! 1. Every item arrival re-arms the short **debounce** window; as long as
//!    items keep landing faster than the window, no settle decision fires.
//! 2. A debounce fire with fewer items than the confidence threshold arms
//!    the longer **grace** window instead of settling; when that fires,
//!    settlement is forced regardless of count. This distinguishes "a burst
//!    is still arriving" from "this feed genuinely has few items" without
//!    flickering or waiting out the full deadline.
//! 3. The **absolute deadline**, armed once at fetch start, forces a settle
//!    only if something has arrived; an empty cycle is reported as a
//!    network stall instead of ever revealing a blank view.
//!
//! Entry points take an explicit `now: Instant` and return a
//! [`TrackerAction`] for the controller to execute, keeping the state
//! machine deterministic and free of side effects on collaborators.
//!
//! # Invariants
//!
//! - `pending_image_count` never goes negative: decrements clamp at zero and
//!   an underflow is logged as a warning, not an error.
//! - Events carrying a superseded token never mutate state.
//! - After a cycle settles, further arrivals only increment counters; they
//!   never re-arm timers or reopen the settle decision.

use std::time::Instant;

use feedgate_core::FetchToken;

use crate::config::SettleConfig;
use crate::decision_log::DecisionLog;
use crate::timer_table::{QuietPhase, TimerClass, TimerFire, TimerTable};

/// Per-cycle arrival bookkeeping.
#[derive(Debug, Clone)]
pub struct ArrivalState {
    /// Whether at least one text item has materialized.
    pub items_populated: bool,
    /// Running count of materialized text items.
    pub item_count: u64,
    /// Image loads started but not yet finished. Never negative.
    pub pending_image_count: u32,
    /// Whether the hero (visually prioritized) image has finished loading.
    pub hero_image_loaded: bool,
    /// When the cycle began.
    pub started_at: Instant,
    /// Item count captured at the settle decision, once made.
    pub settled_item_count: Option<u64>,
}

impl ArrivalState {
    fn new(started_at: Instant) -> Self {
        Self {
            items_populated: false,
            item_count: 0,
            pending_image_count: 0,
            hero_image_loaded: false,
            started_at,
            settled_item_count: None,
        }
    }
}

/// What the controller should do after a tracker entry point ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerAction {
    /// Nothing to do.
    None,
    /// Ask the reveal gate to evaluate with the given settled count.
    Evaluate {
        /// Item count to hand to the layout policy.
        settled_count: u64,
        /// Whether a fallback timer (grace or deadline) forced this.
        forced: bool,
    },
    /// The absolute deadline elapsed with no arrivals at all.
    NetworkStall,
}

/// Arrival tracker for the active fetch cycle.
///
/// Owns the timer table and the decision log; one instance serves the whole
/// session, with [`begin`](ArrivalTracker::begin) resetting it per cycle.
#[derive(Debug)]
pub struct ArrivalTracker {
    config: SettleConfig,
    token: Option<FetchToken>,
    state: Option<ArrivalState>,
    settled: bool,
    timers: TimerTable,
    decisions: DecisionLog,
}

impl ArrivalTracker {
    /// Create a tracker with the given timing configuration.
    #[must_use]
    pub fn new(config: SettleConfig) -> Self {
        let decisions = DecisionLog::new(config.enable_logging);
        Self {
            config,
            token: None,
            state: None,
            settled: false,
            timers: TimerTable::new(),
            decisions,
        }
    }

    /// Reset state for a new cycle and arm its absolute deadline.
    ///
    /// Timers belonging to the superseded cycle are cancelled explicitly,
    /// not merely left to fire stale.
    pub fn begin(&mut self, token: FetchToken, now: Instant) {
        if let Some(old) = self.token.take() {
            self.timers.cancel_all(old);
        }
        self.token = Some(token);
        self.state = Some(ArrivalState::new(now));
        self.settled = false;
        self.timers
            .arm_deadline(token, now + self.config.absolute_deadline);
        self.decisions.begin_cycle(now);
        self.log(token, now, "arm_deadline", false);
        tracing::debug!(token = token.get(), "fetch cycle began");
    }

    /// A text item materialized on the presentable surface.
    ///
    /// Re-arms the debounce window unless the cycle has already settled;
    /// post-settle arrivals only increment the counter.
    pub fn record_item_arrived(&mut self, token: FetchToken, now: Instant) -> TrackerAction {
        let Some(state) = self.state_for(token) else {
            return TrackerAction::None;
        };
        state.items_populated = true;
        state.item_count += 1;
        if self.settled {
            return TrackerAction::None;
        }
        self.timers
            .arm_quiet(token, QuietPhase::Debounce, now + self.config.debounce);
        self.log(token, now, "rearm_debounce", false);
        TrackerAction::None
    }

    /// An image load began for the cycle.
    pub fn record_image_load_started(&mut self, token: FetchToken, _now: Instant) -> TrackerAction {
        let Some(state) = self.state_for(token) else {
            return TrackerAction::None;
        };
        state.pending_image_count += 1;
        TrackerAction::None
    }

    /// An image load finished for the cycle.
    ///
    /// When the last pending image lands and items are populated, the gate
    /// is asked to evaluate immediately: images may finish after the
    /// debounce window already fired on text items alone.
    pub fn record_image_load_finished(
        &mut self,
        token: FetchToken,
        was_hero: bool,
        now: Instant,
    ) -> TrackerAction {
        let Some(state) = self.state_for(token) else {
            return TrackerAction::None;
        };
        if state.pending_image_count == 0 {
            tracing::warn!(
                token = token.get(),
                "image finish with no pending loads; counter clamped at zero"
            );
        } else {
            state.pending_image_count -= 1;
        }
        if was_hero {
            state.hero_image_loaded = true;
        }
        if state.items_populated && state.pending_image_count == 0 {
            let count = state.item_count;
            self.log(token, now, "images_drained", false);
            return TrackerAction::Evaluate {
                settled_count: count,
                forced: false,
            };
        }
        TrackerAction::None
    }

    /// Route a fired timer through the settle state machine.
    pub fn on_timer_fire(&mut self, fire: TimerFire, now: Instant) -> TrackerAction {
        if self.token != Some(fire.token) {
            tracing::trace!(token = fire.token.get(), class = fire.class.as_str(), "stale timer dropped");
            return TrackerAction::None;
        }
        match (fire.class, fire.phase) {
            (TimerClass::Quiet, Some(QuietPhase::Debounce)) => self.on_debounce_fire(fire.token, now),
            (TimerClass::Quiet, Some(QuietPhase::Grace)) => {
                self.settle(fire.token, now, true, "forced_settle")
            }
            (TimerClass::Deadline, _) => self.on_deadline_fire(fire.token, now),
            // A quiet fire without a phase cannot be armed; treat as spurious.
            (TimerClass::Quiet, None) => TrackerAction::None,
        }
    }

    fn on_debounce_fire(&mut self, token: FetchToken, now: Instant) -> TrackerAction {
        let count = self.state.as_ref().map(|s| s.item_count).unwrap_or(0);
        if count >= self.config.min_confident_items {
            return self.settle(token, now, false, "settle");
        }
        // Too few items to be confident the feed is this small; give it one
        // longer window before forcing.
        self.timers
            .arm_quiet(token, QuietPhase::Grace, now + self.config.grace);
        self.log(token, now, "arm_grace", false);
        tracing::debug!(
            token = token.get(),
            item_count = count,
            threshold = self.config.min_confident_items,
            "debounce fired below confidence threshold; grace armed"
        );
        TrackerAction::None
    }

    fn on_deadline_fire(&mut self, token: FetchToken, now: Instant) -> TrackerAction {
        let populated = self.state.as_ref().is_some_and(|s| s.items_populated);
        if populated {
            return self.settle(token, now, true, "forced_settle");
        }
        // Nothing ever arrived; never reveal a blank view. The failure path
        // is the collaborator's to display.
        self.timers.cancel_all(token);
        self.log(token, now, "network_stall", true);
        tracing::warn!(token = token.get(), "absolute deadline with no arrivals");
        TrackerAction::NetworkStall
    }

    fn settle(
        &mut self,
        token: FetchToken,
        now: Instant,
        forced: bool,
        action: &'static str,
    ) -> TrackerAction {
        if self.settled {
            return TrackerAction::None;
        }
        self.settled = true;
        let count = match self.state.as_mut() {
            Some(state) => {
                state.settled_item_count = Some(state.item_count);
                state.item_count
            }
            None => 0,
        };
        self.timers.cancel(token, TimerClass::Quiet);
        self.log(token, now, action, forced);
        tracing::debug!(token = token.get(), settled_count = count, forced, "cycle settled");
        TrackerAction::Evaluate {
            settled_count: count,
            forced,
        }
    }

    /// Mark the settle decision final after a reveal and drop every timer
    /// still armed for the cycle (transitions are terminal-and-clean).
    pub fn finalize(&mut self, token: FetchToken) {
        if self.token != Some(token) {
            return;
        }
        self.settled = true;
        if let Some(state) = self.state.as_mut()
            && state.settled_item_count.is_none()
        {
            state.settled_item_count = Some(state.item_count);
        }
        self.timers.cancel_all(token);
    }

    /// Tear down without starting a new cycle.
    pub fn shutdown(&mut self) {
        if let Some(token) = self.token.take() {
            self.timers.cancel_all(token);
        }
        self.state = None;
        self.settled = false;
    }

    /// Remove and return all timers due at or before `now`.
    pub fn drain_due(&mut self, now: Instant) -> Vec<TimerFire> {
        self.timers.drain_due(now)
    }

    /// Earliest armed timer deadline, for precise event-loop sleeps.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Current-cycle arrival state, if a cycle is active.
    #[must_use]
    pub fn state(&self) -> Option<&ArrivalState> {
        self.state.as_ref()
    }

    /// Whether the current cycle has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Item count captured at the settle decision.
    #[must_use]
    pub fn settled_item_count(&self) -> Option<u64> {
        self.state.as_ref().and_then(|s| s.settled_item_count)
    }

    /// The decision log.
    #[must_use]
    pub fn decisions(&self) -> &DecisionLog {
        &self.decisions
    }

    pub(crate) fn decisions_mut(&mut self) -> &mut DecisionLog {
        &mut self.decisions
    }

    fn state_for(&mut self, token: FetchToken) -> Option<&mut ArrivalState> {
        if self.token != Some(token) {
            tracing::trace!(token = token.get(), "stale arrival dropped");
            return None;
        }
        self.state.as_mut()
    }

    fn log(&mut self, token: FetchToken, now: Instant, action: &'static str, forced: bool) {
        let (items, pending) = self
            .state
            .as_ref()
            .map(|s| (s.item_count, s.pending_image_count))
            .unwrap_or((0, 0));
        self.decisions.record(token, now, action, items, pending, forced);
    }
}
