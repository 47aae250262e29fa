#![forbid(unsafe_code)]

//! Per-cycle timer slots keyed by `(token, class)`.
//!
//! Two timer classes exist per fetch cycle: the absolute **deadline** and
//! the **quiet** slot shared by the debounce and grace windows. Arming a
//! class always cancels any existing timer of that class first, so no two
//! live timers of the same class can coexist for a token. Superseded cycles
//! are cancelled explicitly rather than left to fire and be ignored, which
//! bounds table growth over long sessions.
//!
//! The table does not spawn threads or own a clock. The embedding loop (or
//! the test simulator) polls [`drain_due`](TimerTable::drain_due) with the
//! current instant and can sleep until [`next_deadline`](TimerTable::next_deadline).

use std::time::Instant;

use feedgate_core::FetchToken;

/// Timer classes, at most one live timer each per fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerClass {
    /// Absolute worst-case deadline, armed once at fetch start.
    Deadline,
    /// Shared slot for the debounce and grace windows.
    Quiet,
}

impl TimerClass {
    /// Stable string representation for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Quiet => "quiet",
        }
    }
}

/// Which window the quiet slot is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuietPhase {
    /// Short quiet-period detector, re-armed on every arrival.
    Debounce,
    /// Longer low-confidence fallback, armed after a thin debounce fire.
    Grace,
}

impl QuietPhase {
    /// Stable string representation for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debounce => "debounce",
            Self::Grace => "grace",
        }
    }
}

/// A timer that has reached its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    /// Cycle the timer was armed for.
    pub token: FetchToken,
    /// Class of the fired timer.
    pub class: TimerClass,
    /// Quiet phase, present iff `class == Quiet`.
    pub phase: Option<QuietPhase>,
    /// The instant the timer was due.
    pub due: Instant,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    token: FetchToken,
    class: TimerClass,
    phase: Option<QuietPhase>,
    due: Instant,
}

/// Armed-timer table for the orchestrator.
///
/// Holds at most two entries per fetch cycle, and in practice only entries
/// for the current cycle, so a linear scan is cheaper than any keyed map.
#[derive(Debug, Default)]
pub struct TimerTable {
    entries: Vec<TimerEntry>,
}

impl TimerTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the absolute deadline for `token`, replacing any existing one.
    pub fn arm_deadline(&mut self, token: FetchToken, due: Instant) {
        self.cancel(token, TimerClass::Deadline);
        self.entries.push(TimerEntry {
            token,
            class: TimerClass::Deadline,
            phase: None,
            due,
        });
    }

    /// Arm the quiet slot for `token` in the given phase, replacing any
    /// existing quiet timer (debounce re-arms and debounce-to-grace
    /// promotion both land here).
    pub fn arm_quiet(&mut self, token: FetchToken, phase: QuietPhase, due: Instant) {
        self.cancel(token, TimerClass::Quiet);
        self.entries.push(TimerEntry {
            token,
            class: TimerClass::Quiet,
            phase: Some(phase),
            due,
        });
    }

    /// Cancel the timer of `class` for `token`, if armed.
    pub fn cancel(&mut self, token: FetchToken, class: TimerClass) {
        self.entries
            .retain(|e| !(e.token == token && e.class == class));
    }

    /// Cancel every timer armed for `token`.
    pub fn cancel_all(&mut self, token: FetchToken) {
        self.entries.retain(|e| e.token != token);
    }

    /// Remove and return all timers due at or before `now`, ordered by
    /// deadline (deadline class first on ties, so the outer bound wins
    /// deterministically).
    pub fn drain_due(&mut self, now: Instant) -> Vec<TimerFire> {
        let mut due: Vec<TimerEntry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.due, e.class != TimerClass::Deadline));
        due.into_iter()
            .map(|e| TimerFire {
                token: e.token,
                class: e.class,
                phase: e.phase,
                due: e.due,
            })
            .collect()
    }

    /// Earliest armed deadline, if any timer is live.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Quiet phase currently armed for `token`, if any.
    #[must_use]
    pub fn quiet_phase(&self, token: FetchToken) -> Option<QuietPhase> {
        self.entries
            .iter()
            .find(|e| e.token == token && e.class == TimerClass::Quiet)
            .and_then(|e| e.phase)
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedgate_core::FetchSequencer;
    use std::time::Duration;

    fn token_pair() -> (FetchToken, FetchToken) {
        let mut seq = FetchSequencer::new();
        (seq.begin_cycle(), seq.begin_cycle())
    }

    #[test]
    fn arm_replaces_same_class_timer() {
        let (t, _) = token_pair();
        let now = Instant::now();
        let mut table = TimerTable::new();

        table.arm_quiet(t, QuietPhase::Debounce, now + Duration::from_millis(500));
        table.arm_quiet(t, QuietPhase::Debounce, now + Duration::from_millis(900));

        assert_eq!(table.len(), 1);
        assert_eq!(table.next_deadline(), Some(now + Duration::from_millis(900)));
    }

    #[test]
    fn grace_replaces_debounce_in_quiet_slot() {
        let (t, _) = token_pair();
        let now = Instant::now();
        let mut table = TimerTable::new();

        table.arm_quiet(t, QuietPhase::Debounce, now + Duration::from_millis(500));
        table.arm_quiet(t, QuietPhase::Grace, now + Duration::from_millis(2000));

        assert_eq!(table.len(), 1);
        assert_eq!(table.quiet_phase(t), Some(QuietPhase::Grace));
    }

    #[test]
    fn deadline_and_quiet_coexist() {
        let (t, _) = token_pair();
        let now = Instant::now();
        let mut table = TimerTable::new();

        table.arm_deadline(t, now + Duration::from_secs(8));
        table.arm_quiet(t, QuietPhase::Debounce, now + Duration::from_millis(500));

        assert_eq!(table.len(), 2);
        assert_eq!(table.next_deadline(), Some(now + Duration::from_millis(500)));
    }

    #[test]
    fn drain_due_returns_only_elapsed_timers_in_order() {
        let (t, _) = token_pair();
        let now = Instant::now();
        let mut table = TimerTable::new();

        table.arm_deadline(t, now + Duration::from_millis(100));
        table.arm_quiet(t, QuietPhase::Debounce, now + Duration::from_millis(50));

        let fires = table.drain_due(now + Duration::from_millis(60));
        assert_eq!(fires.len(), 1);
        assert_eq!(fires[0].class, TimerClass::Quiet);
        assert_eq!(fires[0].phase, Some(QuietPhase::Debounce));
        assert_eq!(table.len(), 1);

        let fires = table.drain_due(now + Duration::from_millis(200));
        assert_eq!(fires.len(), 1);
        assert_eq!(fires[0].class, TimerClass::Deadline);
        assert!(table.is_empty());
    }

    #[test]
    fn drain_due_tie_breaks_deadline_first() {
        let (t, _) = token_pair();
        let now = Instant::now();
        let due = now + Duration::from_millis(100);
        let mut table = TimerTable::new();

        table.arm_quiet(t, QuietPhase::Grace, due);
        table.arm_deadline(t, due);

        let fires = table.drain_due(due);
        assert_eq!(fires.len(), 2);
        assert_eq!(fires[0].class, TimerClass::Deadline);
        assert_eq!(fires[1].class, TimerClass::Quiet);
    }

    #[test]
    fn cancel_all_clears_one_cycle_only() {
        let (old, new) = token_pair();
        let now = Instant::now();
        let mut table = TimerTable::new();

        table.arm_deadline(old, now + Duration::from_secs(8));
        table.arm_quiet(old, QuietPhase::Debounce, now + Duration::from_millis(500));
        table.arm_deadline(new, now + Duration::from_secs(8));

        table.cancel_all(old);
        assert_eq!(table.len(), 1);

        let fires = table.drain_due(now + Duration::from_secs(10));
        assert!(fires.iter().all(|f| f.token == new));
    }

    #[test]
    fn empty_table_has_no_deadline() {
        let table = TimerTable::new();
        assert_eq!(table.next_deadline(), None);
        assert!(table.is_empty());
    }
}
