#![forbid(unsafe_code)]

//! Fetch-cycle tokens and the sequencer that mints them.
//!
//! Every fetch cycle is identified by a [`FetchToken`]. Starting a new cycle
//! supersedes the previous token permanently: any asynchronous completion
//! (item arrival, image finish, timer fire) tagged with a stale token must be
//! treated as a no-op by whoever receives it. [`FetchSequencer::is_current`]
//! is the single source of truth for that check.
//!
//! # How it works
//!
//! 1. `begin_cycle()` allocates a token strictly greater than all prior ones
//! 2. Collaborators carry the token through their async boundaries
//! 3. On completion delivery, `is_current(token)` gates every mutation
//! 4. Teardown calls `invalidate()`, leaving no current token at all
//!
//! Cancellation is label-based, not preemptive: in-flight work for an old
//! cycle is left to finish, its completions simply stop mattering.

use std::fmt;

/// Identifier for one fetch cycle.
///
/// Opaque and strictly increasing. Tokens are `Copy` and cheap to tag onto
/// timers and callbacks; equality against the sequencer's current token is
/// the only meaningful operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

impl FetchToken {
    /// Raw value, for logging and diagnostics only.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FetchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch#{}", self.0)
    }
}

/// Mints fetch-cycle tokens and tracks which one is current.
///
/// At most one token is current at any time. The sequencer runs on the
/// single orchestration context, so allocation and comparison need no
/// locking: `begin_cycle` always supersedes the prior token before any
/// collaborator can act on the new one.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    next: u64,
    current: Option<FetchToken>,
}

impl FetchSequencer {
    /// Create a sequencer with no current cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch cycle, superseding any prior one.
    ///
    /// The returned token is strictly greater than every token this
    /// sequencer has ever issued.
    pub fn begin_cycle(&mut self) -> FetchToken {
        self.next += 1;
        let token = FetchToken(self.next);
        self.current = Some(token);
        token
    }

    /// Whether `token` identifies the current cycle.
    ///
    /// A superseded token is permanently invalid; callers must drop any
    /// event carrying one without mutating shared state.
    #[must_use]
    pub fn is_current(&self, token: FetchToken) -> bool {
        self.current == Some(token)
    }

    /// The current cycle's token, if a cycle is active.
    #[must_use]
    pub fn current(&self) -> Option<FetchToken> {
        self.current
    }

    /// Tear down the current cycle without starting a new one.
    ///
    /// After this, no token is current and every outstanding completion is
    /// stale by definition.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
