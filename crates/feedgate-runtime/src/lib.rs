#![forbid(unsafe_code)]

//! Fetch-lifecycle orchestration for a feed-reading client.
//!
//! Coordinates the window between "a fetch started" and "content is shown":
//! arrivals are debounced until they settle, a one-way gate decides when the
//! view may reveal, and a layout mode is committed for the cycle. Everything
//! runs on a single orchestration context with explicit `now` instants, so
//! the whole machine is deterministic under test.
//!
//! # How it works
//!
//! 1. [`FeedController::start_fetch`] issues a fresh [`FetchToken`] that
//!    supersedes every outstanding completion.
//! 2. Arrival events re-arm a debounce window; quiet feeds fall through to a
//!    grace window, and an absolute deadline bounds the worst case.
//! 3. When arrivals settle, the [`RevealGate`] runs its guards (stale token,
//!    already revealed, layout hold, empty view) and either reveals with a
//!    committed [`LayoutMode`] or defers.
//! 4. Exactly one terminal notification per cycle crosses the [`Presenter`]
//!    boundary.
//!
//! The embedding event loop drives time by calling
//! [`FeedController::tick`] and sleeping until
//! [`FeedController::next_deadline`]. Tests drive it through
//! [`FeedSimulator`] instead, with a virtual clock.
//!
//! [`FetchToken`]: feedgate_core::FetchToken
//! [`LayoutMode`]: feedgate_core::LayoutMode

pub mod arrival;
pub mod config;
pub mod controller;
pub mod decision_log;
pub mod layout_policy;
pub mod presenter;
pub mod reveal;
pub mod simulator;
pub mod timer_table;

pub use arrival::{ArrivalState, ArrivalTracker, TrackerAction};
pub use config::SettleConfig;
pub use controller::{CycleStats, FeedController};
pub use decision_log::{DecisionEntry, DecisionLog, DecisionSummary};
pub use layout_policy::select_layout_mode;
pub use presenter::{NoContentReason, Presenter, RecordingPresenter};
pub use reveal::{GateDecision, GateState, RevealGate};
pub use simulator::FeedSimulator;
pub use timer_table::{QuietPhase, TimerClass, TimerFire, TimerTable};

pub use feedgate_core::{CategoryKind, FetchSequencer, FetchToken, LayoutHold, LayoutMode};
