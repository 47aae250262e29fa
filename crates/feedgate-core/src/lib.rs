#![forbid(unsafe_code)]

//! Feedgate Core
//!
//! Leaf types shared by the Feedgate orchestration runtime: fetch-cycle
//! tokens, backend category kinds, layout modes, and the cross-cutting
//! layout-hold flag.
//!
//! # Key Components
//!
//! - [`FetchSequencer`] / [`FetchToken`] - monotonic fetch-cycle identity
//! - [`CategoryKind`] - tagged backend variant consumed by layout policy
//! - [`LayoutMode`] - per-cycle rendering strategy, committed at reveal
//! - [`LayoutHold`] - sticky, externally-owned reveal backpressure flag
//!
//! # Role in Feedgate
//! `feedgate-core` has no orchestration logic of its own. It exists so that
//! embedders (presenters, content sources, layout negotiators) can speak the
//! same vocabulary as `feedgate-runtime` without depending on it.

pub mod category;
pub mod layout_hold;
pub mod sequencer;

pub use category::{CategoryKind, LayoutMode};
pub use layout_hold::LayoutHold;
pub use sequencer::{FetchSequencer, FetchToken};
