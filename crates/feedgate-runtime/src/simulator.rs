#![forbid(unsafe_code)]

//! Deterministic simulator for driving a [`FeedController`] in tests.
//!
//! Wraps a controller around a [`RecordingPresenter`] and a virtual clock.
//! Time only moves through [`advance_ms`](FeedSimulator::advance_ms), which
//! replays the embedding event loop faithfully: it steps the clock to each
//! armed timer deadline in order and ticks the controller there, rather
//! than jumping straight to the target instant. A single far-future tick
//! would deliver the debounce and grace fires at the wrong instants and
//! hide ordering bugs the real loop would hit.
//!
//! No real time passes and no threads are spawned, so scenarios spanning
//! the full eight-second deadline run in microseconds.

use std::time::{Duration, Instant};

use feedgate_core::{CategoryKind, FetchToken, LayoutHold};

use crate::config::SettleConfig;
use crate::controller::{CycleStats, FeedController};
use crate::decision_log::DecisionLog;
use crate::presenter::RecordingPresenter;

/// Virtual-clock harness around a controller.
#[derive(Debug)]
pub struct FeedSimulator {
    controller: FeedController<RecordingPresenter>,
    epoch: Instant,
    now: Instant,
}

impl FeedSimulator {
    /// Create a simulator with the given configuration.
    #[must_use]
    pub fn new(config: SettleConfig) -> Self {
        let epoch = Instant::now();
        Self {
            controller: FeedController::new(config, RecordingPresenter::new()),
            epoch,
            now: epoch,
        }
    }

    /// Simulator with default timing and the decision log enabled.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SettleConfig::default().with_logging(true))
    }

    /// Start a fetch cycle at the current virtual instant.
    pub fn start_fetch(&mut self, kind: CategoryKind) -> FetchToken {
        self.controller.start_fetch(kind, self.now)
    }

    /// Deliver one item arrival for `token`.
    pub fn arrive_item(&mut self, token: FetchToken) {
        self.controller.item_arrived(token, self.now);
    }

    /// Deliver `count` item arrivals for `token`, `gap_ms` apart, advancing
    /// the clock between them.
    pub fn arrive_items(&mut self, token: FetchToken, count: u64, gap_ms: u64) {
        for i in 0..count {
            if i > 0 {
                self.advance_ms(gap_ms);
            }
            self.arrive_item(token);
        }
    }

    /// Deliver an image-load start for `token`.
    pub fn start_image(&mut self, token: FetchToken) {
        self.controller.image_load_started(token, self.now);
    }

    /// Deliver an image-load finish for `token`.
    pub fn finish_image(&mut self, token: FetchToken, was_hero: bool) {
        self.controller.image_load_finished(token, was_hero, self.now);
    }

    /// Advance the virtual clock by `ms`, ticking the controller at every
    /// timer deadline passed along the way.
    pub fn advance_ms(&mut self, ms: u64) {
        let target = self.now + Duration::from_millis(ms);
        loop {
            match self.controller.next_deadline() {
                Some(due) if due <= target => {
                    if due > self.now {
                        self.now = due;
                    }
                    self.controller.tick(self.now);
                }
                _ => break,
            }
        }
        self.now = target;
        self.controller.tick(target);
    }

    /// Signal that the external layout negotiation released its hold.
    pub fn release_layout_hold(&mut self) {
        self.controller.layout_hold().release();
        self.controller.notify_layout_hold_released(self.now);
    }

    /// Milliseconds of virtual time elapsed since the simulator started.
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.now.duration_since(self.epoch).as_millis()
    }

    /// The recording presenter.
    #[must_use]
    pub fn presenter(&self) -> &RecordingPresenter {
        self.controller.presenter()
    }

    /// The shared layout-hold flag.
    #[must_use]
    pub fn layout_hold(&self) -> LayoutHold {
        self.controller.layout_hold()
    }

    /// Snapshot of the current cycle.
    #[must_use]
    pub fn stats(&self) -> CycleStats {
        self.controller.stats()
    }

    /// The decision log.
    #[must_use]
    pub fn decisions(&self) -> &DecisionLog {
        self.controller.decisions()
    }

    /// The wrapped controller.
    #[must_use]
    pub fn controller(&self) -> &FeedController<RecordingPresenter> {
        &self.controller
    }

    /// The wrapped controller, mutably.
    pub fn controller_mut(&mut self) -> &mut FeedController<RecordingPresenter> {
        &mut self.controller
    }
}
