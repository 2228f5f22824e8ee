//! Frames bundle a timestamp with the view state that produced it.
//!
//! A [`Frame`] is stamped once by whichever component first accepts a batch of
//! changes and is then passed down unchanged to every dependent, so that
//! concurrent, independently-timed updates can be matched against a single
//! causal point. The [`FrameClock`] is the shared stamping authority: one
//! clock per scene, handed to the source registry and every manager.

use crate::model::time::TimeStamp;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The view-side state a representation is computed against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Crosshair position in scene coordinates.
    pub crosshair: [f64; 3],
    /// Scene resolution (spacing per axis).
    pub resolution: [f64; 3],
    /// Scene bounds as `[x_min, x_max, y_min, y_max, z_min, z_max]`.
    pub bounds: [f64; 6],
}

impl ViewState {
    pub fn with_crosshair(mut self, crosshair: [f64; 3]) -> Self {
        self.crosshair = crosshair;
        self
    }

    pub fn with_resolution(mut self, resolution: [f64; 3]) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_bounds(mut self, bounds: [f64; 6]) -> Self {
        self.bounds = bounds;
        self
    }
}

/// Immutable snapshot of a timestamp plus the view state that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: TimeStamp,
    pub state: ViewState,
}

/// Frames are shared, never copied per dependent.
pub type FrameRef = Arc<Frame>;

impl Frame {
    pub fn new(time: TimeStamp, state: ViewState) -> FrameRef {
        Arc::new(Self { time, state })
    }
}

/// Shared stamping authority producing strictly increasing timestamps.
///
/// The first tick returns `t1`; [`TimeStamp::ZERO`] is never produced.
#[derive(Debug, Default)]
pub struct FrameClock {
    counter: AtomicU64,
    state: RwLock<ViewState>,
}

impl FrameClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record the latest known view state so registry-stamped frames carry
    /// current crosshair/resolution/bounds.
    pub fn set_view_state(&self, state: ViewState) {
        *self.state.write() = state;
    }

    pub fn view_state(&self) -> ViewState {
        *self.state.read()
    }

    /// Produce the next timestamp.
    pub fn tick(&self) -> TimeStamp {
        TimeStamp::from_raw(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently produced timestamp, or [`TimeStamp::ZERO`] if the
    /// clock has never ticked.
    pub fn last(&self) -> TimeStamp {
        TimeStamp::from_raw(self.counter.load(Ordering::SeqCst))
    }

    /// Stamp a new frame carrying the clock's current view state.
    pub fn stamp(&self) -> FrameRef {
        Arc::new(Frame {
            time: self.tick(),
            state: self.view_state(),
        })
    }

    /// Record `state` and stamp a new frame carrying it.
    pub fn stamp_with(&self, state: ViewState) -> FrameRef {
        self.set_view_state(state);
        Arc::new(Frame {
            time: self.tick(),
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_ticks_are_strictly_increasing() {
        let clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(a < b);
        assert_eq!(a, TimeStamp::from_raw(1));
    }

    #[test]
    fn test_clock_never_produces_zero() {
        let clock = FrameClock::new();
        assert_eq!(clock.last(), TimeStamp::ZERO);
        assert!(clock.tick() > TimeStamp::ZERO);
    }

    #[test]
    fn test_stamp_carries_recorded_state() {
        let clock = FrameClock::new();
        let state = ViewState::default().with_crosshair([1.0, 2.0, 3.0]);
        clock.set_view_state(state);
        let frame = clock.stamp();
        assert_eq!(frame.state, state);
        assert_eq!(frame.time, clock.last());
    }

    #[test]
    fn test_stamp_with_overrides_state() {
        let clock = FrameClock::new();
        let state = ViewState::default().with_bounds([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let frame = clock.stamp_with(state);
        assert_eq!(frame.state, state);
        assert_eq!(clock.view_state(), state);
    }
}
