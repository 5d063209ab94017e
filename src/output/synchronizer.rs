//! Pushes the [`InputState`] into a [`VirtualSink`] once per tick
//!
//! Every publish is a full resync: sticks, triggers and the state of every
//! button in [`LogicalButton::ALL`] are written and committed with a single
//! flush, so the virtual pad cannot drift from the state even if an
//! intermediate update was lost.

use crate::controller::input_state::InputState;
use crate::controller::shaping::{apply_deadzone, clamp_axis, clamp_trigger, DEFAULT_DEADZONE};
use crate::mapping::{LogicalButton, TriggerSide};
use crate::output::sink::{SinkError, StickSide, VirtualSink};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Rate limiter for periodic diagnostics
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Minimum time between two permitted events
    min_interval: Duration,

    /// Time of the last permitted event
    last_event_time: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_event_time: None,
        }
    }

    /// Returns true at most once per interval; the first call always passes
    pub fn should_process(&mut self) -> bool {
        let now = Instant::now();
        match self.last_event_time {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_event_time = Some(now);
                true
            }
        }
    }
}

/// Sticks as they are sent to the sink, after deadzone and clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredSticks {
    pub left: (f32, f32),
    pub right: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct OutputSynchronizer {
    deadzone: f32,
    diagnostics: RateLimiter,
}

impl Default for OutputSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_DEADZONE, Duration::from_millis(500))
    }
}

impl OutputSynchronizer {
    pub fn new(deadzone: f32, diagnostic_interval: Duration) -> Self {
        Self {
            deadzone,
            diagnostics: RateLimiter::new(diagnostic_interval),
        }
    }

    pub fn filter_sticks(&self, state: &InputState) -> FilteredSticks {
        let shape = |v: f32| clamp_axis(apply_deadzone(v, self.deadzone));
        FilteredSticks {
            left: (shape(state.left_stick.x), shape(state.left_stick.y)),
            right: (shape(state.right_stick.x), shape(state.right_stick.y)),
        }
    }

    /// Writes the complete state and commits it
    ///
    /// The first failing sink call aborts the publish; the caller decides
    /// what to do with the error, the next tick resends everything anyway.
    pub fn publish(
        &mut self,
        state: &InputState,
        sink: &mut dyn VirtualSink,
    ) -> Result<(), SinkError> {
        let sticks = self.filter_sticks(state);

        sink.set_stick(StickSide::Left, sticks.left.0, sticks.left.1)?;
        sink.set_stick(StickSide::Right, sticks.right.0, sticks.right.1)?;

        if self.diagnostics.should_process() {
            debug!(
                "Left stick: x={:.2}, y={:.2} | Right stick: x={:.2}, y={:.2}",
                sticks.left.0, sticks.left.1, sticks.right.0, sticks.right.1
            );
        }

        sink.set_trigger(TriggerSide::Left, clamp_trigger(state.left_trigger))?;
        sink.set_trigger(TriggerSide::Right, clamp_trigger(state.right_trigger))?;

        for button in LogicalButton::ALL {
            sink.set_button(button, state.is_pressed(button))?;
        }

        sink.flush()
    }
}
