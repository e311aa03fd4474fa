// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single animation and its run-state bookkeeping.

use super::curve::AnimationCurve;

/// A layer property that can be driven by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetProperty {
    /// Layer opacity.
    Opacity,
    /// Layer transform.
    Transform,
}

/// Lifecycle of an [`Animation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Waiting for another animation of the same property to finish.
    WaitingForTargetAvailability,
    /// Ticking.
    Running,
    /// Frozen at the time it was paused.
    Paused,
    /// Ran all of its iterations.
    Finished,
    /// Stopped before completion.
    Aborted,
}

/// One animation of one property.
///
/// Times are monotonic seconds. `start_time` is stamped by whichever side
/// starts the animation (normally the compositor) and reported to the other
/// side through an [`AnimationEvent`](super::AnimationEvent).
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    id: u32,
    group: u32,
    curve: AnimationCurve,
    iterations: Option<u32>,
    run_state: RunState,
    start_time: Option<f64>,
    pause_time: f64,
    total_paused_time: f64,
    time_offset: f64,
}

impl Animation {
    /// Creates a single-iteration animation waiting to start.
    #[must_use]
    pub fn new(id: u32, group: u32, curve: AnimationCurve) -> Self {
        Self {
            id,
            group,
            curve,
            iterations: Some(1),
            run_state: RunState::WaitingForTargetAvailability,
            start_time: None,
            pause_time: 0.0,
            total_paused_time: 0.0,
            time_offset: 0.0,
        }
    }

    /// Sets the iteration count. `None` repeats forever.
    #[must_use]
    pub fn with_iterations(mut self, iterations: Option<u32>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Starts the animation this far into its first iteration.
    #[must_use]
    pub fn with_time_offset(mut self, offset: f64) -> Self {
        self.time_offset = offset;
        self
    }

    /// Animation id. Ids are chosen by the caller and shared by both sides.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Group id. Animations of one group start together.
    #[must_use]
    pub fn group(&self) -> u32 {
        self.group
    }

    /// The property this animation drives.
    #[must_use]
    pub fn target_property(&self) -> TargetProperty {
        self.curve.target_property()
    }

    /// The animation's curve.
    #[must_use]
    pub fn curve(&self) -> &AnimationCurve {
        &self.curve
    }

    /// Iteration count, `None` for infinite.
    #[must_use]
    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    /// Current run state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// When the animation started, if it has.
    #[must_use]
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Stamps the start time.
    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = Some(time);
    }

    /// Transitions to `state` at `monotonic_time`, keeping pause accounting.
    pub fn set_run_state(&mut self, state: RunState, monotonic_time: f64) {
        if state == RunState::Paused && self.run_state != RunState::Paused {
            self.pause_time = monotonic_time;
        } else if self.run_state == RunState::Paused && state != RunState::Paused {
            self.total_paused_time += monotonic_time - self.pause_time;
        }
        self.run_state = state;
    }

    /// Pauses `time_offset` seconds after the animation's start.
    ///
    /// An animation that has not started yet is treated as starting at zero.
    pub fn pause(&mut self, time_offset: f64) {
        let at = self.start_time.unwrap_or(0.0) + time_offset;
        self.set_run_state(RunState::Paused, at);
    }

    /// `true` once finished or aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.run_state, RunState::Finished | RunState::Aborted)
    }

    /// `true` if a running animation has used up its iterations by
    /// `monotonic_time`.
    #[must_use]
    pub fn is_finished_at(&self, monotonic_time: f64) -> bool {
        if self.is_finished() {
            return true;
        }
        let Some(iterations) = self.iterations else {
            return false;
        };
        self.run_state == RunState::Running
            && self.elapsed(monotonic_time) >= self.curve.duration() * f64::from(iterations)
    }

    /// Maps `monotonic_time` into the curve's time domain.
    ///
    /// Paused animations report the time they were paused at. The result is
    /// wrapped into one iteration, except that a finished finite animation
    /// stays at the end of its curve.
    #[must_use]
    pub fn trimmed_time(&self, monotonic_time: f64) -> f64 {
        let elapsed = self.elapsed(monotonic_time);
        let duration = self.curve.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        if let Some(iterations) = self.iterations
            && elapsed >= duration * f64::from(iterations)
        {
            return duration;
        }
        elapsed % duration
    }

    /// Copies main-side pause state into the compositor's copy.
    ///
    /// Start time and completion are owned by the compositor and are only
    /// filled in, never overwritten.
    pub fn push_properties_to(&self, other: &mut Self) {
        if self.run_state == RunState::Paused || other.run_state == RunState::Paused {
            other.run_state = self.run_state;
            other.pause_time = self.pause_time;
            other.total_paused_time = self.total_paused_time;
        }
        if other.start_time.is_none() {
            other.start_time = self.start_time;
        }
    }

    fn elapsed(&self, monotonic_time: f64) -> f64 {
        let now = if self.run_state == RunState::Paused {
            self.pause_time
        } else {
            monotonic_time
        };
        let start = self.start_time.unwrap_or(now);
        (now - start - self.total_paused_time + self.time_offset).max(0.0)
    }
}
