// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the commit.
//!
//! [`CommitSink`] has one method per event the commit (and the animation
//! event dispatch that follows it) emits. Every method defaults to a no-op, so
//! a sink implements only what it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn CommitSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When **on**,
//! each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`DeferredPropertyEvent`] and
//!   [`DamageMergedEvent`], emitted per layer while properties are pushed.

use crate::animation::AnimationEvent;
use crate::layer::LayerKey;

#[cfg(feature = "trace-rich")]
use crate::animation::TargetProperty;
#[cfg(feature = "trace-rich")]
use kurbo::Rect;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted before any layer of a commit is pushed.
#[derive(Clone, Copy, Debug)]
pub struct CommitBeginEvent {
    /// Monotonic commit counter (first commit is 1).
    pub commit_index: u64,
    /// Id of the root being committed.
    pub root: LayerKey,
}

/// Emitted after the commit finished pushing.
#[derive(Clone, Copy, Debug)]
pub struct CommitEndEvent {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Layers whose properties were pushed (masks and replicas included).
    pub layers_pushed: usize,
    /// Mirror layers created by this commit.
    pub layers_created: usize,
    /// Mirror layers dropped by this commit.
    pub layers_removed: usize,
    /// Whether the mirror structure was rebuilt.
    pub structure_rebuilt: bool,
}

/// A property push skipped because the compositor animates it.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DeferredPropertyEvent {
    /// Commit counter.
    pub commit_index: u64,
    /// The layer whose property was left alone.
    pub layer: LayerKey,
    /// Which property.
    pub property: TargetProperty,
}

/// Pending damage merged into a mirror layer.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DamageMergedEvent {
    /// Commit counter.
    pub commit_index: u64,
    /// The layer that carried damage.
    pub layer: LayerKey,
    /// The rect pushed from the main side.
    pub pushed: Rect,
    /// The mirror's update rect after the merge.
    pub merged: Rect,
}

// ---------------------------------------------------------------------------
// CommitSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the commit.
///
/// All methods have default no-op implementations.
pub trait CommitSink {
    /// Called when a commit starts.
    fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
        _ = e;
    }

    /// Called when a commit ends.
    fn on_commit_end(&mut self, e: &CommitEndEvent) {
        _ = e;
    }

    /// Called for each compositor animation event delivered to the main side.
    fn on_animation_event(&mut self, e: &AnimationEvent) {
        _ = e;
    }

    /// Called when an animated property is not pushed (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_property_deferred(&mut self, e: &DeferredPropertyEvent) {
        _ = e;
    }

    /// Called when damage is merged into a mirror (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_damage_merged(&mut self, e: &DamageMergedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`CommitSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl CommitSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`CommitSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn CommitSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn CommitSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn CommitSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`CommitBeginEvent`].
    #[inline]
    pub fn commit_begin(&mut self, e: &CommitBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitEndEvent`].
    #[inline]
    pub fn commit_end(&mut self, e: &CommitEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationEvent`].
    #[inline]
    pub fn animation_event(&mut self, e: &AnimationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animation_event(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DeferredPropertyEvent`] (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn property_deferred(&mut self, e: &DeferredPropertyEvent) {
        if let Some(s) = &mut self.sink {
            s.on_property_deferred(e);
        }
    }

    /// Emits a [`DamageMergedEvent`] (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_merged(&mut self, e: &DamageMergedEvent) {
        if let Some(s) = &mut self.sink {
            s.on_damage_merged(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> CommitBeginEvent {
        CommitBeginEvent {
            commit_index: 3,
            root: LayerKey(1),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_commit_begin(&sample_begin());
        sink.on_commit_end(&CommitEndEvent {
            commit_index: 3,
            layers_pushed: 0,
            layers_created: 0,
            layers_removed: 0,
            structure_rebuilt: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.commit_begin(&sample_begin());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            commits: Vec<u64>,
        }
        impl CommitSink for RecordingSink {
            fn on_commit_begin(&mut self, e: &CommitBeginEvent) {
                self.commits.push(e.commit_index);
            }
        }

        let mut sink = RecordingSink {
            commits: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.commit_begin(&sample_begin());
        drop(tracer);
        assert_eq!(sink.commits, &[3]);
    }
}
