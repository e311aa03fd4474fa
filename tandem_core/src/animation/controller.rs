// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer animation bookkeeping, on either side of the commit.

use alloc::vec::Vec;

use crate::layer::LayerKey;
use crate::transform::Transform3d;

use super::curve::AnimationCurve;
use super::event::{AnimationEvent, AnimationEventKind};
use super::model::{Animation, RunState, TargetProperty};

/// Property values produced by one [`AnimationController::animate`] tick.
///
/// `None` means no animation currently drives the property.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimatedValues {
    /// Animated opacity.
    pub opacity: Option<f32>,
    /// Animated transform.
    pub transform: Option<Transform3d>,
}

/// The animations attached to one layer.
///
/// The main-side controller is authoritative for which animations exist and
/// whether they are paused. The compositor-side copy is authoritative for
/// start and finish times. [`push_animation_updates_to`] reconciles the two at
/// commit time.
///
/// [`push_animation_updates_to`]: Self::push_animation_updates_to
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationController {
    owner: Option<LayerKey>,
    animations: Vec<Animation>,
    force_sync: bool,
}

impl AnimationController {
    /// Creates an unbound controller with no animations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller bound to the layer with id `owner`.
    #[must_use]
    pub fn for_layer(owner: LayerKey) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// The layer this controller reports events for.
    #[must_use]
    pub fn owner(&self) -> Option<LayerKey> {
        self.owner
    }

    /// Binds the controller to a layer (or unbinds it).
    pub fn set_owner(&mut self, owner: Option<LayerKey>) {
        self.owner = owner;
    }

    /// All animations, finished ones included.
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Looks up an animation by id and property.
    #[must_use]
    pub fn animation(&self, id: u32, property: TargetProperty) -> Option<&Animation> {
        self.animations
            .iter()
            .find(|a| a.id() == id && a.target_property() == property)
    }

    /// Adds an animation.
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Removes every animation with `id`. Returns whether any was removed.
    pub fn remove_animation(&mut self, id: u32) -> bool {
        let before = self.animations.len();
        self.animations.retain(|a| a.id() != id);
        self.animations.len() != before
    }

    /// Pauses every animation with `id` at `time_offset` after its start.
    pub fn pause_animation(&mut self, id: u32, time_offset: f64) {
        for anim in self.animations.iter_mut().filter(|a| a.id() == id) {
            anim.pause(time_offset);
        }
    }

    /// Pauses every unfinished animation at `monotonic_time`.
    pub fn suspend_animations(&mut self, monotonic_time: f64) {
        for anim in self.animations.iter_mut().filter(|a| !a.is_finished()) {
            anim.set_run_state(RunState::Paused, monotonic_time);
        }
    }

    /// Resumes every paused animation at `monotonic_time`.
    pub fn resume_animations(&mut self, monotonic_time: f64) {
        for anim in &mut self.animations {
            if anim.run_state() == RunState::Paused {
                anim.set_run_state(RunState::Running, monotonic_time);
            }
        }
    }

    /// `true` if an unfinished animation targets `property`.
    ///
    /// Waiting animations count: the compositor may start them at any tick.
    #[must_use]
    pub fn is_animating_property(&self, property: TargetProperty) -> bool {
        self.animations
            .iter()
            .any(|a| a.target_property() == property && !a.is_finished())
    }

    /// `true` if any animation is unfinished.
    #[must_use]
    pub fn has_active_animation(&self) -> bool {
        self.animations.iter().any(|a| !a.is_finished())
    }

    /// Whether the next push replaces the other side's animations wholesale.
    #[must_use]
    pub fn force_sync(&self) -> bool {
        self.force_sync
    }

    /// Requests a wholesale replacement on the next push.
    pub fn set_force_sync(&mut self) {
        self.force_sync = true;
    }

    /// Pushes this controller's state into `other`.
    ///
    /// With force-sync pending, `other`'s animations are replaced by a copy of
    /// this controller's and the flag is cleared. Otherwise animations removed
    /// here are purged from `other`, pause state is synchronized, and
    /// unfinished animations `other` has not seen are copied over.
    pub fn push_animation_updates_to(&mut self, other: &mut Self) {
        if self.force_sync {
            other.animations.clone_from(&self.animations);
            self.force_sync = false;
            return;
        }

        other.animations.retain(|theirs| {
            self.animation(theirs.id(), theirs.target_property())
                .is_some()
        });
        for ours in &self.animations {
            let property = ours.target_property();
            match other
                .animations
                .iter_mut()
                .find(|a| a.id() == ours.id() && a.target_property() == property)
            {
                Some(theirs) => ours.push_properties_to(theirs),
                None if !ours.is_finished() => other.animations.push(ours.clone()),
                None => {}
            }
        }
    }

    /// Ticks every animation to `monotonic_time`.
    ///
    /// Waiting animations whose property is free start and stamp their start
    /// time. Running animations that used up their iterations finish and stay
    /// in the list in the `Finished` state until the main side drops them.
    /// Lifecycle changes are appended to `events`. An unbound controller does
    /// nothing.
    pub fn animate(
        &mut self,
        monotonic_time: f64,
        events: &mut Vec<AnimationEvent>,
    ) -> AnimatedValues {
        let mut values = AnimatedValues::default();
        let Some(layer) = self.owner else {
            return values;
        };

        for i in 0..self.animations.len() {
            if self.animations[i].run_state() != RunState::WaitingForTargetAvailability {
                continue;
            }
            let property = self.animations[i].target_property();
            let blocked = self.animations.iter().any(|a| {
                a.target_property() == property
                    && matches!(a.run_state(), RunState::Running | RunState::Paused)
            });
            if blocked {
                continue;
            }
            let anim = &mut self.animations[i];
            if anim.start_time().is_none() {
                anim.set_start_time(monotonic_time);
            }
            anim.set_run_state(RunState::Running, monotonic_time);
            events.push(event(layer, anim, AnimationEventKind::Started, monotonic_time));
        }

        for anim in &mut self.animations {
            if !matches!(anim.run_state(), RunState::Running | RunState::Paused) {
                continue;
            }
            if anim.is_finished_at(monotonic_time) {
                anim.set_run_state(RunState::Finished, monotonic_time);
                events.push(event(layer, anim, AnimationEventKind::Finished, monotonic_time));
                continue;
            }
            let t = anim.trimmed_time(monotonic_time);
            match anim.curve() {
                AnimationCurve::Opacity(curve) => {
                    if let Some(v) = curve.value_at(t) {
                        values.opacity = Some(v);
                    }
                }
                AnimationCurve::Transform(curve) => {
                    if let Some(v) = curve.value_at(t) {
                        values.transform = Some(v);
                    }
                }
            }
        }

        values
    }

    /// Drops finished and aborted animations.
    pub fn purge_finished(&mut self) {
        self.animations.retain(|a| !a.is_finished());
    }

    /// Applies a compositor `Started` event: stamps the start time if unset
    /// and marks a waiting animation running.
    pub fn notify_animation_started(&mut self, e: &AnimationEvent) {
        if let Some(anim) = self
            .animations
            .iter_mut()
            .find(|a| a.id() == e.animation_id && a.target_property() == e.property)
        {
            if anim.start_time().is_none() {
                anim.set_start_time(e.monotonic_time);
            }
            if anim.run_state() == RunState::WaitingForTargetAvailability {
                anim.set_run_state(RunState::Running, e.monotonic_time);
            }
        }
    }

    /// Applies a compositor `Finished` event by removing the animation.
    ///
    /// Returns whether a matching animation was found.
    pub fn notify_animation_finished(&mut self, e: &AnimationEvent) -> bool {
        let before = self.animations.len();
        self.animations
            .retain(|a| !(a.id() == e.animation_id && a.target_property() == e.property));
        self.animations.len() != before
    }
}

fn event(
    layer: LayerKey,
    anim: &Animation,
    kind: AnimationEventKind,
    monotonic_time: f64,
) -> AnimationEvent {
    AnimationEvent {
        kind,
        layer,
        animation_id: anim.id(),
        group: anim.group(),
        property: anim.target_property(),
        monotonic_time,
    }
}
