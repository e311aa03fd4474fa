// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding between layers and their animation controllers.

use alloc::vec::Vec;

use crate::animation::{
    Animation, AnimationController, AnimationEvent, AnimationEventKind, TargetProperty,
};
use crate::trace::Tracer;
use crate::transform::Transform3d;

use super::id::LayerId;
use super::store::LayerStore;

impl LayerStore {
    /// Adds a compositor animation to the layer.
    ///
    /// Returns `false` and changes nothing when the layer has no host or the
    /// store's settings disable accelerated animation; the caller should then
    /// animate the property itself with ordinary setters.
    pub fn add_animation(&mut self, id: LayerId, animation: Animation) -> bool {
        self.validate(id);
        if !self.settings.accelerated_animation_enabled {
            return false;
        }
        let Some(host) = self.host_at(id.idx) else {
            return false;
        };
        self.animations[id.idx as usize].add_animation(animation);
        host.did_add_animation();
        self.request_commit(id.idx);
        true
    }

    /// Removes every animation with `animation_id`.
    pub fn remove_animation(&mut self, id: LayerId, animation_id: u32) {
        self.validate(id);
        self.animations[id.idx as usize].remove_animation(animation_id);
        self.request_commit(id.idx);
    }

    /// Pauses an animation `time_offset` seconds after its start.
    pub fn pause_animation(&mut self, id: LayerId, animation_id: u32, time_offset: f64) {
        self.validate(id);
        self.animations[id.idx as usize].pause_animation(animation_id, time_offset);
        self.request_commit(id.idx);
    }

    /// Pauses every unfinished animation on the layer.
    pub fn suspend_animations(&mut self, id: LayerId, monotonic_time: f64) {
        self.validate(id);
        self.animations[id.idx as usize].suspend_animations(monotonic_time);
        self.request_commit(id.idx);
    }

    /// Resumes every paused animation on the layer.
    pub fn resume_animations(&mut self, id: LayerId, monotonic_time: f64) {
        self.validate(id);
        self.animations[id.idx as usize].resume_animations(monotonic_time);
        self.request_commit(id.idx);
    }

    /// Replaces the layer's controller wholesale.
    ///
    /// The controller is rebound to the layer and the next commit replaces the
    /// mirror's animations instead of merging into them.
    pub fn set_animation_controller(&mut self, id: LayerId, mut controller: AnimationController) {
        self.validate(id);
        controller.set_owner(Some(self.key[id.idx as usize]));
        controller.set_force_sync();
        self.animations[id.idx as usize] = controller;
        self.request_commit(id.idx);
    }

    /// Takes the layer's controller, leaving a fresh empty one behind.
    ///
    /// The returned controller is unbound.
    pub fn release_animation_controller(&mut self, id: LayerId) -> AnimationController {
        self.validate(id);
        let key = self.key[id.idx as usize];
        let mut released = core::mem::replace(
            &mut self.animations[id.idx as usize],
            AnimationController::for_layer(key),
        );
        released.set_owner(None);
        released
    }

    /// The layer's controller.
    #[must_use]
    pub fn animation_controller(&self, id: LayerId) -> &AnimationController {
        self.validate(id);
        &self.animations[id.idx as usize]
    }

    /// Whether an unfinished animation drives the layer's opacity.
    #[must_use]
    pub fn opacity_is_animating(&self, id: LayerId) -> bool {
        self.validate(id);
        self.animations[id.idx as usize].is_animating_property(TargetProperty::Opacity)
    }

    /// Whether an unfinished animation drives the layer's transform.
    #[must_use]
    pub fn transform_is_animating(&self, id: LayerId) -> bool {
        self.validate(id);
        self.animations[id.idx as usize].is_animating_property(TargetProperty::Transform)
    }

    /// Whether the layer has any unfinished animation.
    #[must_use]
    pub fn has_active_animation(&self, id: LayerId) -> bool {
        self.validate(id);
        self.animations[id.idx as usize].has_active_animation()
    }

    /// Writes an animated opacity. No commit is requested.
    pub fn set_opacity_from_animation(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.props[id.idx as usize].opacity = opacity;
    }

    /// Writes an animated transform. No commit is requested.
    pub fn set_transform_from_animation(&mut self, id: LayerId, transform: Transform3d) {
        self.validate(id);
        self.props[id.idx as usize].transform = transform;
    }

    /// Ticks every live layer's controller on the main side.
    ///
    /// Animated values are written with the `*_from_animation` setters and
    /// finished animations are dropped. Events are appended to `events`.
    pub fn animate_layers(&mut self, monotonic_time: f64, events: &mut Vec<AnimationEvent>) {
        for idx in 0..self.len {
            if !self.alive[idx as usize] {
                continue;
            }
            let controller = &mut self.animations[idx as usize];
            let values = controller.animate(monotonic_time, events);
            controller.purge_finished();
            let props = &mut self.props[idx as usize];
            if let Some(opacity) = values.opacity {
                props.opacity = opacity;
            }
            if let Some(transform) = values.transform {
                props.transform = transform;
            }
        }
    }

    /// Applies a compositor `Started` event to the layer's controller.
    pub fn notify_animation_started(&mut self, id: LayerId, event: &AnimationEvent) {
        self.validate(id);
        self.animations[id.idx as usize].notify_animation_started(event);
    }

    /// Applies a compositor `Finished` event to the layer's controller.
    ///
    /// The animation is removed, so the next commit pushes the main side's
    /// value for the property again.
    pub fn notify_animation_finished(&mut self, id: LayerId, event: &AnimationEvent) {
        self.validate(id);
        if self.animations[id.idx as usize].notify_animation_finished(event) {
            self.request_commit(id.idx);
        }
    }

    /// Routes compositor events to their layers by id.
    ///
    /// Events naming layers that no longer exist are dropped. Each delivered
    /// event is reported to `tracer`.
    pub fn dispatch_animation_events(&mut self, events: &[AnimationEvent], tracer: &mut Tracer<'_>) {
        for event in events {
            let Some(id) = self.layer_by_key(event.layer) else {
                continue;
            };
            match event.kind {
                AnimationEventKind::Started => self.notify_animation_started(id, event),
                AnimationEventKind::Finished => self.notify_animation_finished(id, event),
            }
            tracer.animation_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use super::*;
    use crate::animation::{AnimationCurve, KeyframedCurve, RunState};
    use crate::host::SimpleHost;
    use crate::settings::LayerTreeSettings;

    fn fade(id: u32) -> Animation {
        Animation::new(
            id,
            id,
            AnimationCurve::Opacity(
                KeyframedCurve::new()
                    .with_keyframe(0.0, 0.0)
                    .with_keyframe(1.0, 1.0),
            ),
        )
    }

    #[test]
    fn add_without_host_is_rejected() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        assert!(!store.add_animation(id, fade(1)));
        assert!(!store.opacity_is_animating(id));
    }

    #[test]
    fn add_with_animation_disabled_is_rejected() {
        let mut store = LayerStore::with_settings(LayerTreeSettings::without_accelerated_animation());
        let host = Rc::new(SimpleHost::new());
        let id = store.create_layer();
        store.set_host(id, &host);
        assert!(!store.add_animation(id, fade(1)));
        assert_eq!(host.commit_requests(), 0);
        assert_eq!(host.animations_added(), 0);
    }

    #[test]
    fn add_with_host_notifies_and_commits() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let id = store.create_layer();
        store.set_host(id, &host);
        assert!(store.add_animation(id, fade(1)));
        assert_eq!(host.animations_added(), 1);
        assert_eq!(host.commit_requests(), 1);
        assert!(store.opacity_is_animating(id));
        assert!(!store.transform_is_animating(id));
    }

    #[test]
    fn attaching_animated_subtree_notifies_host() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let root = store.create_layer();
        let child = store.create_layer();
        store.set_host(child, &host);
        assert!(store.add_animation(child, fade(1)));

        let other = Rc::new(SimpleHost::new());
        store.clear_host(child);
        store.set_host(root, &other);
        store.add_child(root, child);
        assert_eq!(other.animations_added(), 1);
    }

    #[test]
    fn animated_setters_do_not_commit() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let id = store.create_layer();
        store.set_host(id, &host);
        store.set_opacity_from_animation(id, 0.3);
        store.set_transform_from_animation(id, Transform3d::from_scale(2.0, 2.0, 1.0));
        assert_eq!(store.opacity(id), 0.3);
        assert_eq!(host.commit_requests(), 0);
    }

    #[test]
    fn controller_replacement_is_rebound() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        let mut controller = AnimationController::new();
        controller.add_animation(fade(5));
        store.set_animation_controller(id, controller);

        let bound = store.animation_controller(id);
        assert_eq!(bound.owner(), Some(store.key(id)));
        assert!(bound.force_sync());

        let released = store.release_animation_controller(id);
        assert_eq!(released.owner(), None);
        assert_eq!(released.animations().len(), 1);
        assert!(store.animation_controller(id).animations().is_empty());
    }

    #[test]
    fn main_side_ticking_writes_values() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let id = store.create_layer();
        store.set_host(id, &host);
        store.add_animation(id, fade(1));

        let mut events = Vec::new();
        store.animate_layers(0.0, &mut events);
        store.animate_layers(0.5, &mut events);
        assert_eq!(store.opacity(id), 0.5);
        store.animate_layers(1.0, &mut events);
        assert!(!store.has_active_animation(id));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn dispatch_routes_by_key() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let id = store.create_layer();
        store.set_host(id, &host);
        store.add_animation(id, fade(1));

        let started = AnimationEvent {
            kind: AnimationEventKind::Started,
            layer: store.key(id),
            animation_id: 1,
            group: 1,
            property: TargetProperty::Opacity,
            monotonic_time: 4.0,
        };
        let stray = AnimationEvent {
            layer: crate::layer::LayerKey(999),
            ..started
        };
        store.dispatch_animation_events(&[started, stray], &mut Tracer::none());
        let anim = store.animation_controller(id).animation(1, TargetProperty::Opacity);
        assert_eq!(anim.map(Animation::run_state), Some(RunState::Running));

        let finished = AnimationEvent {
            kind: AnimationEventKind::Finished,
            ..started
        };
        store.dispatch_animation_events(&[finished], &mut Tracer::none());
        assert!(!store.opacity_is_animating(id));
    }
}
