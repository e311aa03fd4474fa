// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit: pushing main-side layer state into the mirror tree.
//!
//! A commit runs in two phases:
//!
//! 1. **Structure.** If the `TOPOLOGY` channel recorded a change anywhere in
//!    the committed tree (or the mirror tree belongs to a different root),
//!    the mirror structure is rebuilt. Existing mirrors are reused by id, so
//!    compositor-owned state (scroll deltas, running animations, undrawn
//!    damage) survives reparenting. Missing mirrors are created and mirrors
//!    with no main-side counterpart are dropped.
//! 2. **Properties.** Every layer of the tree, masks and replicas included,
//!    is pushed into its mirror. Most properties are copied. Opacity and
//!    transform are skipped while an animation drives them. Pending damage is
//!    united with the mirror's, and scroll deltas are reconciled against what
//!    the main side has already absorbed.
//!
//! ```text
//!   main                              compositor
//!   LayerStore ──commit()──────────▶  MirrorTree
//!       ▲                                 │
//!       └─ apply_scroll_deltas ◀──────────┤ collect_scroll_deltas
//!       └─ dispatch_animation_events ◀────┘ animate
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::animation::TargetProperty;
use crate::dirty;
use crate::layer::{INVALID, LayerId, LayerKey, LayerStore, unite};
use crate::mirror::{MirrorLayer, MirrorTree};
use crate::trace::{CommitBeginEvent, CommitEndEvent, Tracer};

#[cfg(feature = "trace-rich")]
use crate::trace::{DamageMergedEvent, DeferredPropertyEvent};

/// What one [`LayerStore::commit`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitChanges {
    /// Monotonic commit counter of the store (first commit is 1).
    pub commit_index: u64,
    /// Whether the mirror structure was rebuilt.
    pub structure_rebuilt: bool,
    /// Layers pushed, masks and replicas included.
    pub layers_pushed: usize,
    /// Ids of mirrors created by this commit.
    pub created: Vec<LayerKey>,
    /// Ids of mirrors dropped by this commit.
    pub removed: Vec<LayerKey>,
    /// Ids of layers of the committed tree that changed since the last commit,
    /// in ascending order.
    pub changed: Vec<LayerKey>,
}

impl LayerStore {
    /// Synchronizes the tree rooted at `root` into `tree`.
    ///
    /// Dirty marks belonging to other trees in this store are kept for their
    /// own commits.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `root` is not a root (a layer with a
    /// parent, or one installed as a mask or replica).
    pub fn commit(
        &mut self,
        root: LayerId,
        tree: &mut MirrorTree,
        tracer: &mut Tracer<'_>,
    ) -> CommitChanges {
        self.validate(root);
        assert!(
            self.up(root.idx) == INVALID,
            "only a root layer can be committed"
        );
        self.commit_count += 1;
        let commit_index = self.commit_count;
        let root_key = self.key[root.idx as usize];
        tracer.commit_begin(&CommitBeginEvent {
            commit_index,
            root: root_key,
        });

        let mut changes = CommitChanges {
            commit_index,
            ..CommitChanges::default()
        };

        // Phase 1: structure.
        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        let mut topology_changed = false;
        for idx in topology {
            if !self.is_live_idx(idx) {
                continue;
            }
            if self.root_idx(idx) == root.idx {
                topology_changed = true;
            } else {
                self.dirty.mark(idx, dirty::TOPOLOGY);
            }
        }
        if topology_changed || tree.root != Some(root_key) || tree.is_empty() {
            self.rebuild_structure(root.idx, tree, &mut changes);
            changes.structure_rebuilt = true;
        }

        // Phase 2: properties.
        let mut stack = Vec::from([root.idx]);
        while let Some(idx) = stack.pop() {
            self.push_layer(idx, tree, commit_index, tracer);
            changes.layers_pushed += 1;
            let i = idx as usize;
            for special in [self.replica[i], self.mask[i]] {
                if special != INVALID {
                    stack.push(special);
                }
            }
            stack.extend(self.children[i].iter().rev());
        }
        tree.update_scrollbar_layers();

        let properties: Vec<u32> = self
            .dirty
            .drain(dirty::PROPERTIES)
            .deterministic()
            .run()
            .collect();
        for idx in properties {
            if !self.is_live_idx(idx) {
                continue;
            }
            if self.root_idx(idx) == root.idx {
                changes.changed.push(self.key[idx as usize]);
            } else {
                self.dirty.mark(idx, dirty::PROPERTIES);
            }
        }
        changes.changed.sort_unstable();

        tracer.commit_end(&CommitEndEvent {
            commit_index,
            layers_pushed: changes.layers_pushed,
            layers_created: changes.created.len(),
            layers_removed: changes.removed.len(),
            structure_rebuilt: changes.structure_rebuilt,
        });
        changes
    }

    /// Pushes one layer, and recursively its mask and replica, into the
    /// matching mirrors of `tree`.
    ///
    /// Children are not visited; [`commit`](Self::commit) walks the tree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if `tree` has no mirror for the layer
    /// (or for its mask or replica), or if a mirror's mask or replica slot
    /// names a different layer than the main side.
    pub fn push_properties_to(&mut self, id: LayerId, tree: &mut MirrorTree) {
        self.validate(id);
        let mut tracer = Tracer::none();
        let commit_index = self.commit_count;
        let mut stack = Vec::from([id.idx]);
        while let Some(idx) = stack.pop() {
            self.push_layer(idx, tree, commit_index, &mut tracer);
            let i = idx as usize;
            for special in [self.replica[i], self.mask[i]] {
                if special != INVALID {
                    stack.push(special);
                }
            }
        }
    }

    /// Copies the state of layer `idx` into its mirror.
    fn push_layer(
        &mut self,
        idx: u32,
        tree: &mut MirrorTree,
        commit_index: u64,
        tracer: &mut Tracer<'_>,
    ) {
        let i = idx as usize;
        let key = self.key[i];
        let mask = self.special_key(self.mask[i]);
        let replica = self.special_key(self.replica[i]);
        let draws_content = self.draws_content_at(idx);

        let Some(mirror) = tree.layers.get_mut(&key) else {
            panic!("no mirror layer for {key:?}");
        };
        assert!(
            mirror.mask_layer() == mask,
            "mirror mask of {key:?} does not match: {:?} != {mask:?}",
            mirror.mask_layer()
        );
        assert!(
            mirror.replica_layer() == replica,
            "mirror replica of {key:?} does not match: {:?} != {replica:?}",
            mirror.replica_layer()
        );

        let props = &mut self.props[i];
        let animations = &mut self.animations[i];

        mirror.bounds = props.bounds;
        mirror.position = props.position;
        mirror.anchor_point = props.anchor_point;
        mirror.anchor_point_z = props.anchor_point_z;
        mirror.sublayer_transform = props.sublayer_transform;
        mirror.background_color = props.background_color;
        mirror.contents_opaque = props.contents_opaque;
        mirror.double_sided = props.double_sided;
        mirror.masks_to_bounds = props.masks_to_bounds;
        mirror.force_render_surface = props.force_render_surface;
        mirror.draws_content = draws_content;
        mirror.preserves_3d = props.preserves_3d;
        mirror.use_parent_backface_visibility = props.use_parent_backface_visibility;
        mirror.use_lcd_text = props.use_lcd_text;
        mirror.draw_checkerboard_for_missing_tiles = props.draw_checkerboard_for_missing_tiles;
        mirror.filters.clone_from(&props.filters);
        mirror.background_filters.clone_from(&props.background_filters);
        mirror.debug_name.clone_from(&props.debug_name);
        mirror.debug_border_color = props.debug_border_color;
        mirror.debug_border_width = props.debug_border_width;
        mirror.scroll_position = props.scroll_position;
        mirror.max_scroll_position = props.max_scroll_position;
        mirror.scrollable = props.scrollable;
        mirror.should_scroll_on_main_thread = props.should_scroll_on_main_thread;
        mirror.have_wheel_event_handlers = props.have_wheel_event_handlers;
        mirror.is_container_for_fixed_position_layers =
            props.is_container_for_fixed_position_layers;
        mirror.fixed_to_container_layer = props.fixed_to_container_layer;

        if props.non_fast_scrollable_region_changed {
            mirror
                .non_fast_scrollable_region
                .clone_from(&props.non_fast_scrollable_region);
            props.non_fast_scrollable_region_changed = false;
        }

        if animations.is_animating_property(TargetProperty::Opacity) {
            defer(tracer, commit_index, key, TargetProperty::Opacity);
        } else {
            mirror.opacity = props.opacity;
        }
        if animations.is_animating_property(TargetProperty::Transform) {
            defer(tracer, commit_index, key, TargetProperty::Transform);
        } else {
            mirror.transform = props.transform;
        }

        let pushed = props.update_rect;
        let merged = unite(mirror.update_rect(), pushed);
        mirror.set_update_rect(merged);
        props.update_rect = Rect::ZERO;
        #[cfg(feature = "trace-rich")]
        if !pushed.is_zero_area() {
            tracer.damage_merged(&DamageMergedEvent {
                commit_index,
                layer: key,
                pushed,
                merged,
            });
        }

        mirror.set_scroll_delta(mirror.scroll_delta() - mirror.sent_scroll_delta());
        mirror.set_sent_scroll_delta(kurbo::Vec2::ZERO);

        mirror.stacking_order_changed = props.stacking_order_changed;
        props.stacking_order_changed = false;

        animations.push_animation_updates_to(&mut mirror.animations);
    }

    /// Replaces the structure of `tree` with the structure under `root`.
    fn rebuild_structure(&self, root: u32, tree: &mut MirrorTree, changes: &mut CommitChanges) {
        let mut old = core::mem::take(&mut tree.layers);
        let mut stack: Vec<(u32, Option<LayerKey>)> = Vec::from([(root, None)]);
        while let Some((idx, parent)) = stack.pop() {
            let i = idx as usize;
            let key = self.key[i];
            let mut mirror = old.remove(&key).unwrap_or_else(|| {
                changes.created.push(key);
                MirrorLayer::for_kind(key, self.kind[i])
            });
            mirror.parent = parent;
            mirror.children = self.children[i].iter().map(|&c| self.key[c as usize]).collect();
            mirror.mask = self.special_key(self.mask[i]);
            mirror.replica = self.special_key(self.replica[i]);
            tree.layers.insert(key, mirror);

            for special in [self.replica[i], self.mask[i]] {
                if special != INVALID {
                    stack.push((special, None));
                }
            }
            stack.extend(self.children[i].iter().rev().map(|&c| (c, Some(key))));
        }
        changes.removed = take_keys(old);
        tree.root = Some(self.key[root as usize]);
    }

    fn special_key(&self, idx: u32) -> Option<LayerKey> {
        (idx != INVALID).then(|| self.key[idx as usize])
    }

    fn is_live_idx(&self, idx: u32) -> bool {
        idx < self.len && self.alive[idx as usize]
    }

    fn root_idx(&self, mut idx: u32) -> u32 {
        loop {
            let up = self.up(idx);
            if up == INVALID {
                return idx;
            }
            idx = up;
        }
    }
}

fn take_keys(layers: BTreeMap<LayerKey, MirrorLayer>) -> Vec<LayerKey> {
    layers.into_keys().collect()
}

#[cfg(feature = "trace-rich")]
fn defer(tracer: &mut Tracer<'_>, commit_index: u64, layer: LayerKey, property: TargetProperty) {
    tracer.property_deferred(&DeferredPropertyEvent {
        commit_index,
        layer,
        property,
    });
}

#[cfg(not(feature = "trace-rich"))]
fn defer(_: &mut Tracer<'_>, _: u64, _: LayerKey, _: TargetProperty) {}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;

    use kurbo::{Point, Size, Vec2};

    use super::*;
    use crate::animation::{Animation, AnimationCurve, KeyframedCurve, RunState};
    use crate::color::Color;
    use crate::filter::{FilterOperation, FilterOperations};
    use crate::host::SimpleHost;
    use crate::layer::ScrollbarOrientation;
    use crate::region::Region;
    use crate::transform::Transform3d;

    fn hosted() -> (LayerStore, Rc<SimpleHost>, LayerId) {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let root = store.create_layer();
        store.set_host(root, &host);
        (store, host, root)
    }

    fn commit(store: &mut LayerStore, root: LayerId, tree: &mut MirrorTree) -> CommitChanges {
        store.commit(root, tree, &mut Tracer::none())
    }

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
    fn scenario_a_opacity_push_then_animation_defers() {
        let (mut store, host, root) = hosted();
        let child = store.create_layer();
        store.insert_child(root, child, 0);
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);

        host.reset_counters();
        store.set_opacity(child, 0.5);
        assert_eq!(host.commit_requests(), 1);

        commit(&mut store, root, &mut tree);
        let key = store.key(child);
        assert_eq!(tree.layer(key).map(|m| m.opacity), Some(0.5));

        assert!(store.add_animation(child, fade(1)));
        store.set_opacity_from_animation(child, 0.9);
        commit(&mut store, root, &mut tree);
        // Animated opacity is not pushed, so the mirror keeps its last value.
        assert_eq!(tree.layer(key).map(|m| m.opacity), Some(0.5));

        // Whatever the compositor animation writes is left alone.
        if let Some(mirror) = tree.layer_mut(key) {
            mirror.opacity = 0.25;
        }
        commit(&mut store, root, &mut tree);
        assert_eq!(tree.layer(key).map(|m| m.opacity), Some(0.25));
    }

    #[test]
    fn scenario_b_damage_coalesces() {
        let (mut store, host, root) = hosted();
        let child = store.create_layer();
        store.add_child(root, child);
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        assert!(host.take_commit_request());
        host.reset_counters();

        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 30.0, 40.0);
        store.set_needs_display_rect(child, a);
        store.set_needs_display_rect(child, b);
        assert_eq!(host.scheduled_commits(), 1);

        commit(&mut store, root, &mut tree);
        let mirror = tree.layer(store.key(child)).map(MirrorLayer::update_rect);
        assert_eq!(mirror, Some(a.union(b)));
        assert_eq!(store.update_rect(child), Rect::ZERO);
    }

    #[test]
    fn damage_unites_with_undrawn_mirror_damage() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let key = store.key(root);

        store.set_needs_display_rect(root, Rect::new(0.0, 0.0, 5.0, 5.0));
        commit(&mut store, root, &mut tree);
        store.set_needs_display_rect(root, Rect::new(10.0, 10.0, 15.0, 15.0));
        commit(&mut store, root, &mut tree);
        assert_eq!(
            tree.layer(key).map(MirrorLayer::update_rect),
            Some(Rect::new(0.0, 0.0, 15.0, 15.0))
        );

        tree.reset_change_tracking();
        commit(&mut store, root, &mut tree);
        assert_eq!(tree.layer(key).map(MirrorLayer::update_rect), Some(Rect::ZERO));
    }

    #[test]
    fn scroll_delta_reconciles_against_sent() {
        let (mut store, _host, root) = hosted();
        store.set_scrollable(root, true);
        store.set_max_scroll_position(root, Vec2::new(0.0, 100.0));
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let key = store.key(root);

        let _ = tree.scroll_by(key, Vec2::new(0.0, 10.0));
        let deltas = tree.collect_scroll_deltas();
        // The compositor keeps scrolling while main absorbs the first report.
        let _ = tree.scroll_by(key, Vec2::new(0.0, 4.0));
        store.apply_scroll_deltas(&deltas);
        assert_eq!(store.scroll_position(root), Vec2::new(0.0, 10.0));

        commit(&mut store, root, &mut tree);
        let mirror = tree.layer(key).map(|m| {
            (
                m.scroll_position,
                m.scroll_delta(),
                m.sent_scroll_delta(),
                m.current_scroll_offset(),
            )
        });
        assert_eq!(
            mirror,
            Some((
                Vec2::new(0.0, 10.0),
                Vec2::new(0.0, 4.0),
                Vec2::ZERO,
                Vec2::new(0.0, 14.0)
            ))
        );
    }

    #[test]
    fn push_round_trips_every_property() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Size::new(40.0, 30.0));
        store.set_position(layer, Point::new(3.0, 4.0));
        store.set_anchor_point(layer, Point::new(0.0, 1.0));
        store.set_anchor_point_z(layer, 2.0);
        store.set_transform(layer, Transform3d::from_translation(1.0, 2.0, 3.0));
        store.set_sublayer_transform(layer, Transform3d::from_scale(2.0, 2.0, 1.0));
        store.set_opacity(layer, 0.75);
        store.set_background_color(layer, Color::WHITE);
        store.set_contents_opaque(layer, true);
        store.set_double_sided(layer, false);
        store.set_masks_to_bounds(layer, true);
        store.set_force_render_surface(layer, true);
        store.set_is_drawable(layer, true);
        store.set_preserves_3d(layer, true);
        store.set_use_parent_backface_visibility(layer, true);
        store.set_use_lcd_text(layer, true);
        store.set_draw_checkerboard_for_missing_tiles(layer, true);
        store.set_filters(
            layer,
            FilterOperations::new().with(FilterOperation::Grayscale(0.5)),
        );
        store.set_debug_name(layer, "card");
        store.set_debug_border_color(layer, Color::BLACK);
        store.set_debug_border_width(layer, 2.0);
        store.set_scroll_position(layer, Vec2::new(1.0, 1.0));
        store.set_max_scroll_position(layer, Vec2::new(9.0, 9.0));
        store.set_scrollable(layer, true);
        store.set_should_scroll_on_main_thread(layer, true);
        store.set_have_wheel_event_handlers(layer, true);
        store.set_non_fast_scrollable_region(
            layer,
            Region::from_rect(Rect::new(0.0, 0.0, 4.0, 4.0)),
        );
        store.set_fixed_to_container_layer(layer, true);

        let mut tree = MirrorTree::new();
        let key = store.key(layer);
        tree.layers.insert(key, MirrorLayer::new(key));
        store.push_properties_to(layer, &mut tree);

        let m = tree.layer(key).cloned().unwrap();
        assert_eq!(m.bounds, store.bounds(layer));
        assert_eq!(m.position, store.position(layer));
        assert_eq!(m.anchor_point, store.anchor_point(layer));
        assert_eq!(m.anchor_point_z, store.anchor_point_z(layer));
        assert_eq!(m.transform, store.transform(layer));
        assert_eq!(m.sublayer_transform, store.sublayer_transform(layer));
        assert_eq!(m.opacity, store.opacity(layer));
        assert_eq!(m.background_color, store.background_color(layer));
        assert_eq!(m.contents_opaque, store.contents_opaque(layer));
        assert_eq!(m.double_sided, store.double_sided(layer));
        assert_eq!(m.masks_to_bounds, store.masks_to_bounds(layer));
        assert_eq!(m.force_render_surface, store.force_render_surface(layer));
        assert_eq!(m.draws_content, store.draws_content(layer));
        assert_eq!(m.preserves_3d, store.preserves_3d(layer));
        assert_eq!(
            m.use_parent_backface_visibility,
            store.use_parent_backface_visibility(layer)
        );
        assert_eq!(m.use_lcd_text, store.use_lcd_text(layer));
        assert_eq!(
            m.draw_checkerboard_for_missing_tiles,
            store.draw_checkerboard_for_missing_tiles(layer)
        );
        assert_eq!(&m.filters, store.filters(layer));
        assert_eq!(m.debug_name, store.debug_name(layer));
        assert_eq!(m.debug_border_color, store.debug_border_color(layer));
        assert_eq!(m.debug_border_width, store.debug_border_width(layer));
        assert_eq!(m.scroll_position, store.scroll_position(layer));
        assert_eq!(m.max_scroll_position, store.max_scroll_position(layer));
        assert_eq!(m.scrollable, store.scrollable(layer));
        assert_eq!(
            m.should_scroll_on_main_thread,
            store.should_scroll_on_main_thread(layer)
        );
        assert_eq!(
            m.have_wheel_event_handlers,
            store.have_wheel_event_handlers(layer)
        );
        assert_eq!(
            &m.non_fast_scrollable_region,
            store.non_fast_scrollable_region(layer)
        );
        assert_eq!(
            m.fixed_to_container_layer,
            store.fixed_to_container_layer(layer)
        );
        assert!(m.stacking_order_changed());
    }

    #[test]
    fn animated_transform_is_not_pushed() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let key = store.key(root);

        let spin = Animation::new(
            2,
            2,
            AnimationCurve::Transform(
                KeyframedCurve::new()
                    .with_keyframe(0.0, Transform3d::IDENTITY)
                    .with_keyframe(1.0, Transform3d::from_translation(10.0, 0.0, 0.0)),
            ),
        );
        assert!(store.add_animation(root, spin));
        store.set_transform(root, Transform3d::from_scale(3.0, 3.0, 1.0));
        commit(&mut store, root, &mut tree);
        assert_eq!(
            tree.layer(key).map(|m| m.transform),
            Some(Transform3d::IDENTITY)
        );
        assert_eq!(
            tree.layer(key)
                .map(|m| m.animation_controller().animations().len()),
            Some(1)
        );
    }

    #[test]
    fn finished_animation_returns_authority_to_main() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        assert!(store.add_animation(root, fade(1)));
        store.set_opacity(root, 0.3);
        commit(&mut store, root, &mut tree);
        let key = store.key(root);
        assert_eq!(tree.layer(key).map(|m| m.opacity), Some(1.0));

        let mut events = Vec::new();
        tree.animate(0.0, &mut events);
        tree.animate(2.0, &mut events);
        store.dispatch_animation_events(&events, &mut Tracer::none());
        assert!(!store.opacity_is_animating(root));

        commit(&mut store, root, &mut tree);
        let mirror = tree.layer(key).unwrap();
        assert_eq!(mirror.opacity, 0.3);
        assert!(mirror.animation_controller().animations().is_empty());
    }

    #[test]
    fn paused_state_reaches_mirror() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        assert!(store.add_animation(root, fade(4)));
        commit(&mut store, root, &mut tree);
        let mut events = Vec::new();
        tree.animate(0.0, &mut events);

        store.pause_animation(root, 4, 0.5);
        commit(&mut store, root, &mut tree);
        let state = tree
            .layer(store.key(root))
            .and_then(|m| m.animation_controller().animation(4, TargetProperty::Opacity))
            .map(Animation::run_state);
        assert_eq!(state, Some(RunState::Paused));
    }

    #[test]
    fn structure_mirrors_main_tree() {
        let (mut store, _host, root) = hosted();
        let a = store.create_layer();
        let b = store.create_layer();
        let mask = store.create_layer();
        let replica = store.create_layer();
        store.set_children(root, &[a, b]);
        store.set_mask_layer(a, Some(mask));
        store.set_replica_layer(b, Some(replica));

        let mut tree = MirrorTree::new();
        let changes = commit(&mut store, root, &mut tree);
        assert!(changes.structure_rebuilt);
        assert_eq!(changes.layers_pushed, 5);
        assert_eq!(changes.created.len(), 5);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.root(), Some(store.key(root)));

        let root_mirror = tree.layer(store.key(root)).unwrap();
        assert_eq!(root_mirror.children(), &[store.key(a), store.key(b)]);
        let a_mirror = tree.layer(store.key(a)).unwrap();
        assert_eq!(a_mirror.parent(), Some(store.key(root)));
        assert_eq!(a_mirror.mask_layer(), Some(store.key(mask)));
        assert_eq!(
            tree.layer(store.key(b)).and_then(MirrorLayer::replica_layer),
            Some(store.key(replica))
        );
        assert_eq!(tree.layer(store.key(mask)).and_then(MirrorLayer::parent), None);
    }

    #[test]
    fn rebuild_reuses_mirrors_by_key() {
        let (mut store, _host, root) = hosted();
        let a = store.create_layer();
        let b = store.create_layer();
        store.set_children(root, &[a, b]);
        store.set_scrollable(b, true);
        store.set_max_scroll_position(b, Vec2::new(0.0, 50.0));
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);

        let _ = tree.scroll_by(store.key(b), Vec2::new(0.0, 5.0));
        store.add_child(a, b);
        let changes = commit(&mut store, root, &mut tree);
        assert!(changes.structure_rebuilt);
        assert!(changes.created.is_empty());
        assert!(changes.removed.is_empty());

        let b_mirror = tree.layer(store.key(b)).unwrap();
        assert_eq!(b_mirror.parent(), Some(store.key(a)));
        assert_eq!(b_mirror.scroll_delta(), Vec2::new(0.0, 5.0));

        let key_b = store.key(b);
        store.remove_from_parent(b);
        store.destroy_layer(b);
        let changes = commit(&mut store, root, &mut tree);
        assert_eq!(changes.removed, vec![key_b]);
        assert!(!tree.contains(key_b));
    }

    #[test]
    fn property_only_commit_keeps_structure() {
        let (mut store, _host, root) = hosted();
        let child = store.create_layer();
        store.add_child(root, child);
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);

        store.set_opacity(child, 0.5);
        let changes = commit(&mut store, root, &mut tree);
        assert!(!changes.structure_rebuilt);
        assert_eq!(changes.changed, vec![store.key(child)]);
        assert_eq!(changes.layers_pushed, 2);

        let changes = commit(&mut store, root, &mut tree);
        assert!(changes.changed.is_empty());
        assert_eq!(changes.commit_index, 3);
    }

    #[test]
    fn other_trees_keep_their_dirty_marks() {
        let mut store = LayerStore::new();
        let first = store.create_layer();
        let second = store.create_layer();
        let child = store.create_layer();
        let mut first_tree = MirrorTree::new();
        let mut second_tree = MirrorTree::new();
        commit(&mut store, first, &mut first_tree);
        commit(&mut store, second, &mut second_tree);

        store.add_child(second, child);
        store.set_opacity(child, 0.5);
        let changes = commit(&mut store, first, &mut first_tree);
        assert!(!changes.structure_rebuilt);
        assert!(changes.changed.is_empty());

        let changes = commit(&mut store, second, &mut second_tree);
        assert!(changes.structure_rebuilt);
        assert!(changes.changed.contains(&store.key(child)));
    }

    #[test]
    fn region_pushed_only_when_changed() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        let region = Region::from_rect(Rect::new(0.0, 0.0, 8.0, 8.0));
        store.set_non_fast_scrollable_region(root, region.clone());
        commit(&mut store, root, &mut tree);
        let key = store.key(root);

        if let Some(mirror) = tree.layer_mut(key) {
            mirror.non_fast_scrollable_region = Region::new();
        }
        commit(&mut store, root, &mut tree);
        assert_eq!(
            tree.layer(key).map(|m| m.non_fast_scrollable_region.is_empty()),
            Some(true)
        );

        store.set_non_fast_scrollable_region(root, Region::new());
        store.set_non_fast_scrollable_region(root, region.clone());
        commit(&mut store, root, &mut tree);
        assert_eq!(
            tree.layer(key).map(|m| m.non_fast_scrollable_region.clone()),
            Some(region)
        );
    }

    #[test]
    fn stacking_order_is_one_shot() {
        let (mut store, _host, root) = hosted();
        let child = store.create_layer();
        store.add_child(root, child);
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let key = store.key(child);
        assert_eq!(tree.layer(key).map(MirrorLayer::stacking_order_changed), Some(true));
        assert!(!store.stacking_order_changed(child));

        commit(&mut store, root, &mut tree);
        assert_eq!(tree.layer(key).map(MirrorLayer::stacking_order_changed), Some(false));
    }

    #[test]
    fn scrollbar_geometry_tracks_scroll_layer() {
        let (mut store, _host, root) = hosted();
        let scroll = store.create_layer();
        let content = store.create_layer();
        store.add_child(root, scroll);
        store.add_child(scroll, content);
        store.set_scrollable(scroll, true);
        store.set_scroll_position(scroll, Vec2::new(10.0, 20.0));
        store.set_max_scroll_position(scroll, Vec2::new(30.0, 50.0));
        store.set_bounds(content, Size::new(100.0, 200.0));
        let bar = store.create_scrollbar_layer(store.key(scroll), ScrollbarOrientation::Horizontal);
        store.add_child(root, bar);

        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let bar_key = store.key(bar);
        let geometry = tree.layer(bar_key).and_then(|m| m.scrollbar().copied()).unwrap();
        assert_eq!(geometry.current_pos, 10.0);
        assert_eq!(geometry.total_size, 100.0);
        assert_eq!(geometry.maximum, 30.0);
        assert_eq!(
            tree.layer(store.key(scroll))
                .and_then(MirrorLayer::horizontal_scrollbar_layer),
            Some(bar_key)
        );
        assert!(tree.layer(bar_key).is_some_and(|m| m.draws_content));

        store.set_scroll_position(scroll, Vec2::new(100.0, 200.0));
        store.set_max_scroll_position(scroll, Vec2::new(300.0, 500.0));
        commit(&mut store, root, &mut tree);
        let _ = tree.scroll_by(store.key(scroll), Vec2::new(12.0, 34.0));
        let geometry = tree.layer(bar_key).and_then(|m| m.scrollbar().copied()).unwrap();
        assert_eq!(geometry.current_pos, 112.0);
        assert_eq!(geometry.maximum, 300.0);
    }

    #[test]
    #[should_panic(expected = "no mirror layer for")]
    fn push_without_mirror_panics() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.push_properties_to(layer, &mut MirrorTree::new());
    }

    #[test]
    #[should_panic(expected = "mirror mask of")]
    fn push_with_mismatched_mask_panics() {
        let (mut store, _host, root) = hosted();
        let mut tree = MirrorTree::new();
        commit(&mut store, root, &mut tree);
        let mask = store.create_layer();
        store.set_mask_layer(root, Some(mask));
        store.push_properties_to(root, &mut tree);
    }

    #[test]
    #[should_panic(expected = "only a root layer can be committed")]
    fn commit_of_non_root_panics() {
        let (mut store, _host, root) = hosted();
        let child = store.create_layer();
        store.add_child(root, child);
        commit(&mut store, child, &mut MirrorTree::new());
    }

    #[test]
    fn switching_roots_rebuilds() {
        let mut store = LayerStore::new();
        let first = store.create_layer();
        let second = store.create_layer();
        let mut tree = MirrorTree::new();
        commit(&mut store, first, &mut tree);
        let changes = commit(&mut store, second, &mut tree);
        assert!(changes.structure_rebuilt);
        assert_eq!(changes.removed, vec![store.key(first)]);
        assert_eq!(tree.root(), Some(store.key(second)));
    }
}
