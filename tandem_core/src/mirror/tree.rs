// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor-side tree.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::vec::Vec;

use kurbo::Vec2;

use crate::animation::AnimationEvent;
use crate::layer::{LayerKey, LayerStore, ScrollbarOrientation};

use super::layer::MirrorLayer;

/// A scroll the compositor applied that the main side has not seen yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollDelta {
    /// Id of the scrolled layer.
    pub layer: LayerKey,
    /// Offset to add to the main-side scroll position.
    pub delta: Vec2,
}

/// Mirror layers keyed by the id they share with the main side.
///
/// The tree owns plain data only and is `Send`, so it can live on a
/// compositor thread and be handed to the main side for the duration of a
/// commit.
#[derive(Clone, Debug, Default)]
pub struct MirrorTree {
    pub(crate) layers: BTreeMap<LayerKey, MirrorLayer>,
    pub(crate) root: Option<LayerKey>,
}

impl MirrorTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the root mirror, once a commit has built the tree.
    #[must_use]
    pub fn root(&self) -> Option<LayerKey> {
        self.root
    }

    /// Number of mirrors, masks and replicas included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no commit has populated the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Looks up a mirror by id.
    #[must_use]
    pub fn layer(&self, key: LayerKey) -> Option<&MirrorLayer> {
        self.layers.get(&key)
    }

    /// Looks up a mirror by id for compositor-side mutation.
    #[must_use]
    pub fn layer_mut(&mut self, key: LayerKey) -> Option<&mut MirrorLayer> {
        self.layers.get_mut(&key)
    }

    /// Returns `true` if a mirror with this id exists.
    #[must_use]
    pub fn contains(&self, key: LayerKey) -> bool {
        self.layers.contains_key(&key)
    }

    /// Iterates mirrors in id order.
    pub fn iter(&self) -> btree_map::Values<'_, LayerKey, MirrorLayer> {
        self.layers.values()
    }

    /// Runs one animation frame.
    ///
    /// Every mirror's controller is ticked; animated opacity and transform
    /// values are written into the mirrors. Lifecycle events are appended to
    /// `events` for delivery to the main side.
    pub fn animate(&mut self, monotonic_time: f64, events: &mut Vec<AnimationEvent>) {
        for layer in self.layers.values_mut() {
            let values = layer.animations.animate(monotonic_time, events);
            if let Some(opacity) = values.opacity {
                layer.opacity = opacity;
            }
            if let Some(transform) = values.transform {
                layer.transform = transform;
            }
        }
    }

    /// Scrolls the mirror `key` and refreshes the scrollbars tracking it.
    ///
    /// Returns the part of `delta` that did not fit, or `None` if there is no
    /// such mirror or it is not scrollable.
    pub fn scroll_by(&mut self, key: LayerKey, delta: Vec2) -> Option<Vec2> {
        let layer = self.layers.get_mut(&key)?;
        if !layer.scrollable {
            return None;
        }
        let unused = layer.scroll_by(delta);
        self.update_scrollbar_layers();
        Some(unused)
    }

    /// Reports the scroll each mirror gained since it was last collected.
    ///
    /// Only the part beyond the sent delta is reported, and the whole delta
    /// then becomes the sent delta. Collecting twice between commits never
    /// reports the same scroll twice, and the next commit subtracts exactly
    /// what the main side absorbed.
    pub fn collect_scroll_deltas(&mut self) -> Vec<ScrollDelta> {
        let mut out = Vec::new();
        for layer in self.layers.values_mut() {
            let delta = layer.scroll_delta();
            let unsent = delta - layer.sent_scroll_delta();
            if unsent == Vec2::ZERO {
                continue;
            }
            layer.set_sent_scroll_delta(delta);
            out.push(ScrollDelta {
                layer: layer.key(),
                delta: unsent,
            });
        }
        out
    }

    /// Clears per-draw damage and stacking flags on every mirror.
    pub fn reset_change_tracking(&mut self) {
        for layer in self.layers.values_mut() {
            layer.reset_change_tracking();
        }
    }

    /// Recomputes scrollbar geometry from the layers the scrollbars track.
    ///
    /// The scrolled layer also learns which scrollbar mirrors track it.
    pub fn update_scrollbar_layers(&mut self) {
        for layer in self.layers.values_mut() {
            layer.horizontal_scrollbar = None;
            layer.vertical_scrollbar = None;
        }

        let bars: Vec<(LayerKey, LayerKey, ScrollbarOrientation)> = self
            .layers
            .values()
            .filter_map(|l| {
                l.scrollbar
                    .as_ref()
                    .map(|s| (l.key(), s.scroll_layer, s.orientation))
            })
            .collect();

        for (bar, target, orientation) in bars {
            let Some(scroll) = self.layers.get(&target) else {
                continue;
            };
            let offset = scroll.current_scroll_offset();
            let max = scroll.max_scroll_position;
            let content = scroll
                .children()
                .first()
                .and_then(|c| self.layers.get(c))
                .map_or(scroll.bounds, |c| c.bounds);
            let (current_pos, total_size, maximum) = match orientation {
                ScrollbarOrientation::Horizontal => (offset.x, content.width, max.x),
                ScrollbarOrientation::Vertical => (offset.y, content.height, max.y),
            };

            if let Some(geometry) = self.layers.get_mut(&bar).and_then(|l| l.scrollbar.as_mut()) {
                geometry.current_pos = current_pos;
                geometry.total_size = total_size;
                geometry.maximum = maximum;
            }
            if let Some(scroll) = self.layers.get_mut(&target) {
                match orientation {
                    ScrollbarOrientation::Horizontal => scroll.horizontal_scrollbar = Some(bar),
                    ScrollbarOrientation::Vertical => scroll.vertical_scrollbar = Some(bar),
                }
            }
        }
    }
}

impl LayerStore {
    /// Adds compositor scroll deltas to the main-side scroll positions.
    ///
    /// Deltas naming layers that no longer exist are dropped. Each applied
    /// delta goes through the scroll-position setter and so requests a commit,
    /// which reconciles the mirror's remaining delta.
    pub fn apply_scroll_deltas(&mut self, deltas: &[ScrollDelta]) {
        for d in deltas {
            let Some(id) = self.layer_by_key(d.layer) else {
                continue;
            };
            let position = self.scroll_position(id) + d.delta;
            self.set_scroll_position(id, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn mirror_tree_is_send() {
        assert_send::<MirrorTree>();
    }

    #[test]
    fn collect_scroll_deltas_marks_sent() {
        let mut tree = MirrorTree::new();
        let mut layer = MirrorLayer::new(LayerKey(3));
        layer.scrollable = true;
        layer.max_scroll_position = Vec2::new(100.0, 100.0);
        tree.layers.insert(LayerKey(3), layer);
        tree.layers.insert(LayerKey(4), MirrorLayer::new(LayerKey(4)));

        assert_eq!(tree.scroll_by(LayerKey(3), Vec2::new(0.0, 7.0)), Some(Vec2::ZERO));
        assert_eq!(tree.scroll_by(LayerKey(4), Vec2::new(0.0, 7.0)), None);
        assert_eq!(tree.scroll_by(LayerKey(9), Vec2::new(0.0, 7.0)), None);

        let deltas = tree.collect_scroll_deltas();
        assert_eq!(
            deltas,
            [ScrollDelta {
                layer: LayerKey(3),
                delta: Vec2::new(0.0, 7.0)
            }]
        );
        let layer = tree.layer(LayerKey(3)).map(MirrorLayer::sent_scroll_delta);
        assert_eq!(layer, Some(Vec2::new(0.0, 7.0)));
    }

    #[test]
    fn collect_scroll_deltas_reports_only_new_scroll() {
        let mut tree = MirrorTree::new();
        let mut layer = MirrorLayer::new(LayerKey(3));
        layer.scrollable = true;
        layer.max_scroll_position = Vec2::new(0.0, 100.0);
        tree.layers.insert(LayerKey(3), layer);

        tree.scroll_by(LayerKey(3), Vec2::new(0.0, 10.0));
        assert_eq!(tree.collect_scroll_deltas().len(), 1);
        assert!(tree.collect_scroll_deltas().is_empty());

        tree.scroll_by(LayerKey(3), Vec2::new(0.0, 5.0));
        assert_eq!(
            tree.collect_scroll_deltas(),
            [ScrollDelta {
                layer: LayerKey(3),
                delta: Vec2::new(0.0, 5.0)
            }]
        );
        let layer = tree.layer(LayerKey(3));
        assert_eq!(layer.map(MirrorLayer::scroll_delta), Some(Vec2::new(0.0, 15.0)));
        assert_eq!(layer.map(MirrorLayer::sent_scroll_delta), Some(Vec2::new(0.0, 15.0)));
    }
}
