// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render surfaces and fixed-position containers.
//!
//! A render surface is an offscreen target a layer's subtree is drawn into
//! before being composited as a unit. Surfaces are attached lazily, either
//! explicitly with [`create_render_surface`](LayerStore::create_render_surface)
//! or by [`prepare_render_surfaces`](LayerStore::prepare_render_surfaces).

use alloc::vec::Vec;

use kurbo::Rect;

use crate::transform::Transform3d;

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// Offscreen target owned by one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSurface {
    owner: LayerId,
    /// Area of the surface in the owner's space.
    pub content_rect: Rect,
    /// Opacity applied when the surface is composited.
    pub draw_opacity: f32,
    /// Transform from surface space to the target's space.
    pub draw_transform: Transform3d,
    /// Layers drawn into this surface, in drawing order.
    pub layer_list: Vec<LayerId>,
}

impl RenderSurface {
    fn new(owner: LayerId) -> Self {
        Self {
            owner,
            content_rect: Rect::ZERO,
            draw_opacity: 1.0,
            draw_transform: Transform3d::IDENTITY,
            layer_list: Vec::new(),
        }
    }

    /// The layer the surface belongs to.
    #[must_use]
    pub fn owner(&self) -> LayerId {
        self.owner
    }
}

impl LayerStore {
    /// Attaches a fresh render surface to the layer, which becomes its own
    /// render target.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or a surface is already attached.
    pub fn create_render_surface(&mut self, id: LayerId) -> &mut RenderSurface {
        self.validate(id);
        let i = id.idx as usize;
        assert!(
            self.render_surface[i].is_none(),
            "layer already has a render surface"
        );
        self.render_target[i] = id.idx;
        self.render_surface[i].insert(RenderSurface::new(id))
    }

    /// Drops the layer's render surface, if any.
    pub fn clear_render_surface(&mut self, id: LayerId) {
        self.validate(id);
        self.render_surface[id.idx as usize] = None;
    }

    /// The layer's render surface.
    #[must_use]
    pub fn render_surface(&self, id: LayerId) -> Option<&RenderSurface> {
        self.validate(id);
        self.render_surface[id.idx as usize].as_ref()
    }

    /// Mutable access to the layer's render surface.
    #[must_use]
    pub fn render_surface_mut(&mut self, id: LayerId) -> Option<&mut RenderSurface> {
        self.validate(id);
        self.render_surface[id.idx as usize].as_mut()
    }

    /// The layer whose surface this layer draws into, as assigned by the last
    /// [`prepare_render_surfaces`](Self::prepare_render_surfaces) or
    /// [`create_render_surface`](Self::create_render_surface).
    #[must_use]
    pub fn render_target(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let t = self.render_target[id.idx as usize];
        (t != INVALID).then(|| self.handle(t))
    }

    /// Whether any descendant (excluding the layer itself) draws content.
    #[must_use]
    pub fn descendant_draws_content(&self, id: LayerId) -> bool {
        self.validate(id);
        self.descendant_draws_content_at(id.idx)
    }

    /// Whether the layer needs its own render surface.
    ///
    /// Forced surfaces, masks, replicas, and filters always need one.
    /// Translucent or animating opacity needs one when the layer does not
    /// preserve 3D and something below it draws, so the group fades as one.
    #[must_use]
    pub fn needs_render_surface(&self, id: LayerId) -> bool {
        self.validate(id);
        let i = id.idx as usize;
        let props = &self.props[i];
        if props.force_render_surface
            || self.mask[i] != INVALID
            || self.replica[i] != INVALID
            || !props.filters.is_empty()
            || !props.background_filters.is_empty()
        {
            return true;
        }
        let translucent = props.opacity < 1.0 || self.opacity_is_animating(id);
        translucent && !props.preserves_3d && self.descendant_draws_content_at(id.idx)
    }

    /// Walks the tree under `root`, attaching surfaces where needed and
    /// dropping those no longer needed.
    ///
    /// The root always gets a surface. Every visited layer's render target is
    /// set to the nearest surface-owning ancestor (or itself). Returns the
    /// surface owners in pre-order.
    pub fn prepare_render_surfaces(&mut self, root: LayerId) -> Vec<LayerId> {
        self.validate(root);
        let mut owners = Vec::new();
        let mut stack = Vec::new();
        stack.push((root.idx, INVALID));
        while let Some((idx, target)) = stack.pop() {
            let id = self.handle(idx);
            let needs = idx == root.idx || self.needs_render_surface(id);
            let i = idx as usize;
            let target = if needs {
                if self.render_surface[i].is_none() {
                    self.render_surface[i] = Some(RenderSurface::new(id));
                }
                owners.push(id);
                idx
            } else {
                self.render_surface[i] = None;
                target
            };
            self.render_target[i] = target;
            for &child in self.children[i].iter().rev() {
                stack.push((child, target));
            }
        }
        owners
    }

    /// Whether any descendant is fixed to its container.
    #[must_use]
    pub fn descendant_is_fixed_to_container_layer(&self, id: LayerId) -> bool {
        self.validate(id);
        self.descendant_fixed_at(id.idx)
    }

    /// Sets whether fixed-position descendants are positioned against this
    /// layer.
    ///
    /// When the host already has a commit pending, the change simply rides
    /// along with it. Otherwise a commit is only requested if some descendant
    /// is fixed to its container, since nothing else observes the flag.
    pub fn set_is_container_for_fixed_position_layers(&mut self, id: LayerId, is_container: bool) {
        if !self.update(
            id,
            |p| &mut p.is_container_for_fixed_position_layers,
            is_container,
        ) {
            return;
        }
        self.dirty.mark(id.idx, crate::dirty::PROPERTIES);
        if self.host_at(id.idx).is_some_and(|h| h.commit_requested()) {
            return;
        }
        if self.descendant_fixed_at(id.idx) {
            self.request_commit(id.idx);
        }
    }

    fn descendant_draws_content_at(&self, idx: u32) -> bool {
        self.children[idx as usize]
            .iter()
            .any(|&c| self.draws_content_at(c) || self.descendant_draws_content_at(c))
    }

    fn descendant_fixed_at(&self, idx: u32) -> bool {
        self.children[idx as usize].iter().any(|&c| {
            self.props[c as usize].fixed_to_container_layer || self.descendant_fixed_at(c)
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;

    use super::*;
    use crate::filter::{FilterOperation, FilterOperations};
    use crate::host::{LayerTreeHost, SimpleHost};

    #[test]
    fn create_surface_targets_self() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        assert!(store.render_surface(id).is_none());
        store.create_render_surface(id).draw_opacity = 0.5;
        assert_eq!(store.render_target(id), Some(id));
        assert_eq!(store.render_surface(id).map(|s| s.draw_opacity), Some(0.5));

        store.clear_render_surface(id);
        assert!(store.render_surface(id).is_none());
    }

    #[test]
    #[should_panic(expected = "layer already has a render surface")]
    fn double_create_panics() {
        let mut store = LayerStore::new();
        let id = store.create_layer();
        store.create_render_surface(id);
        store.create_render_surface(id);
    }

    #[test]
    fn descendant_draws_content_looks_below() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let child = store.create_layer();
        let leaf = store.create_layer();
        store.add_child(root, child);
        store.add_child(child, leaf);
        store.set_is_drawable(root, true);
        assert!(!store.descendant_draws_content(root));
        store.set_is_drawable(leaf, true);
        assert!(store.descendant_draws_content(root));
        assert!(!store.descendant_draws_content(leaf));
    }

    #[test]
    fn surface_needs() {
        let mut store = LayerStore::new();
        let group = store.create_layer();
        let leaf = store.create_layer();
        store.add_child(group, leaf);
        store.set_is_drawable(leaf, true);
        assert!(!store.needs_render_surface(group));

        store.set_opacity(group, 0.5);
        assert!(store.needs_render_surface(group));
        store.set_preserves_3d(group, true);
        assert!(!store.needs_render_surface(group));

        store.set_filters(leaf, FilterOperations::new().with(FilterOperation::Invert(1.0)));
        assert!(store.needs_render_surface(leaf));
    }

    #[test]
    fn prepare_assigns_targets() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let group = store.create_layer();
        let a = store.create_layer();
        let b = store.create_layer();
        store.add_child(root, group);
        store.set_children(group, &[a, b]);
        store.set_is_drawable(a, true);
        store.set_opacity(group, 0.5);

        let owners = store.prepare_render_surfaces(root);
        assert_eq!(owners, vec![root, group]);
        assert_eq!(store.render_target(group), Some(group));
        assert_eq!(store.render_target(a), Some(group));
        assert_eq!(store.render_target(root), Some(root));

        store.set_opacity(group, 1.0);
        let owners = store.prepare_render_surfaces(root);
        assert_eq!(owners, vec![root]);
        assert!(store.render_surface(group).is_none());
        assert_eq!(store.render_target(b), Some(root));
    }

    #[test]
    fn fixed_container_short_circuits_on_pending_commit() {
        let mut store = LayerStore::new();
        let host = Rc::new(SimpleHost::new());
        let root = store.create_layer();
        let child = store.create_layer();
        store.set_host(root, &host);
        store.add_child(root, child);
        host.take_commit_request();
        host.reset_counters();

        // No fixed descendant: nothing requested.
        store.set_is_container_for_fixed_position_layers(root, true);
        assert_eq!(host.commit_requests(), 0);

        store.set_fixed_to_container_layer(child, true);
        assert_eq!(host.commit_requests(), 1);

        // A commit is already pending, so the scan is skipped.
        store.set_is_container_for_fixed_position_layers(root, false);
        assert_eq!(host.commit_requests(), 1);
        assert!(!store.is_container_for_fixed_position_layers(root));

        host.take_commit_request();
        store.set_is_container_for_fixed_position_layers(root, true);
        assert_eq!(host.commit_requests(), 2);
        assert!(host.commit_requested());
    }
}
