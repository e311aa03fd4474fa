// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, identity, host, and topology
//! management.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::animation::AnimationController;
use crate::dirty;
use crate::host::LayerTreeHost;
use crate::settings::LayerTreeSettings;

use super::id::{INVALID, IdAllocator, LayerId, LayerKey};
use super::kind::{LayerKind, ScrollbarOrientation};
use super::properties::LayerProperties;
use super::surface::RenderSurface;
use super::traverse::{Children, Descendants};

/// Struct-of-arrays storage for the main-side layer tree.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer occupies
/// a slot in parallel arrays. Destroyed layers are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// A store may hold several disjoint trees; each root that should reach a
/// compositor gets a host with [`set_host`](Self::set_host) and is committed
/// with [`commit`](Self::commit).
///
/// The store is deliberately `!Send`: hosts are shared with `Rc`. Only the
/// [`MirrorTree`](crate::mirror::MirrorTree) crosses threads.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) mask: Vec<u32>,
    pub(crate) replica: Vec<u32>,
    /// For a layer installed as a mask or replica, the layer it is installed on.
    pub(crate) special_owner: Vec<u32>,

    // -- Identity --
    pub(crate) key: Vec<LayerKey>,
    pub(crate) kind: Vec<LayerKind>,
    pub(crate) keys: BTreeMap<LayerKey, u32>,
    ids: IdAllocator,

    // -- Per-layer state --
    pub(crate) props: Vec<LayerProperties>,
    pub(crate) animations: Vec<AnimationController>,
    pub(crate) host: Vec<Option<Weak<dyn LayerTreeHost>>>,
    pub(crate) render_surface: Vec<Option<RenderSurface>>,
    pub(crate) render_target: Vec<u32>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    /// `false` for slots sitting in the free list.
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    pub(crate) settings: LayerTreeSettings,
    pub(crate) commit_count: u64,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(LayerTreeSettings::default())
    }

    /// Creates an empty layer store with the given settings.
    #[must_use]
    pub fn with_settings(settings: LayerTreeSettings) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            mask: Vec::new(),
            replica: Vec::new(),
            special_owner: Vec::new(),
            key: Vec::new(),
            kind: Vec::new(),
            keys: BTreeMap::new(),
            ids: IdAllocator::new(),
            props: Vec::new(),
            animations: Vec::new(),
            host: Vec::new(),
            render_surface: Vec::new(),
            render_target: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            settings,
            commit_count: 0,
        }
    }

    /// Returns the settings this store was created with.
    #[must_use]
    pub fn settings(&self) -> LayerTreeSettings {
        self.settings
    }

    // -- Allocation API --

    /// Creates a new content layer and returns its handle.
    ///
    /// The layer starts detached, hostless, and with default properties: zero
    /// bounds, centered anchor, identity transforms, full opacity.
    pub fn create_layer(&mut self) -> LayerId {
        self.allocate(LayerKind::Content)
    }

    /// Creates a scrollbar layer tracking the layer with id `scroll_layer`.
    pub fn create_scrollbar_layer(
        &mut self,
        scroll_layer: LayerKey,
        orientation: ScrollbarOrientation,
    ) -> LayerId {
        self.allocate(LayerKind::Scrollbar {
            scroll_layer,
            orientation,
        })
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// Children are detached (not destroyed), and the mask and replica are
    /// uninstalled. The layer's id is retired.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if the layer still has a parent, or if
    /// it is installed as another layer's mask or replica. Detach it first.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.parent[idx as usize] == INVALID,
            "cannot destroy a layer that still has a parent"
        );
        assert!(
            self.special_owner[idx as usize] == INVALID,
            "cannot destroy a layer installed as a mask or replica"
        );

        self.remove_all_children(id);
        self.set_mask_layer(id, None);
        self.set_replica_layer(id, None);

        self.host[idx as usize] = None;
        self.render_surface[idx as usize] = None;
        let key = self.key[idx as usize];
        if self.keys.get(&key) == Some(&idx) {
            self.keys.remove(&key);
        }

        // Remove dirty tracking state.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.alive[idx as usize] = false;
        self.free_list.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Identity --

    /// Returns the id shared by the layer and its mirror.
    #[must_use]
    pub fn key(&self, id: LayerId) -> LayerKey {
        self.validate(id);
        self.key[id.idx as usize]
    }

    /// Returns the layer's kind.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> LayerKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Resolves an id to a live layer.
    ///
    /// After id wraparound two live layers can share an id; the most recently
    /// created one wins.
    #[must_use]
    pub fn layer_by_key(&self, key: LayerKey) -> Option<LayerId> {
        self.keys.get(&key).map(|&idx| self.handle(idx))
    }

    // -- Host --

    /// Installs `host` on a root layer and every layer reachable from it.
    ///
    /// Layers that already carry active animations report them with
    /// [`did_add_animation`](LayerTreeHost::did_add_animation).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer is not a root.
    pub fn set_host<H: LayerTreeHost + 'static>(&mut self, root: LayerId, host: &Rc<H>) {
        self.validate(root);
        assert!(
            self.up(root.idx) == INVALID,
            "a host can only be installed on a root layer"
        );
        let weak: Weak<dyn LayerTreeHost> = Rc::<H>::downgrade(host);
        self.set_host_recursive(root.idx, Some(&weak));
    }

    /// Removes the host from a root layer and every layer reachable from it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer is not a root.
    pub fn clear_host(&mut self, root: LayerId) {
        self.validate(root);
        assert!(
            self.up(root.idx) == INVALID,
            "a host can only be removed from a root layer"
        );
        self.set_host_recursive(root.idx, None);
    }

    /// Returns the layer's host, if one is installed and still alive.
    #[must_use]
    pub fn host(&self, id: LayerId) -> Option<Rc<dyn LayerTreeHost>> {
        self.validate(id);
        self.host_at(id.idx)
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s children.
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        let index = self.children[parent.idx as usize].len();
        self.insert_child(parent, child, index);
    }

    /// Inserts `child` into `parent`'s children at `index`.
    ///
    /// The child is first detached from any previous parent (which may be
    /// `parent` itself), then `index` is clamped to the resulting child count.
    /// The child's subtree takes on `parent`'s host and the child is flagged
    /// as having changed stacking order.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` is `parent` or one of its
    /// ancestors, or if `child` is installed as a mask or replica. The tree is
    /// left untouched when this panics.
    pub fn insert_child(&mut self, parent: LayerId, child: LayerId, index: usize) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        self.assert_insertable(p, c);

        self.detach(c);

        let index = index.min(self.children[p as usize].len());
        self.parent[c as usize] = p;
        let host = self.host[p as usize].clone();
        self.set_host_recursive(c, host.as_ref());
        self.props[c as usize].stacking_order_changed = true;
        self.children[p as usize].insert(index, c);

        self.dirty.mark(c, dirty::PROPERTIES);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.request_commit(p);
    }

    /// Detaches `child` from its parent. Does nothing for a parentless layer.
    ///
    /// The detached subtree loses its host.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        self.detach(child.idx);
    }

    /// Detaches `child` if it is a child of `parent`; otherwise does nothing.
    pub fn remove_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] == parent.idx {
            self.detach(child.idx);
        }
    }

    /// Replaces `reference` with `new_layer` at the same index, or just
    /// removes `reference` when `new_layer` is `None`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, if `reference` is not a child of
    /// `parent`, or if `new_layer` could not be inserted under `parent`.
    pub fn replace_child(
        &mut self,
        parent: LayerId,
        reference: LayerId,
        new_layer: Option<LayerId>,
    ) {
        self.validate(parent);
        self.validate(reference);
        assert!(
            self.parent[reference.idx as usize] == parent.idx,
            "reference layer is not a child of parent"
        );
        if new_layer == Some(reference) {
            return;
        }
        if let Some(new_layer) = new_layer {
            self.validate(new_layer);
            self.assert_insertable(parent.idx, new_layer.idx);
        }

        let index = self
            .index_of_child(parent, reference)
            .unwrap_or(self.children[parent.idx as usize].len());
        self.detach(reference.idx);
        if let Some(new_layer) = new_layer {
            self.insert_child(parent, new_layer, index);
        }
    }

    /// Replaces all children of `parent` with `children`, in order.
    ///
    /// Does nothing if the list equals the current children.
    ///
    /// # Panics
    ///
    /// Panics if any entry could not be inserted under `parent`. Every entry
    /// is checked first, so the tree is left untouched when this panics.
    pub fn set_children(&mut self, parent: LayerId, children: &[LayerId]) {
        self.validate(parent);
        for &child in children {
            self.validate(child);
            self.assert_insertable(parent.idx, child.idx);
        }
        let current = &self.children[parent.idx as usize];
        if current.len() == children.len()
            && current.iter().zip(children).all(|(&idx, c)| idx == c.idx)
        {
            return;
        }
        self.remove_all_children(parent);
        for &child in children {
            self.add_child(parent, child);
        }
    }

    /// Detaches every child of `parent`, first to last.
    pub fn remove_all_children(&mut self, parent: LayerId) {
        self.validate(parent);
        while let Some(&first) = self.children[parent.idx as usize].first() {
            self.detach(first);
        }
    }

    /// Returns the parent of a layer, if any.
    ///
    /// Masks and replicas have no parent; see [`is_special`](Self::is_special).
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a layer.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: LayerId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    /// Returns the position of `child` among `parent`'s children.
    #[must_use]
    pub fn index_of_child(&self, parent: LayerId, child: LayerId) -> Option<usize> {
        self.validate(parent);
        self.validate(child);
        self.children[parent.idx as usize]
            .iter()
            .position(|&c| c == child.idx)
    }

    /// Returns a pre-order iterator over `id` and its descendants.
    #[must_use]
    pub fn descendants(&self, id: LayerId) -> Descendants<'_> {
        self.validate(id);
        Descendants::new(self, id.idx)
    }

    /// Walks up to the root of the tree containing `id`.
    ///
    /// A mask or replica leads to the layer it is installed on.
    #[must_use]
    pub fn root_layer(&self, id: LayerId) -> LayerId {
        self.validate(id);
        let mut idx = id.idx;
        loop {
            let up = self.up(idx);
            if up == INVALID {
                return self.handle(idx);
            }
            idx = up;
        }
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn has_ancestor(&self, id: LayerId, ancestor: LayerId) -> bool {
        self.validate(id);
        self.validate(ancestor);
        self.has_ancestor_idx(id.idx, ancestor.idx)
    }

    // -- Mask and replica --

    /// Installs `mask` as the mask of `id`, replacing any previous mask.
    ///
    /// The previous mask loses its host; the new one takes on `id`'s host and
    /// is flagged as a mask. A layer installed on another owner is moved.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, if `mask` has a parent, or if `mask` is
    /// `id` or one of its ancestors.
    pub fn set_mask_layer(&mut self, id: LayerId, mask: Option<LayerId>) {
        self.set_special(id, mask, SpecialSlot::Mask);
    }

    /// Installs `replica` as the replica of `id`, replacing any previous one.
    ///
    /// # Panics
    ///
    /// Same conditions as [`set_mask_layer`](Self::set_mask_layer).
    pub fn set_replica_layer(&mut self, id: LayerId, replica: Option<LayerId>) {
        self.set_special(id, replica, SpecialSlot::Replica);
    }

    /// Returns the mask installed on `id`.
    #[must_use]
    pub fn mask_layer(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let m = self.mask[id.idx as usize];
        (m != INVALID).then(|| self.handle(m))
    }

    /// Returns the replica installed on `id`.
    #[must_use]
    pub fn replica_layer(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let r = self.replica[id.idx as usize];
        (r != INVALID).then(|| self.handle(r))
    }

    /// Returns `true` if the layer is currently installed as a mask or
    /// replica.
    #[must_use]
    pub fn is_special(&self, id: LayerId) -> bool {
        self.validate(id);
        self.special_owner[id.idx as usize] != INVALID
    }

    // -- Internal helpers --

    fn assert_insertable(&self, parent: u32, child: u32) {
        assert!(
            parent != child && !self.has_ancestor_idx(parent, child),
            "cannot insert a layer under itself or one of its descendants"
        );
        assert!(
            self.special_owner[child as usize] == INVALID,
            "cannot insert a layer installed as a mask or replica"
        );
    }

    fn allocate(&mut self, kind: LayerKind) -> LayerId {
        let key = self.ids.allocate();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.mask[i] = INVALID;
            self.replica[i] = INVALID;
            self.special_owner[i] = INVALID;
            self.key[i] = key;
            self.kind[i] = kind;
            self.props[i] = LayerProperties::default();
            self.animations[i] = AnimationController::for_layer(key);
            self.host[i] = None;
            self.render_surface[i] = None;
            self.render_target[i] = INVALID;
            self.alive[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.mask.push(INVALID);
            self.replica.push(INVALID);
            self.special_owner.push(INVALID);
            self.key.push(key);
            self.kind.push(kind);
            self.props.push(LayerProperties::default());
            self.animations.push(AnimationController::for_layer(key));
            self.host.push(None);
            self.render_surface.push(None);
            self.render_target.push(INVALID);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.keys.insert(key, idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds a handle for a live slot.
    pub(crate) fn handle(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// The structural parent: the tree parent, or the owner of a mask/replica.
    pub(crate) fn up(&self, idx: u32) -> u32 {
        let p = self.parent[idx as usize];
        if p == INVALID {
            self.special_owner[idx as usize]
        } else {
            p
        }
    }

    fn has_ancestor_idx(&self, idx: u32, ancestor: u32) -> bool {
        let mut cur = self.up(idx);
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.up(cur);
        }
        false
    }

    pub(crate) fn host_at(&self, idx: u32) -> Option<Rc<dyn LayerTreeHost>> {
        self.host[idx as usize].as_ref().and_then(Weak::upgrade)
    }

    /// Marks the layer's properties dirty and asks its host for a commit.
    pub(crate) fn request_commit(&mut self, idx: u32) {
        self.dirty.mark(idx, dirty::PROPERTIES);
        if let Some(host) = self.host_at(idx) {
            host.set_needs_commit();
        }
    }

    /// Removes `idx` from its parent's child list, if it has a parent.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        self.children[p as usize].retain(|&c| c != idx);
        self.parent[idx as usize] = INVALID;
        self.set_host_recursive(idx, None);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.request_commit(p);
    }

    fn set_special(&mut self, id: LayerId, layer: Option<LayerId>, slot: SpecialSlot) {
        self.validate(id);
        let o = id.idx;
        let new = match layer {
            Some(layer) => {
                self.validate(layer);
                layer.idx
            }
            None => INVALID,
        };
        let old = match slot {
            SpecialSlot::Mask => self.mask[o as usize],
            SpecialSlot::Replica => self.replica[o as usize],
        };
        if old == new {
            return;
        }
        if new != INVALID {
            assert!(
                self.parent[new as usize] == INVALID,
                "a mask or replica layer cannot have a parent"
            );
            assert!(
                new != o && !self.has_ancestor_idx(o, new),
                "cannot install a layer on itself or one of its descendants"
            );
            self.uninstall(new);
        }

        if old != INVALID {
            self.special_owner[old as usize] = INVALID;
            self.set_host_recursive(old, None);
        }
        match slot {
            SpecialSlot::Mask => self.mask[o as usize] = new,
            SpecialSlot::Replica => self.replica[o as usize] = new,
        }
        if new != INVALID {
            self.special_owner[new as usize] = o;
            let host = self.host[o as usize].clone();
            self.set_host_recursive(new, host.as_ref());
            if slot == SpecialSlot::Mask {
                self.props[new as usize].is_mask = true;
            }
        }

        self.dirty.mark(o, dirty::TOPOLOGY);
        self.request_commit(o);
    }

    /// Removes `idx` from the mask or replica slot it occupies, if any.
    fn uninstall(&mut self, idx: u32) {
        let owner = self.special_owner[idx as usize];
        if owner == INVALID {
            return;
        }
        if self.mask[owner as usize] == idx {
            self.mask[owner as usize] = INVALID;
        }
        if self.replica[owner as usize] == idx {
            self.replica[owner as usize] = INVALID;
        }
        self.special_owner[idx as usize] = INVALID;
        self.dirty.mark(owner, dirty::TOPOLOGY);
        self.request_commit(owner);
    }

    /// Installs `host` on `idx` and everything reachable below it.
    ///
    /// Stops descending at layers that already carry the same host.
    fn set_host_recursive(&mut self, idx: u32, host: Option<&Weak<dyn LayerTreeHost>>) {
        let same = match (&self.host[idx as usize], host) {
            (None, None) => true,
            (Some(current), Some(new)) => Weak::ptr_eq(current, new),
            _ => false,
        };
        if same {
            return;
        }
        self.host[idx as usize] = host.cloned();

        for n in 0..self.children[idx as usize].len() {
            let child = self.children[idx as usize][n];
            self.set_host_recursive(child, host);
        }
        let mask = self.mask[idx as usize];
        if mask != INVALID {
            self.set_host_recursive(mask, host);
        }
        let replica = self.replica[idx as usize];
        if replica != INVALID {
            self.set_host_recursive(replica, host);
        }

        if self.animations[idx as usize].has_active_animation()
            && let Some(host) = self.host_at(idx)
        {
            host.did_add_animation();
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpecialSlot {
    Mask,
    Replica,
}
