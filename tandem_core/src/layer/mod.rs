// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Main-side layer tree.
//!
//! A *layer* is a node in a compositing tree. Each layer has:
//!
//! - A handle ([`LayerId`]): generational, so it becomes stale when the layer
//!   is destroyed and can never alias a later layer in the same slot.
//! - An id ([`LayerKey`]): shared with the layer's mirror on the compositor.
//! - A [`LayerKind`], fixed at creation.
//! - Topology: an ordered child list, a non-owning parent index, and optional
//!   [mask](LayerStore::set_mask_layer) and
//!   [replica](LayerStore::set_replica_layer) layers kept outside the child
//!   list.
//! - Properties: geometry, visual state, scroll state, and fixed-position
//!   flags, all set through compare-then-request-commit setters.
//! - Pending change state: damage ([`set_needs_display_rect`]), a one-shot
//!   stacking-order flag, and a changed flag for the non-fast-scrollable
//!   region. The commit consumes all three.
//! - An [`AnimationController`](crate::animation::AnimationController).
//! - A weak reference to the tree's [`LayerTreeHost`](crate::host::LayerTreeHost).
//!
//! Layers are stored in struct-of-arrays layout with index-based handles.
//!
//! # Dirty tracking
//!
//! Mutations mark [`dirty`](crate::dirty) channels as a side effect:
//!
//! - **PROPERTIES**: the layer itself changed. Reported by the next commit.
//! - **TOPOLOGY**: a child list, mask, or replica changed, or a layer was
//!   created or destroyed. The next commit rebuilds the mirror structure.
//!
//! [`set_needs_display_rect`]: LayerStore::set_needs_display_rect

mod animation;
mod damage;
mod id;
mod kind;
mod properties;
mod store;
mod surface;
mod traverse;

pub use id::{INVALID, IdAllocator, LayerId, LayerKey};
pub use kind::{LayerKind, ScrollbarOrientation};
pub use store::LayerStore;
pub use surface::RenderSurface;
pub use traverse::{Children, Descendants};

pub(crate) use damage::unite;
