// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositor-side mirror of a layer tree.
//!
//! A [`MirrorTree`] is rebuilt and refreshed by
//! [`LayerStore::commit`](crate::layer::LayerStore::commit) and otherwise
//! belongs to the compositor, which animates it, scrolls it, and draws from
//! it. Mirrors are matched to main-side layers by [`LayerKey`](crate::layer::LayerKey).

mod layer;
mod tree;

pub use layer::{MirrorLayer, ScrollbarGeometry};
pub use tree::{MirrorTree, ScrollDelta};
