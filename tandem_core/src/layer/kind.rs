// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed set of layer variants.

use super::id::LayerKey;

/// Axis a scrollbar tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollbarOrientation {
    /// Tracks horizontal scroll.
    Horizontal,
    /// Tracks vertical scroll.
    Vertical,
}

/// What a layer draws.
///
/// The kind is fixed at creation and decides which mirror variant the commit
/// builds for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Ordinary content supplied by the embedder.
    #[default]
    Content,
    /// A scrollbar whose thumb follows another layer's scroll offset.
    ///
    /// The compositor recomputes the thumb geometry from the scroll layer's
    /// mirror every commit and every compositor-side scroll.
    Scrollbar {
        /// Id of the layer being scrolled.
        scroll_layer: LayerKey,
        /// Which axis to track.
        orientation: ScrollbarOrientation,
    },
}

impl LayerKind {
    /// `true` for [`LayerKind::Scrollbar`].
    #[must_use]
    pub const fn is_scrollbar(&self) -> bool {
        matches!(self, Self::Scrollbar { .. })
    }
}
