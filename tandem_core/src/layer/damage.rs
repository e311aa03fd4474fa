// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending damage on the main side.
//!
//! Damage accumulates as a single bounding rect per layer. A commit hands the
//! rect to the mirror (where it is united with whatever the compositor has not
//! drawn yet) and resets it.

use kurbo::Rect;

use super::id::LayerId;
use super::store::LayerStore;

impl LayerStore {
    /// Marks `rect` (in layer space) as needing a redraw.
    ///
    /// The rect is united into the pending update rect. A non-empty rect also
    /// sets the needs-display flag. A commit is always requested, even for an
    /// empty rect.
    pub fn set_needs_display_rect(&mut self, id: LayerId, rect: Rect) {
        self.validate(id);
        let props = &mut self.props[id.idx as usize];
        props.update_rect = unite(props.update_rect, rect);
        if !rect.is_zero_area() {
            props.needs_display = true;
        }
        self.request_commit(id.idx);
    }

    /// Marks the whole layer as needing a redraw.
    pub fn set_needs_display(&mut self, id: LayerId) {
        self.validate(id);
        let bounds = self.props[id.idx as usize].bounds;
        self.set_needs_display_rect(id, bounds.to_rect());
    }

    /// Whether the layer has content waiting to be repainted.
    #[must_use]
    pub fn needs_display(&self, id: LayerId) -> bool {
        self.validate(id);
        self.props[id.idx as usize].needs_display
    }

    /// Damage accumulated since the last commit.
    #[must_use]
    pub fn update_rect(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.props[id.idx as usize].update_rect
    }

    /// Clears the needs-display flag once the content has been repainted.
    ///
    /// Pending damage is left for the next commit.
    pub fn reset_needs_display(&mut self, id: LayerId) {
        self.validate(id);
        self.props[id.idx as usize].needs_display = false;
    }
}

/// Bounding union that ignores zero-area operands.
pub(crate) fn unite(a: Rect, b: Rect) -> Rect {
    match (a.is_zero_area(), b.is_zero_area()) {
        (true, _) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}
