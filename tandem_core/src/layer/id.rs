// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity: store handles and process-wide ids.

use core::fmt;

/// Sentinel value indicating "no layer" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a layer in a [`LayerStore`](super::LayerStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a layer is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl LayerId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@gen{})", self.idx, self.generation)
    }
}

/// The id shared by a layer and its mirror.
///
/// Unlike [`LayerId`], a `LayerKey` means the same thing on both sides of the
/// commit: the mirror tree is keyed by it, and compositor feedback (scroll
/// deltas, animation events) names layers by it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey(pub i32);

impl fmt::Debug for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerKey({})", self.0)
    }
}

/// Hands out [`LayerKey`]s.
///
/// Ids count up from 1. When the counter overflows `i32` it restarts at 1, so
/// a process that creates more than `i32::MAX` layers can see a new layer
/// share an id with one still alive. That collision is accepted rather than
/// paying for a liveness check on every allocation.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: i32,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Creates an allocator whose first id is `next` (clamped to at least 1).
    #[must_use]
    pub const fn starting_at(next: i32) -> Self {
        Self {
            next: if next < 1 { 1 } else { next },
        }
    }

    /// Returns the next id.
    pub fn allocate(&mut self) -> LayerKey {
        let id = self.next;
        self.next = if id == i32::MAX { 1 } else { id + 1 };
        LayerKey(id)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_count_from_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), LayerKey(1));
        assert_eq!(ids.allocate(), LayerKey(2));
    }

    #[test]
    fn overflow_restarts_at_one() {
        let mut ids = IdAllocator::starting_at(i32::MAX);
        assert_eq!(ids.allocate(), LayerKey(i32::MAX));
        assert_eq!(ids.allocate(), LayerKey(1));
        assert_eq!(ids.allocate(), LayerKey(2));
    }

    #[test]
    fn non_positive_start_is_clamped() {
        let mut ids = IdAllocator::starting_at(-5);
        assert_eq!(ids.allocate(), LayerKey(1));
    }
}
