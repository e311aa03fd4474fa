// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// An iterator over the direct children of a layer, in stacking order.
///
/// Created by [`LayerStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a LayerStore,
    inner: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a LayerStore, slots: &'a [u32]) -> Self {
        Self {
            store,
            inner: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        self.inner.next().map(|&idx| self.store.handle(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<LayerId> {
        self.inner.next_back().map(|&idx| self.store.handle(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// A pre-order walk over a layer and its descendants.
///
/// Only ordinary children are visited; masks and replicas are not part of the
/// walk. Created by [`LayerStore::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    store: &'a LayerStore,
    stack: Vec<u32>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(store: &'a LayerStore, root: u32) -> Self {
        let mut stack = Vec::new();
        if root != INVALID {
            stack.push(root);
        }
        Self { store, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.store.children[idx as usize].iter().rev().copied());
        Some(self.store.handle(idx))
    }
}
