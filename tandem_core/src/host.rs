// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owner of a layer tree, as seen from the layers.
//!
//! Layers never own their host. The [`LayerStore`](crate::layer::LayerStore)
//! keeps a [`Weak`](alloc::rc::Weak) reference per layer, installed on the
//! root with [`set_host`](crate::layer::LayerStore::set_host) and propagated
//! through every reachable layer (children, masks, and replicas). Requests to a
//! host that has been dropped are silently discarded.

use core::cell::Cell;

/// Callbacks a layer tree makes into the object that schedules its commits.
///
/// Methods take `&self` because the host is shared behind `Rc` with every
/// layer of the tree; implementations use interior mutability.
pub trait LayerTreeHost {
    /// Requests that a commit happen at some later point.
    ///
    /// Hosts are expected to coalesce: many requests between two commits
    /// produce a single commit.
    fn set_needs_commit(&self);

    /// Called when an animation is added to a layer of this tree, or when a
    /// layer with running animations joins the tree.
    fn did_add_animation(&self) {}

    /// Returns `true` if a commit has been requested and not yet performed.
    fn commit_requested(&self) -> bool;

    /// Called with `true` when a layer acquires a non-empty filter chain.
    fn set_needs_filter_context(&self, needs: bool) {
        _ = needs;
    }
}

/// A single-threaded host that coalesces commit requests.
///
/// `SimpleHost` counts raw requests and *scheduled* commits separately: only
/// the transition from "no commit pending" to "commit pending" schedules one.
/// [`take_commit_request`](Self::take_commit_request) consumes the pending
/// flag, as a scheduler would when it starts a commit.
#[derive(Debug, Default)]
pub struct SimpleHost {
    needs_commit: Cell<bool>,
    commit_requests: Cell<u32>,
    scheduled_commits: Cell<u32>,
    animations_added: Cell<u32>,
    needs_filter_context: Cell<bool>,
}

impl SimpleHost {
    /// Creates a host with no pending commit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the pending-commit flag, returning whether it was set.
    pub fn take_commit_request(&self) -> bool {
        self.needs_commit.replace(false)
    }

    /// Number of [`set_needs_commit`](LayerTreeHost::set_needs_commit) calls.
    #[must_use]
    pub fn commit_requests(&self) -> u32 {
        self.commit_requests.get()
    }

    /// Number of commits actually scheduled after coalescing.
    #[must_use]
    pub fn scheduled_commits(&self) -> u32 {
        self.scheduled_commits.get()
    }

    /// Number of [`did_add_animation`](LayerTreeHost::did_add_animation) calls.
    #[must_use]
    pub fn animations_added(&self) -> u32 {
        self.animations_added.get()
    }

    /// Whether any layer asked for a filter context.
    #[must_use]
    pub fn needs_filter_context(&self) -> bool {
        self.needs_filter_context.get()
    }

    /// Zeroes every counter. The pending-commit flag is left alone.
    pub fn reset_counters(&self) {
        self.commit_requests.set(0);
        self.scheduled_commits.set(0);
        self.animations_added.set(0);
    }
}

impl LayerTreeHost for SimpleHost {
    fn set_needs_commit(&self) {
        self.commit_requests.set(self.commit_requests.get() + 1);
        if !self.needs_commit.replace(true) {
            self.scheduled_commits.set(self.scheduled_commits.get() + 1);
        }
    }

    fn did_add_animation(&self) {
        self.animations_added.set(self.animations_added.get() + 1);
    }

    fn commit_requested(&self) -> bool {
        self.needs_commit.get()
    }

    fn set_needs_filter_context(&self, needs: bool) {
        if needs {
            self.needs_filter_context.set(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_until_taken() {
        let host = SimpleHost::new();
        host.set_needs_commit();
        host.set_needs_commit();
        host.set_needs_commit();
        assert_eq!(host.commit_requests(), 3);
        assert_eq!(host.scheduled_commits(), 1);
        assert!(host.commit_requested());

        assert!(host.take_commit_request());
        assert!(!host.commit_requested());
        host.set_needs_commit();
        assert_eq!(host.scheduled_commits(), 2);
    }

    #[test]
    fn reset_keeps_pending_flag() {
        let host = SimpleHost::new();
        host.set_needs_commit();
        host.did_add_animation();
        host.reset_counters();
        assert_eq!(host.commit_requests(), 0);
        assert_eq!(host.animations_added(), 0);
        assert!(host.commit_requested());
    }
}
