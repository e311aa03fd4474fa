// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The main-side [`LayerStore`](crate::layer::LayerStore) records which
//! layers changed between commits with [`understory_dirty`]. Both channels are
//! local-only: marking a layer never marks its descendants, because a commit
//! pushes every layer anyway and the channels only decide *how much* of the
//! mirror tree has to be rebuilt and what gets reported.
//!
//! - [`PROPERTIES`]: any commit-visible property (or damage) changed on the
//!   layer. Drained by [`LayerStore::commit`](crate::layer::LayerStore::commit)
//!   into [`CommitChanges::changed`](crate::sync::CommitChanges::changed).
//! - [`TOPOLOGY`]: children, mask, or replica changed, or a layer was
//!   destroyed. A non-empty drain makes the next commit rebuild the mirror
//!   structure before pushing properties.

use understory_dirty::Channel;

/// A commit-visible property or the pending damage of a layer changed.
pub const PROPERTIES: Channel = Channel::new(0);

/// Tree structure changed; the mirror structure must be rebuilt.
pub const TOPOLOGY: Channel = Channel::new(1);
