// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dual layer trees kept in step by a commit.
//!
//! `tandem_core` splits a compositing layer tree in two. The main side owns a
//! [`LayerStore`](layer::LayerStore) that application code mutates freely.
//! The compositor side owns a [`MirrorTree`](mirror::MirrorTree) that it
//! animates, scrolls, and draws from. The two only meet in the commit, which
//! copies main-side state into the mirrors while leaving alone whatever the
//! compositor drives itself. The crate is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   application
//!       │ setters, insert_child, add_animation, set_needs_display_rect
//!       ▼
//!   LayerStore ──► LayerTreeHost::set_needs_commit() ──► (scheduler)
//!       │                                                    │
//!       │ ◄──────────────── LayerStore::commit() ◄───────────┘
//!       ▼
//!   MirrorTree ──► animate() / scroll_by() ──► AnimationEvent, ScrollDelta
//!                                                    │
//!       ┌────────────────────────────────────────────┘
//!       ▼
//!   LayerStore::dispatch_animation_events() / apply_scroll_deltas()
//! ```
//!
//! **[`layer`]**: struct-of-arrays main-side tree with generational handles,
//! process-wide ids, damage, render surfaces, and the animation binding.
//!
//! **[`mirror`]**: the compositor-side tree, keyed by the ids layers share
//! with their mirrors.
//!
//! **[`sync`]**: the commit itself and [`CommitChanges`](sync::CommitChanges).
//!
//! **[`animation`]**: keyframed animations, their controllers, and the events
//! the compositor sends back.
//!
//! **[`dirty`]**: channels recording what changed between commits, via
//! `understory_dirty`.
//!
//! **[`host`]**: the [`LayerTreeHost`](host::LayerTreeHost) callbacks and a
//! coalescing [`SimpleHost`](host::SimpleHost).
//!
//! **[`trace`]**: [`CommitSink`](trace::CommitSink) and the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! Value types live in [`color`], [`filter`], [`region`], [`settings`], and
//! [`transform`].
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   deferred-property and damage-merge events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod animation;
pub mod color;
pub mod dirty;
pub mod filter;
pub mod host;
pub mod layer;
pub mod mirror;
pub mod region;
pub mod settings;
pub mod sync;
pub mod trace;
pub mod transform;
