// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor-driven animations of opacity and transform.
//!
//! Every layer owns one [`AnimationController`]. The main side adds, pauses,
//! and removes [`Animation`]s; each commit pushes the controller's state to
//! the matching mirror layer with
//! [`push_animation_updates_to`](AnimationController::push_animation_updates_to).
//! The compositor ticks its copies with
//! [`animate`](AnimationController::animate) and reports lifecycle changes
//! back as [`AnimationEvent`]s.
//!
//! While a property has an unfinished animation, the commit leaves the
//! mirror's value for that property alone: the compositor owns it. A
//! [`Finished`](AnimationEventKind::Finished) event delivered to the main side
//! removes the animation there, handing the property back.
//!
//! # Run states
//!
//! ```text
//!   WaitingForTargetAvailability ──► Running ──► Finished
//!                                      ▲  │
//!                                      │  ▼
//!                                     Paused
//! ```
//!
//! `Aborted` is terminal and only set explicitly.

mod controller;
mod curve;
mod event;
mod model;

pub use controller::{AnimatedValues, AnimationController};
pub use curve::{AnimationCurve, Interpolate, Keyframe, KeyframedCurve};
pub use event::{AnimationEvent, AnimationEventKind};
pub use model::{Animation, RunState, TargetProperty};
