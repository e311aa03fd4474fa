// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications flowing from the compositor to the main side.

use crate::layer::LayerKey;

use super::model::TargetProperty;

/// What happened to an animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationEventKind {
    /// The animation left its waiting state and stamped a start time.
    Started,
    /// The animation ran all of its iterations.
    Finished,
}

/// A lifecycle change of one animation on one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationEvent {
    /// What happened.
    pub kind: AnimationEventKind,
    /// Id of the layer owning the animation.
    pub layer: LayerKey,
    /// Animation id.
    pub animation_id: u32,
    /// Animation group.
    pub group: u32,
    /// The animated property.
    pub property: TargetProperty,
    /// When it happened.
    pub monotonic_time: f64,
}
