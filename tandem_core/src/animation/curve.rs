// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyframed curves.

use alloc::vec::Vec;

use crate::transform::Transform3d;

use super::model::TargetProperty;

/// Values that can be blended between two keyframes.
pub trait Interpolate: Copy {
    /// Returns the value at `t` in `[0, 1]` between `self` and `to`.
    #[must_use]
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "progress is in [0, 1] and only needs f32 precision"
    )]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl Interpolate for Transform3d {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

/// A value pinned to a time, in seconds from the start of an iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Time offset within one iteration.
    pub time: f64,
    /// Value at that time.
    pub value: T,
}

/// A piecewise-linear curve through sorted keyframes.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframedCurve<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for KeyframedCurve<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: Interpolate> KeyframedCurve<T> {
    /// Creates a curve with no keyframes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyframe, keeping keyframes sorted by time.
    ///
    /// A keyframe at an existing time is placed after the existing one, which
    /// makes the curve jump at that instant.
    pub fn add_keyframe(&mut self, time: f64, value: T) {
        let at = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes.insert(at, Keyframe { time, value });
    }

    /// Builder form of [`add_keyframe`](Self::add_keyframe).
    #[must_use]
    pub fn with_keyframe(mut self, time: f64, value: T) -> Self {
        self.add_keyframe(time, value);
        self
    }

    /// Returns the keyframes in time order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Time of the last keyframe, or zero for an empty curve.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Samples the curve. Times outside the keyframe range clamp to the ends.
    #[must_use]
    pub fn value_at(&self, time: f64) -> Option<T> {
        let first = self.keyframes.first()?;
        if time <= first.time {
            return Some(first.value);
        }
        let next = self.keyframes.partition_point(|k| k.time <= time);
        let Some(to) = self.keyframes.get(next) else {
            return self.keyframes.last().map(|k| k.value);
        };
        let from = &self.keyframes[next - 1];
        let span = to.time - from.time;
        let progress = if span > 0.0 {
            (time - from.time) / span
        } else {
            1.0
        };
        Some(from.value.interpolate(&to.value, progress))
    }
}

/// The curve of an [`Animation`](super::Animation), typed by the property it
/// drives.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationCurve {
    /// Drives layer opacity.
    Opacity(KeyframedCurve<f32>),
    /// Drives layer transform.
    Transform(KeyframedCurve<Transform3d>),
}

impl AnimationCurve {
    /// The property this curve drives.
    #[must_use]
    pub const fn target_property(&self) -> TargetProperty {
        match self {
            Self::Opacity(_) => TargetProperty::Opacity,
            Self::Transform(_) => TargetProperty::Transform,
        }
    }

    /// Duration of one iteration.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match self {
            Self::Opacity(c) => c.duration(),
            Self::Transform(c) => c.duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_stay_sorted() {
        let curve = KeyframedCurve::new()
            .with_keyframe(1.0, 1.0_f32)
            .with_keyframe(0.0, 0.0)
            .with_keyframe(0.5, 0.25);
        let times: Vec<f64> = curve.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, [0.0, 0.5, 1.0]);
        assert_eq!(curve.duration(), 1.0);
    }

    #[test]
    fn sampling_interpolates_and_clamps() {
        let curve = KeyframedCurve::new()
            .with_keyframe(0.0, 0.0_f32)
            .with_keyframe(2.0, 1.0);
        assert_eq!(curve.value_at(-1.0), Some(0.0));
        assert_eq!(curve.value_at(1.0), Some(0.5));
        assert_eq!(curve.value_at(5.0), Some(1.0));
        assert_eq!(KeyframedCurve::<f32>::new().value_at(0.0), None);
    }

    #[test]
    fn duplicate_time_steps() {
        let curve = KeyframedCurve::new()
            .with_keyframe(0.0, 0.0_f32)
            .with_keyframe(1.0, 0.25)
            .with_keyframe(1.0, 0.5)
            .with_keyframe(2.0, 1.0);
        assert_eq!(curve.value_at(1.0), Some(0.5));
        assert_eq!(curve.value_at(1.5), Some(0.75));
    }

    #[test]
    fn transform_curve_property() {
        let curve = AnimationCurve::Transform(
            KeyframedCurve::new()
                .with_keyframe(0.0, Transform3d::IDENTITY)
                .with_keyframe(1.0, Transform3d::from_translation(10.0, 0.0, 0.0)),
        );
        assert_eq!(curve.target_property(), TargetProperty::Transform);
        assert_eq!(curve.duration(), 1.0);
    }
}
