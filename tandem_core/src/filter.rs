// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS-style filter chains applied to a layer or to what lies behind it.

use alloc::vec::Vec;

use kurbo::Vec2;

use crate::color::Color;

/// One step of a filter chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOperation {
    /// Desaturate by the given amount in `[0, 1]`.
    Grayscale(f32),
    /// Sepia tone by the given amount in `[0, 1]`.
    Sepia(f32),
    /// Saturation multiplier.
    Saturate(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    /// Color inversion by the given amount in `[0, 1]`.
    Invert(f32),
    /// Brightness multiplier.
    Brightness(f32),
    /// Contrast multiplier.
    Contrast(f32),
    /// Alpha multiplier.
    Opacity(f32),
    /// Gaussian blur with the given standard deviation.
    Blur(f32),
    /// Offset, blurred, tinted copy of the content's alpha.
    DropShadow {
        /// Shadow offset.
        offset: Vec2,
        /// Blur standard deviation.
        blur: f32,
        /// Shadow tint.
        color: Color,
    },
}

impl FilterOperation {
    /// Returns `true` if the operation reads pixels outside the one it writes.
    #[must_use]
    pub const fn moves_pixels(&self) -> bool {
        matches!(self, Self::Blur(_) | Self::DropShadow { .. })
    }
}

/// An ordered list of [`FilterOperation`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOperations {
    ops: Vec<FilterOperation>,
}

impl FilterOperations {
    /// Creates an empty filter chain.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Appends an operation, builder style.
    #[must_use]
    pub fn with(mut self, op: FilterOperation) -> Self {
        self.ops.push(op);
        self
    }

    /// Appends an operation.
    pub fn push(&mut self, op: FilterOperation) {
        self.ops.push(op);
    }

    /// Returns `true` if the chain has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Iterates over the operations in application order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterOperation> {
        self.ops.iter()
    }

    /// Returns `true` if any operation samples neighboring pixels.
    #[must_use]
    pub fn has_filter_that_moves_pixels(&self) -> bool {
        self.ops.iter().any(FilterOperation::moves_pixels)
    }
}
