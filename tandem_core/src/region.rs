// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A union of axis-aligned rectangles.
//!
//! Used for the non-fast-scrollable region: areas where input must be routed
//! to the main side because handlers there may consume the scroll.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

/// A set of points described as a union of rectangles.
///
/// The representation is not canonical: two equal point sets can be stored
/// with different rectangle lists. Redundant rectangles (empty, or covered by
/// an existing one) are dropped on insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(rect);
        region
    }

    /// Returns `true` if the region covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the rectangles making up the region.
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Adds `rect` to the region.
    pub fn union_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        if rect.is_zero_area() {
            return;
        }
        if self.rects.iter().any(|r| contains_rect(*r, rect)) {
            return;
        }
        self.rects.retain(|r| !contains_rect(rect, *r));
        self.rects.push(rect);
    }

    /// Returns `true` if `point` lies inside any rectangle of the region.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.rects.iter().any(|r| r.contains(point))
    }

    /// Returns `true` if `rect` overlaps the region with non-zero area.
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        self.rects
            .iter()
            .any(|r| !r.intersect(rect).is_zero_area())
    }

    /// Returns the smallest rectangle enclosing the region, or
    /// [`Rect::ZERO`] when empty.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let mut iter = self.rects.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(*first, |acc, r| acc.union(*r))
    }
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rects_are_ignored() {
        let mut region = Region::new();
        region.union_rect(Rect::new(5.0, 5.0, 5.0, 20.0));
        assert!(region.is_empty());
        assert_eq!(region.bounds(), Rect::ZERO);
    }

    #[test]
    fn covered_rects_collapse() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.union_rect(Rect::new(2.0, 2.0, 4.0, 4.0));
        assert_eq!(region.rects().len(), 1);

        region.union_rect(Rect::new(-1.0, -1.0, 20.0, 20.0));
        assert_eq!(region.rects(), &[Rect::new(-1.0, -1.0, 20.0, 20.0)]);
    }

    #[test]
    fn disjoint_union_and_queries() {
        let mut region = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        region.union_rect(Rect::new(20.0, 0.0, 30.0, 10.0));
        assert_eq!(region.rects().len(), 2);
        assert!(region.contains_point(Point::new(25.0, 5.0)));
        assert!(!region.contains_point(Point::new(15.0, 5.0)));
        assert!(region.intersects(Rect::new(8.0, 8.0, 22.0, 9.0)));
        assert!(!region.intersects(Rect::new(11.0, 0.0, 19.0, 10.0)));
        assert_eq!(region.bounds(), Rect::new(0.0, 0.0, 30.0, 10.0));
    }
}
