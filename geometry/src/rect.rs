// curvegraph/geometry/src/rect.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 2D axis-aligned rectangles.
//!
//! `RectF` doubles as the axis-aligned bounding box of outlines and regions.

use crate::vector::{Vector2F, Vector2I};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RectF {
    origin: Vector2F,
    lower_right: Vector2F,
}

impl RectF {
    #[inline]
    pub fn new(origin: Vector2F, size: Vector2F) -> RectF {
        RectF { origin, lower_right: origin + size }
    }

    #[inline]
    pub fn from_points(origin: Vector2F, lower_right: Vector2F) -> RectF {
        RectF { origin, lower_right }
    }

    #[inline]
    pub fn origin(&self) -> Vector2F {
        self.origin
    }

    #[inline]
    pub fn lower_right(&self) -> Vector2F {
        self.lower_right
    }

    #[inline]
    pub fn upper_right(&self) -> Vector2F {
        Vector2F::new(self.lower_right.x(), self.origin.y())
    }

    #[inline]
    pub fn lower_left(&self) -> Vector2F {
        Vector2F::new(self.origin.x(), self.lower_right.y())
    }

    #[inline]
    pub fn size(&self) -> Vector2F {
        self.lower_right - self.origin
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.lower_right.x() - self.origin.x()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.lower_right.y() - self.origin.y()
    }

    #[inline]
    pub fn center(&self) -> Vector2F {
        self.origin.lerp(self.lower_right, 0.5)
    }

    #[inline]
    pub fn min_x(self) -> f32 {
        self.origin.x()
    }

    #[inline]
    pub fn min_y(self) -> f32 {
        self.origin.y()
    }

    #[inline]
    pub fn max_x(self) -> f32 {
        self.lower_right.x()
    }

    #[inline]
    pub fn max_y(self) -> f32 {
        self.lower_right.y()
    }

    #[inline]
    pub fn contains_point(&self, point: Vector2F) -> bool {
        self.origin.x() <= point.x() && point.x() <= self.lower_right.x() &&
            self.origin.y() <= point.y() && point.y() <= self.lower_right.y()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origin == self.lower_right
    }

    /// True if either dimension is infinite or NaN.
    #[inline]
    pub fn is_infinite(&self) -> bool {
        !self.width().is_finite() || !self.height().is_finite()
    }

    /// True if this box encloses no area or cannot be measured at all.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.is_infinite() || self.width() <= 0.0 || self.height() <= 0.0
    }

    #[inline]
    pub fn union_point(&self, point: Vector2F) -> RectF {
        RectF::from_points(self.origin.min(point), self.lower_right.max(point))
    }

    #[inline]
    pub fn union_rect(&self, other: RectF) -> RectF {
        RectF::from_points(self.origin.min(other.origin), self.lower_right.max(other.lower_right))
    }

    #[inline]
    pub fn translate(self, offset: Vector2F) -> RectF {
        RectF::from_points(self.origin + offset, self.lower_right + offset)
    }

    #[inline]
    pub fn scale(self, factor: f32) -> RectF {
        RectF::from_points(self.origin.scale(factor), self.lower_right.scale(factor))
    }

    #[inline]
    pub fn dilate(self, amount: Vector2F) -> RectF {
        RectF::from_points(self.origin - amount, self.lower_right + amount)
    }

    #[inline]
    pub fn to_i32(&self) -> RectI {
        RectI::from_points(self.origin.to_i32(), self.lower_right.to_i32())
    }
}

/// Grows `bounds` to include `point`. The first point seeds the box.
#[inline]
pub fn union_rect(bounds: &mut Option<RectF>, point: Vector2F) {
    *bounds = Some(match *bounds {
        None => RectF::from_points(point, point),
        Some(bounds) => bounds.union_point(point),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RectI {
    origin: Vector2I,
    lower_right: Vector2I,
}

impl RectI {
    #[inline]
    pub fn new(origin: Vector2I, size: Vector2I) -> RectI {
        RectI { origin, lower_right: origin + size }
    }

    #[inline]
    pub fn from_points(origin: Vector2I, lower_right: Vector2I) -> RectI {
        RectI { origin, lower_right }
    }

    #[inline]
    pub fn origin(&self) -> Vector2I {
        self.origin
    }

    #[inline]
    pub fn lower_right(&self) -> Vector2I {
        self.lower_right
    }

    #[inline]
    pub fn size(&self) -> Vector2I {
        self.lower_right - self.origin
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size().x()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size().y()
    }

    #[inline]
    pub fn to_f32(&self) -> RectF {
        RectF::from_points(self.origin.to_f32(), self.lower_right.to_f32())
    }
}

#[cfg(test)]
mod test {
    use crate::vector::vec2f;
    use quickcheck;
    use super::{union_rect, RectF};

    #[test]
    fn test_union_contains_every_point() {
        quickcheck::quickcheck(prop_union_contains_every_point as fn(Vec<(i16, i16)>) -> bool);

        fn prop_union_contains_every_point(points: Vec<(i16, i16)>) -> bool {
            let mut bounds = None;
            for &(x, y) in &points {
                union_rect(&mut bounds, vec2f(x as f32, y as f32));
            }
            match bounds {
                None => points.is_empty(),
                Some(bounds) => {
                    points.iter().all(|&(x, y)| bounds.contains_point(vec2f(x as f32, y as f32)))
                }
            }
        }
    }

    #[test]
    fn test_degenerate_boxes() {
        let line = RectF::from_points(vec2f(0.0, 0.0), vec2f(10.0, 0.0));
        assert!(line.is_degenerate());
        assert!(!line.is_infinite());

        let infinite = RectF::from_points(vec2f(0.0, 0.0), vec2f(std::f32::INFINITY, 1.0));
        assert!(infinite.is_infinite());
        assert!(infinite.is_degenerate());

        let nan = RectF::from_points(vec2f(std::f32::NAN, 0.0), vec2f(1.0, 1.0));
        assert!(nan.is_infinite());

        let square = RectF::new(vec2f(-1.0, -1.0), vec2f(2.0, 2.0));
        assert!(!square.is_degenerate());
        assert_eq!(square.center(), vec2f(0.0, 0.0));
    }

    #[test]
    fn test_union_seeds_from_first_point() {
        let mut bounds = None;
        union_rect(&mut bounds, vec2f(5.0, 5.0));
        assert_eq!(bounds, Some(RectF::from_points(vec2f(5.0, 5.0), vec2f(5.0, 5.0))));
        union_rect(&mut bounds, vec2f(-1.0, 7.0));
        assert_eq!(bounds, Some(RectF::from_points(vec2f(-1.0, 5.0), vec2f(5.0, 7.0))));
    }
}
