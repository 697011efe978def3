// curvegraph/font/src/point.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Glyph points as read from a font's outline tables, in font units.

use curvegraph_geometry::vector::Vector2F;

bitflags! {
    /// Flags that each glyph point can have.
    pub struct PointFlags: u8 {
        /// The point lies on the outline; otherwise it is a Bézier control point.
        const ON_CURVE = 0x01;
        /// The point is the last one of its contour.
        const END_OF_CONTOUR = 0x02;
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub flags: PointFlags,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32, flags: PointFlags) -> Point {
        Point { x, y, flags }
    }

    #[inline]
    pub fn on(x: i32, y: i32) -> Point {
        Point::new(x, y, PointFlags::ON_CURVE)
    }

    #[inline]
    pub fn off(x: i32, y: i32) -> Point {
        Point::new(x, y, PointFlags::empty())
    }

    /// Returns a copy of this point marked as the last one of its contour.
    #[inline]
    pub fn end_of_contour(mut self) -> Point {
        self.flags.insert(PointFlags::END_OF_CONTOUR);
        self
    }

    #[inline]
    pub fn is_on_curve(&self) -> bool {
        self.flags.contains(PointFlags::ON_CURVE)
    }

    #[inline]
    pub fn is_end_of_contour(&self) -> bool {
        self.flags.contains(PointFlags::END_OF_CONTOUR)
    }

    /// The implicit on-curve point between two control points: `a + (b - a) / 2`, truncating.
    #[inline]
    pub fn midpoint(a: &Point, b: &Point) -> Point {
        Point::on(mid_value(a.x, b.x), mid_value(a.y, b.y))
    }

    #[inline]
    pub fn to_f32(&self) -> Vector2F {
        Vector2F::new(self.x as f32, self.y as f32)
    }
}

#[inline]
fn mid_value(a: i32, b: i32) -> i32 {
    a + (b - a) / 2
}
