// curvegraph/geometry/src/vector.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Small vector types.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 2D points with 32-bit floating point coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2F {
    x: f32,
    y: f32,
}

impl Vector2F {
    #[inline]
    pub fn new(x: f32, y: f32) -> Vector2F {
        Vector2F { x, y }
    }

    #[inline]
    pub fn splat(value: f32) -> Vector2F {
        Vector2F::new(value, value)
    }

    #[inline]
    pub fn zero() -> Vector2F {
        Vector2F::default()
    }

    /// Promotes this point to homogeneous coordinates with the given Z value and W = 1.
    #[inline]
    pub fn to_4d(self, z: f32) -> Vector4F {
        Vector4F::new(self.x, self.y, z, 1.0)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    #[inline]
    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    #[inline]
    pub fn min(&self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x.min(other.x), self.y.min(other.y))
    }

    #[inline]
    pub fn max(&self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x.max(other.x), self.y.max(other.y))
    }

    #[inline]
    pub fn scale(&self, factor: f32) -> Vector2F {
        Vector2F::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn scale_xy(&self, factors: Vector2F) -> Vector2F {
        Vector2F::new(self.x * factors.x, self.y * factors.y)
    }

    #[inline]
    pub fn floor(&self) -> Vector2F {
        Vector2F::new(self.x.floor(), self.y.floor())
    }

    #[inline]
    pub fn ceil(&self) -> Vector2F {
        Vector2F::new(self.x.ceil(), self.y.ceil())
    }

    #[inline]
    pub fn det(&self, other: Vector2F) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn lerp(&self, other: Vector2F, t: f32) -> Vector2F {
        *self + (other - *self).scale(t)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Truncates toward zero.
    #[inline]
    pub fn to_i32(&self) -> Vector2I {
        Vector2I::new(self.x as i32, self.y as i32)
    }
}

impl Add<Vector2F> for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn add(self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign<Vector2F> for Vector2F {
    #[inline]
    fn add_assign(&mut self, other: Vector2F) {
        *self = *self + other
    }
}

impl Sub<Vector2F> for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn sub(self, other: Vector2F) -> Vector2F {
        Vector2F::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<Vector2F> for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn mul(self, other: Vector2F) -> Vector2F {
        self.scale_xy(other)
    }
}

impl Neg for Vector2F {
    type Output = Vector2F;
    #[inline]
    fn neg(self) -> Vector2F {
        Vector2F::new(-self.x, -self.y)
    }
}

#[inline]
pub fn vec2f(x: f32, y: f32) -> Vector2F {
    Vector2F::new(x, y)
}

/// 2D points with 32-bit signed integer coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vector2I {
    x: i32,
    y: i32,
}

impl Vector2I {
    #[inline]
    pub fn new(x: i32, y: i32) -> Vector2I {
        Vector2I { x, y }
    }

    #[inline]
    pub fn splat(value: i32) -> Vector2I {
        Vector2I::new(value, value)
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn scale(&self, factor: i32) -> Vector2I {
        Vector2I::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn to_f32(&self) -> Vector2F {
        Vector2F::new(self.x as f32, self.y as f32)
    }
}

impl Add<Vector2I> for Vector2I {
    type Output = Vector2I;
    #[inline]
    fn add(self, other: Vector2I) -> Vector2I {
        Vector2I::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub<Vector2I> for Vector2I {
    type Output = Vector2I;
    #[inline]
    fn sub(self, other: Vector2I) -> Vector2I {
        Vector2I::new(self.x - other.x, self.y - other.y)
    }
}

#[inline]
pub fn vec2i(x: i32, y: i32) -> Vector2I {
    Vector2I::new(x, y)
}

/// 3D homogeneous points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector4F {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Vector4F {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Vector4F {
        Vector4F { x, y, z, w }
    }

    #[inline]
    pub fn splat(value: f32) -> Vector4F {
        Vector4F::new(value, value, value, value)
    }

    #[inline]
    pub fn to_2d(self) -> Vector2F {
        Vector2F::new(self.x, self.y)
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }

    #[inline]
    pub fn z(self) -> f32 {
        self.z
    }

    #[inline]
    pub fn w(self) -> f32 {
        self.w
    }

    #[inline]
    pub fn scale(&self, factor: f32) -> Vector4F {
        Vector4F::new(self.x * factor, self.y * factor, self.z * factor, self.w * factor)
    }

    /// Divides X, Y and Z by W. The caller must ensure W is nonzero.
    #[inline]
    pub fn perspective_divide(self) -> Vector4F {
        let inv_w = 1.0 / self.w;
        Vector4F::new(self.x * inv_w, self.y * inv_w, self.z * inv_w, 1.0)
    }

    #[inline]
    pub fn approx_eq(&self, other: &Vector4F, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon &&
            (self.y - other.y).abs() <= epsilon &&
            (self.z - other.z).abs() <= epsilon &&
            (self.w - other.w).abs() <= epsilon
    }

    #[inline]
    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Vector4F {
    #[inline]
    fn default() -> Vector4F {
        Vector4F::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Add<Vector4F> for Vector4F {
    type Output = Vector4F;
    #[inline]
    fn add(self, other: Vector4F) -> Vector4F {
        Vector4F::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}
