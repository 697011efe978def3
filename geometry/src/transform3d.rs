// curvegraph/geometry/src/transform3d.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 3D transforms used for projection and modelview matrices.

use crate::rect::{RectF, RectI};
use crate::vector::{Vector2F, Vector4F};
use std::ops::Mul;

/// A 4x4 transform.
///
/// In column-major order.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Transform4F {
    pub c0: Vector4F,
    pub c1: Vector4F,
    pub c2: Vector4F,
    pub c3: Vector4F,
}

impl Default for Transform4F {
    #[inline]
    fn default() -> Transform4F {
        Transform4F {
            c0: Vector4F::new(1.0, 0.0, 0.0, 0.0),
            c1: Vector4F::new(0.0, 1.0, 0.0, 0.0),
            c2: Vector4F::new(0.0, 0.0, 1.0, 0.0),
            c3: Vector4F::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl Transform4F {
    #[inline]
    pub fn identity() -> Transform4F {
        Transform4F::default()
    }

    #[inline]
    pub fn row_major(m00: f32, m01: f32, m02: f32, m03: f32,
                     m10: f32, m11: f32, m12: f32, m13: f32,
                     m20: f32, m21: f32, m22: f32, m23: f32,
                     m30: f32, m31: f32, m32: f32, m33: f32)
                     -> Transform4F {
        Transform4F {
            c0: Vector4F::new(m00, m10, m20, m30),
            c1: Vector4F::new(m01, m11, m21, m31),
            c2: Vector4F::new(m02, m12, m22, m32),
            c3: Vector4F::new(m03, m13, m23, m33),
        }
    }

    #[inline]
    pub fn from_scale(x: f32, y: f32, z: f32) -> Transform4F {
        Transform4F::row_major(x,   0.0, 0.0, 0.0,
                               0.0, y,   0.0, 0.0,
                               0.0, 0.0, z,   0.0,
                               0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn from_uniform_scale(factor: f32) -> Transform4F {
        Transform4F::from_scale(factor, factor, factor)
    }

    #[inline]
    pub fn from_translation(x: f32, y: f32, z: f32) -> Transform4F {
        Transform4F::row_major(1.0, 0.0, 0.0, x,
                               0.0, 1.0, 0.0, y,
                               0.0, 0.0, 1.0, z,
                               0.0, 0.0, 0.0, 1.0)
    }

    /// Just like `glOrtho()`.
    #[inline]
    pub fn from_ortho(left: f32, right: f32, bottom: f32, top: f32, near_val: f32, far_val: f32)
                      -> Transform4F {
        let x_inv = 1.0 / (right - left);
        let y_inv = 1.0 / (top - bottom);
        let z_inv = 1.0 / (far_val - near_val);
        let tx = -(right + left) * x_inv;
        let ty = -(top + bottom) * y_inv;
        let tz = -(far_val + near_val) * z_inv;
        Transform4F::row_major(2.0 * x_inv, 0.0,         0.0,          tx,
                               0.0,         2.0 * y_inv, 0.0,          ty,
                               0.0,         0.0,         -2.0 * z_inv, tz,
                               0.0,         0.0,         0.0,          1.0)
    }

    /// An orthographic projection that maps `rect` onto the whole viewport.
    #[inline]
    pub fn from_ortho_rect(rect: RectF) -> Transform4F {
        Transform4F::from_ortho(rect.min_x(), rect.max_x(), rect.min_y(), rect.max_y(), -1.0, 1.0)
    }

    /// Just like `gluPerspective()`.
    #[inline]
    pub fn from_perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Transform4F {
        let f = 1.0 / (fov_y * 0.5).tan();
        let z_denom = 1.0 / (z_near - z_far);
        let m00 = f / aspect;
        let m11 = f;
        let m22 = (z_far + z_near) * z_denom;
        let m23 = 2.0 * z_far * z_near * z_denom;
        Transform4F::row_major(m00, 0.0, 0.0,  0.0,
                               0.0, m11, 0.0,  0.0,
                               0.0, 0.0, m22,  m23,
                               0.0, 0.0, -1.0, 0.0)
    }

    #[inline]
    pub fn transform_point(&self, point: Vector4F) -> Vector4F {
        self.c0.scale(point.x()) + self.c1.scale(point.y()) + self.c2.scale(point.z()) +
            self.c3.scale(point.w())
    }

    /// Applies this transform to a 2D point lying in the plane `z`.
    #[inline]
    pub fn transform_point_2d(&self, point: Vector2F, z: f32) -> Vector2F {
        let point = self.transform_point(point.to_4d(z));
        if point.w() == 1.0 || point.w() == 0.0 {
            point.to_2d()
        } else {
            point.perspective_divide().to_2d()
        }
    }

    #[inline]
    pub fn to_columns(&self) -> [f32; 16] {
        let mut columns = [0.0; 16];
        for (index, column) in [self.c0, self.c1, self.c2, self.c3].iter().enumerate() {
            columns[index * 4..index * 4 + 4].copy_from_slice(&column.to_array());
        }
        columns
    }
}

impl Mul<Transform4F> for Transform4F {
    type Output = Transform4F;
    #[inline]
    fn mul(self, other: Transform4F) -> Transform4F {
        Transform4F {
            c0: self.transform_point(other.c0),
            c1: self.transform_point(other.c1),
            c2: self.transform_point(other.c2),
            c3: self.transform_point(other.c3),
        }
    }
}

/// Maps an object-space point to window coordinates, just like `gluProject()`.
///
/// Returns `None` if the point projects to infinity.
pub fn project_point(pmv: &Transform4F, point: Vector2F, z: f32, viewport: RectI)
                     -> Option<Vector2F> {
    let clip = pmv.transform_point(point.to_4d(z));
    if clip.w() == 0.0 {
        return None;
    }
    let ndc = clip.perspective_divide();
    let viewport = viewport.to_f32();
    Some(Vector2F::new(viewport.min_x() + (ndc.x() + 1.0) * 0.5 * viewport.width(),
                       viewport.min_y() + (ndc.y() + 1.0) * 0.5 * viewport.height()))
}
