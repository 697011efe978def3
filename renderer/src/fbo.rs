// curvegraph/renderer/src/fbo.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Offscreen targets of the two-pass antialiasing modes.

use crate::options::RegionOptions;
use crate::region::RegionKind;
use curvegraph_geometry::rect::{self, RectF, RectI};
use curvegraph_geometry::transform3d::{self, Transform4F};
use curvegraph_geometry::util;
use curvegraph_geometry::vector::{Vector2F, Vector2I};
use curvegraph_gpu::{Device, GpuError, TextureFormat};

/// Computes the on-screen size of a box, in whole pixels plus a border on every side.
///
/// All eight corners of the box spanning `bounds` and `z_range` are projected through `pmv`.
/// Returns `None` if a corner projects to infinity.
pub fn footprint(bounds: RectF,
                 z_range: (f32, f32),
                 pmv: &Transform4F,
                 viewport: RectI,
                 border: i32)
                 -> Option<Vector2I> {
    let corners =
        [bounds.origin(), bounds.upper_right(), bounds.lower_right(), bounds.lower_left()];
    let mut window_bounds = None;
    for &z in &[z_range.0, z_range.1] {
        for &corner in &corners {
            let point = transform3d::project_point(pmv, corner, z, viewport)?;
            if !point.is_finite() {
                return None;
            }
            rect::union_rect(&mut window_bounds, point);
        }
    }

    let window_bounds: RectF = window_bounds?;
    Some(Vector2I::new(util::ceil_to_pixels(window_bounds.width()) + border * 2,
                       util::ceil_to_pixels(window_bounds.height()) + border * 2))
}

/// True if `wanted` differs from `current` by more than `boundary` pixels on either axis.
#[inline]
pub fn needs_resize(current: Vector2I, wanted: Vector2I, boundary: i32) -> bool {
    (current.x() - wanted.x()).abs() > boundary || (current.y() - wanted.y()).abs() > boundary
}

/// The framebuffer that pass 1 renders into.
pub struct FboTarget<D> where D: Device {
    framebuffer: D::Framebuffer,
    footprint: Vector2I,
}

impl<D> FboTarget<D> where D: Device {
    pub fn new(device: &D, kind: RegionKind, footprint: Vector2I, options: &RegionOptions)
               -> Result<FboTarget<D>, GpuError> {
        let size = texture_size(kind, footprint, options);
        let samples = match kind {
            RegionKind::TwoPassMsaa => options.sample_count,
            RegionKind::SinglePass | RegionKind::TwoPassVbaa => 0,
        };
        debug!("creating {:?} offscreen target of {}x{} pixels",
               kind,
               size.x(),
               size.y());
        let framebuffer = device.create_framebuffer(size, TextureFormat::RGBA8, samples)?;
        Ok(FboTarget { framebuffer, footprint })
    }

    /// Resizes the target if `footprint` is too far from its current one. Returns true if
    /// the storage was reset.
    pub fn ensure_footprint(&mut self,
                            device: &D,
                            kind: RegionKind,
                            footprint: Vector2I,
                            options: &RegionOptions)
                            -> Result<bool, GpuError> {
        if !needs_resize(self.footprint, footprint, options.resize_boundary) {
            return Ok(false);
        }
        let size = texture_size(kind, footprint, options);
        debug!("resizing offscreen target from {:?} to {:?}", self.footprint, footprint);
        device.reset_framebuffer(&mut self.framebuffer, size)?;
        self.footprint = footprint;
        Ok(true)
    }

    #[inline]
    pub fn footprint(&self) -> Vector2I {
        self.footprint
    }

    #[inline]
    pub fn framebuffer(&self) -> &D::Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn destroy(self, device: &D) {
        device.destroy_framebuffer(self.framebuffer);
    }
}

/// The texture size backing a footprint. VBAA supersamples on both axes.
pub fn texture_size(kind: RegionKind, footprint: Vector2I, options: &RegionOptions) -> Vector2I {
    match kind {
        RegionKind::TwoPassVbaa => footprint.scale(options.sample_count as i32),
        RegionKind::SinglePass | RegionKind::TwoPassMsaa => footprint,
    }
}

/// The projection that maps `bounds` onto the whole offscreen target, leaving `border` pixels
/// of `footprint` around it.
pub fn offscreen_projection(bounds: RectF, footprint: Vector2I, border: i32) -> Transform4F {
    let inner = footprint - Vector2I::splat(border * 2);
    let pixel = Vector2F::new(bounds.width() / inner.x().max(1) as f32,
                              bounds.height() / inner.y().max(1) as f32);
    let padding = pixel.scale(border as f32);
    Transform4F::from_ortho_rect(bounds.dilate(padding))
}
