// curvegraph/renderer/src/region.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Regions: tessellated geometry staged on the CPU, sealed into GPU buffers and drawn with
//! stencil-and-cover, optionally through an offscreen antialiasing pass.
//!
//! A region is dirty after any mutation until `update()` re-seals its buffers, and it cannot
//! be drawn while dirty. GPU resources are only released by `destroy()`.

use crate::fbo::{self, FboTarget};
use crate::options::{RegionOptions, RenderModes};
use crate::staging::StagingBuffer;
use curvegraph_content::outline::OutlineShape;
use curvegraph_content::tessellation::{self, CurveParams, Tessellation};
use curvegraph_geometry::rect::{self, RectF, RectI};
use curvegraph_geometry::transform3d::Transform4F;
use curvegraph_geometry::vector::{Vector2F, Vector2I};
use curvegraph_gpu::{BufferTarget, BufferUploadMode, Device, GpuError, Primitive, RenderState};
use curvegraph_gpu::{UniformData, UniformId, VertexAttr};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::u32;

const SENTINEL: u32 = u32::MAX;

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// How a region gets its pixels on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    /// Stencil and cover straight into the target framebuffer.
    SinglePass,
    /// Stencil and cover into a supersampled texture, then draw the texture.
    TwoPassVbaa,
    /// Stencil and cover into a multisampled texture, then draw the texture.
    TwoPassMsaa,
}

impl RegionKind {
    pub fn for_modes(modes: RenderModes) -> RegionKind {
        if modes.contains(RenderModes::VBAA) {
            RegionKind::TwoPassVbaa
        } else if modes.contains(RenderModes::MSAA) {
            RegionKind::TwoPassMsaa
        } else {
            RegionKind::SinglePass
        }
    }

    #[inline]
    pub fn is_two_pass(self) -> bool {
        self != RegionKind::SinglePass
    }
}

/// Per-draw state supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    pub pmv: Transform4F,
    pub viewport: RectI,
    /// Used when vertices carry no color.
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStatus {
    Drawn,
    /// Nothing to draw: no triangles, empty bounds, or a footprint that doesn't project.
    Skipped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegionError {
    /// The region was mutated after its last `update()`.
    NotUpdated,
    Destroyed,
    Gpu(GpuError),
}

impl Display for RegionError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            RegionError::NotUpdated => write!(formatter, "region must be updated before drawing"),
            RegionError::Destroyed => write!(formatter, "region has been destroyed"),
            RegionError::Gpu(ref error) => write!(formatter, "GPU error: {}", error),
        }
    }
}

impl Error for RegionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            RegionError::Gpu(ref error) => Some(error),
            RegionError::NotUpdated | RegionError::Destroyed => None,
        }
    }
}

impl From<GpuError> for RegionError {
    #[inline]
    fn from(error: GpuError) -> RegionError {
        RegionError::Gpu(error)
    }
}

// Listed in release order.
struct GpuBuffers<D> where D: Device {
    vertices: Option<D::Buffer>,
    curve_params: Option<D::Buffer>,
    colors: Option<D::Buffer>,
    indices: Option<D::Buffer>,
    quad_vertices: Option<D::Buffer>,
    quad_tex_coords: Option<D::Buffer>,
    quad_indices: Option<D::Buffer>,
}

impl<D> GpuBuffers<D> where D: Device {
    fn new() -> GpuBuffers<D> {
        GpuBuffers {
            vertices: None,
            curve_params: None,
            colors: None,
            indices: None,
            quad_vertices: None,
            quad_tex_coords: None,
            quad_indices: None,
        }
    }

    fn take_all(&mut self) -> Vec<D::Buffer> {
        vec![
            self.vertices.take(),
            self.curve_params.take(),
            self.colors.take(),
            self.indices.take(),
            self.quad_vertices.take(),
            self.quad_tex_coords.take(),
            self.quad_indices.take(),
        ].into_iter().flatten().collect()
    }

    fn is_empty(&self) -> bool {
        self.vertices.is_none() && self.curve_params.is_none() && self.colors.is_none() &&
            self.indices.is_none() && self.quad_vertices.is_none() &&
            self.quad_tex_coords.is_none() && self.quad_indices.is_none()
    }
}

pub struct Region<D> where D: Device {
    kind: RegionKind,
    options: RegionOptions,
    positions: StagingBuffer<[f32; 3]>,
    curve_params: StagingBuffer<[f32; 2]>,
    colors: StagingBuffer<[f32; 4]>,
    indices: StagingBuffer<u32>,
    color: [f32; 4],
    bounds: RectF,
    z_range: (f32, f32),
    dirty: bool,
    fbo_dirty: bool,
    destroyed: bool,
    generation: u64,
    buffers: GpuBuffers<D>,
    fbo: Option<FboTarget<D>>,
}

impl<D> Region<D> where D: Device {
    pub fn new(kind: RegionKind, options: RegionOptions) -> Region<D> {
        let options = options.sanitized();
        let (capacity, growth) = (options.initial_capacity, options.growth_factor);
        Region {
            kind,
            options,
            positions: StagingBuffer::new(capacity, growth),
            curve_params: StagingBuffer::new(capacity, growth),
            colors: StagingBuffer::new(0, growth),
            indices: StagingBuffer::new(capacity, growth),
            color: [0.0, 0.0, 0.0, 1.0],
            bounds: RectF::default(),
            z_range: (0.0, 0.0),
            dirty: false,
            fbo_dirty: false,
            destroyed: false,
            generation: 0,
            buffers: GpuBuffers::new(),
            fbo: None,
        }
    }

    /// Creates a region of the kind the options' render modes call for.
    #[inline]
    pub fn from_options(options: RegionOptions) -> Region<D> {
        Region::new(RegionKind::for_modes(options.render_modes), options)
    }

    #[inline]
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    #[inline]
    pub fn options(&self) -> &RegionOptions {
        &self.options
    }

    #[inline]
    fn has_color_channel(&self) -> bool {
        self.options.render_modes.contains(RenderModes::COLOR_CHANNEL)
    }

    /// Sets the color of vertices pushed from now on. Only used with `COLOR_CHANNEL`.
    #[inline]
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, position: Vector2F, z: f32, curve: CurveParams) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push([position.x(), position.y(), z]);
        self.curve_params.push([curve.s, curve.t]);
        if self.has_color_channel() {
            self.colors.push(self.color);
        }
        self.dirty = true;
        index
    }

    pub fn push_index(&mut self, index: u32) {
        self.indices.push(index);
        self.dirty = true;
    }

    /// Appends the triangles of `tessellation`.
    ///
    /// Each tessellation vertex becomes one region vertex the first time a triangle refers to
    /// it; later references reuse that vertex.
    pub fn add_tessellation(&mut self, tessellation: &Tessellation) {
        let mut ids = vec![SENTINEL; tessellation.vertices.len()];
        for triangle in &tessellation.triangles {
            let mut resolved = [0; 3];
            for (slot, &index) in resolved.iter_mut().zip(triangle.indices.iter()) {
                let index = index as usize;
                if ids[index] == SENTINEL {
                    let vertex = &tessellation.vertices[index];
                    ids[index] = self.push_vertex(vertex.position, vertex.z, vertex.curve);
                }
                *slot = ids[index];
            }
            self.indices.extend_from_slice(&resolved);
            self.dirty = true;
        }
    }

    /// Tessellates `shape` placed with `transform` and appends the triangles.
    pub fn add_outline_shape(&mut self, shape: &OutlineShape, transform: &Transform4F) {
        let tessellation = tessellation::tessellate(&shape.transformed(transform));
        self.add_tessellation(&tessellation);
    }

    /// Removes all geometry, keeping the GPU resources for reuse.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.curve_params.clear();
        self.colors.clear();
        self.indices.clear();
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_fbo_dirty(&self) -> bool {
        self.fbo_dirty
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// The bounds of all vertices as of the last `update()`.
    #[inline]
    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    /// How many times the buffers have been sealed.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn fbo(&self) -> Option<&FboTarget<D>> {
        self.fbo.as_ref()
    }

    /// Recomputes the bounds and seals the staged data into GPU buffers. Does nothing if the
    /// region is clean.
    pub fn update(&mut self, device: &D) -> Result<(), RegionError> {
        if self.destroyed {
            return Err(RegionError::Destroyed);
        }
        if !self.dirty {
            return Ok(());
        }

        self.recompute_bounds();

        upload(device,
               &mut self.buffers.vertices,
               self.positions.as_slice(),
               BufferTarget::Vertex)?;
        upload(device,
               &mut self.buffers.curve_params,
               self.curve_params.as_slice(),
               BufferTarget::Vertex)?;
        if self.has_color_channel() {
            upload(device, &mut self.buffers.colors, self.colors.as_slice(), BufferTarget::Vertex)?;
        }
        upload(device, &mut self.buffers.indices, self.indices.as_slice(), BufferTarget::Index)?;

        let quad = self.cover_quad();
        upload(device, &mut self.buffers.quad_vertices, &quad, BufferTarget::Vertex)?;
        upload(device,
               &mut self.buffers.quad_tex_coords,
               &quad_tex_coords(0.0, 0.0),
               BufferTarget::Vertex)?;
        upload(device, &mut self.buffers.quad_indices, &QUAD_INDICES, BufferTarget::Index)?;

        self.dirty = false;
        self.fbo_dirty = true;
        self.generation += 1;
        debug!("sealed region: {} vertices, {} indices, generation {}",
               self.positions.len(),
               self.indices.len(),
               self.generation);
        Ok(())
    }

    /// Draws the region.
    ///
    /// Fails with `NotUpdated` while the region is dirty. Two-pass regions re-render their
    /// offscreen texture only if the geometry or the projected footprint changed.
    pub fn draw(&mut self, device: &D, params: &RenderParams) -> Result<DrawStatus, RegionError> {
        if self.destroyed {
            return Err(RegionError::Destroyed);
        }
        if self.dirty {
            return Err(RegionError::NotUpdated);
        }
        if self.indices.is_empty() || self.bounds.is_degenerate() {
            return Ok(DrawStatus::Skipped);
        }

        match self.kind {
            RegionKind::SinglePass => {
                device.bind_default_framebuffer(params.viewport);
                device.set_uniform(UniformId::Pmv, UniformData::Mat4(params.pmv.to_columns()));
                device.set_uniform(UniformId::StaticColor, UniformData::Vec4(params.color));
                self.stencil_and_cover(device)?;
            }
            RegionKind::TwoPassVbaa | RegionKind::TwoPassMsaa => {
                let footprint = match fbo::footprint(self.bounds,
                                                     self.z_range,
                                                     &params.pmv,
                                                     params.viewport,
                                                     self.options.fbo_border) {
                    Some(footprint) if footprint.x() > 0 && footprint.y() > 0 => footprint,
                    _ => {
                        debug!("region footprint is empty or unprojectable; skipping");
                        return Ok(DrawStatus::Skipped);
                    }
                };
                self.prepare_fbo(device, footprint)?;
                if self.fbo_dirty {
                    self.render_offscreen(device, params)?;
                    self.fbo_dirty = false;
                }
                self.draw_offscreen_texture(device, params)?;
            }
        }
        Ok(DrawStatus::Drawn)
    }

    /// Releases the GPU resources: the offscreen target first, then every buffer. Destroying
    /// twice does nothing.
    pub fn destroy(&mut self, device: &D) {
        if self.destroyed {
            debug!("region already destroyed");
            return;
        }
        if let Some(fbo) = self.fbo.take() {
            fbo.destroy(device);
        }
        for buffer in self.buffers.take_all() {
            device.destroy_buffer(buffer);
        }
        self.destroyed = true;
        self.dirty = false;
        self.fbo_dirty = false;
    }

    fn recompute_bounds(&mut self) {
        let mut bounds = None;
        let mut z_range: Option<(f32, f32)> = None;
        for &[x, y, z] in self.positions.as_slice() {
            rect::union_rect(&mut bounds, Vector2F::new(x, y));
            z_range = Some(match z_range {
                None => (z, z),
                Some((min_z, max_z)) => (min_z.min(z), max_z.max(z)),
            });
        }
        self.bounds = bounds.unwrap_or_default();
        self.z_range = z_range.unwrap_or((0.0, 0.0));
    }

    fn cover_quad(&self) -> [[f32; 3]; 4] {
        let z = self.z_range.0;
        let corners = [
            self.bounds.origin(),
            self.bounds.upper_right(),
            self.bounds.lower_right(),
            self.bounds.lower_left(),
        ];
        let mut quad = [[0.0; 3]; 4];
        for (vertex, corner) in quad.iter_mut().zip(corners.iter()) {
            *vertex = [corner.x(), corner.y(), z];
        }
        quad
    }

    fn prepare_fbo(&mut self, device: &D, footprint: Vector2I) -> Result<(), GpuError> {
        match self.fbo {
            None => {
                self.fbo = Some(FboTarget::new(device, self.kind, footprint, &self.options)?);
                self.fbo_dirty = true;
            }
            Some(ref mut fbo) => {
                if fbo.ensure_footprint(device, self.kind, footprint, &self.options)? {
                    self.fbo_dirty = true;
                }
            }
        }
        Ok(())
    }

    // Pass 1.
    fn render_offscreen(&self, device: &D, params: &RenderParams) -> Result<(), RegionError> {
        let fbo = match self.fbo {
            Some(ref fbo) => fbo,
            None => return Ok(()),
        };
        let (footprint, border) = (fbo.footprint(), self.options.fbo_border);

        device.bind_framebuffer(fbo.framebuffer());
        device.clear(Some([0.0; 4]), Some(0));
        let projection = fbo::offscreen_projection(self.bounds, footprint, border);
        device.set_uniform(UniformId::Pmv, UniformData::Mat4(projection.to_columns()));
        device.set_uniform(UniformId::StaticColor, UniformData::Vec4(params.color));
        self.stencil_and_cover(device)?;

        // The texture holds a border around the bounds; the on-screen quad samples inside it.
        if let Some(ref tex_coords) = self.buffers.quad_tex_coords {
            let inset_x = border as f32 / footprint.x() as f32;
            let inset_y = border as f32 / footprint.y() as f32;
            device.upload_to_buffer(tex_coords,
                                    &quad_tex_coords(inset_x, inset_y),
                                    BufferTarget::Vertex,
                                    BufferUploadMode::Dynamic)?;
        }
        Ok(())
    }

    // Pass 2.
    fn draw_offscreen_texture(&self, device: &D, params: &RenderParams)
                              -> Result<(), RegionError> {
        let fbo = match self.fbo {
            Some(ref fbo) => fbo,
            None => return Ok(()),
        };
        let (quad_vertices, quad_tex_coords, quad_indices) =
            match (&self.buffers.quad_vertices,
                   &self.buffers.quad_tex_coords,
                   &self.buffers.quad_indices) {
                (Some(vertices), Some(tex_coords), Some(indices)) => {
                    (vertices, tex_coords, indices)
                }
                _ => return Err(RegionError::NotUpdated),
            };

        let texture_size = device.framebuffer_size(fbo.framebuffer());
        device.bind_default_framebuffer(params.viewport);
        device.set_uniform(UniformId::Pmv, UniformData::Mat4(params.pmv.to_columns()));
        device.set_uniform(UniformId::TextureUnit, UniformData::TextureUnit(0));
        device.set_uniform(UniformId::TextureSize,
                           UniformData::Vec2([texture_size.x() as f32, texture_size.y() as f32]));
        let sample_count = match self.kind {
            RegionKind::TwoPassVbaa => self.options.sample_count as f32,
            RegionKind::SinglePass | RegionKind::TwoPassMsaa => 1.0,
        };
        device.set_uniform(UniformId::SampleCount, UniformData::Float(sample_count));
        device.bind_texture(device.framebuffer_texture(fbo.framebuffer()), 0);

        device.bind_vertex_attr(quad_vertices, VertexAttr::Position, 3);
        device.bind_vertex_attr(quad_tex_coords, VertexAttr::TexCoord, 2);
        device.bind_buffer(quad_indices, BufferTarget::Index);
        device.draw_elements(Primitive::Triangles,
                             QUAD_INDICES.len() as u32,
                             &RenderState::blended());
        Ok(())
    }

    // Writes the fill parity of the triangles into the stencil buffer, then covers the bounds.
    fn stencil_and_cover(&self, device: &D) -> Result<(), RegionError> {
        let buffers = &self.buffers;
        let (vertices, curve_params, indices) =
            match (&buffers.vertices, &buffers.curve_params, &buffers.indices) {
                (Some(vertices), Some(curve_params), Some(indices)) => {
                    (vertices, curve_params, indices)
                }
                _ => return Err(RegionError::NotUpdated),
            };
        let (quad_vertices, quad_tex_coords, quad_indices) =
            match (&buffers.quad_vertices, &buffers.quad_tex_coords, &buffers.quad_indices) {
                (Some(vertices), Some(tex_coords), Some(indices)) => {
                    (vertices, tex_coords, indices)
                }
                _ => return Err(RegionError::NotUpdated),
            };

        device.bind_vertex_attr(vertices, VertexAttr::Position, 3);
        device.bind_vertex_attr(curve_params, VertexAttr::CurveParams, 2);
        if let Some(ref colors) = buffers.colors {
            device.bind_vertex_attr(colors, VertexAttr::Color, 4);
        }
        device.bind_buffer(indices, BufferTarget::Index);
        device.draw_elements(Primitive::Triangles,
                             self.indices.len() as u32,
                             &RenderState::stencil_invert());

        device.bind_vertex_attr(quad_vertices, VertexAttr::Position, 3);
        device.bind_vertex_attr(quad_tex_coords, VertexAttr::TexCoord, 2);
        device.bind_buffer(quad_indices, BufferTarget::Index);
        device.draw_elements(Primitive::Triangles,
                             QUAD_INDICES.len() as u32,
                             &RenderState::stencil_cover());
        Ok(())
    }
}

impl<D> Drop for Region<D> where D: Device {
    fn drop(&mut self) {
        if !self.destroyed && (self.fbo.is_some() || !self.buffers.is_empty()) {
            warn!("region dropped without being destroyed; its GPU resources leak");
        }
    }
}

fn upload<D, T>(device: &D, slot: &mut Option<D::Buffer>, data: &[T], target: BufferTarget)
                -> Result<(), GpuError>
                where D: Device, T: Copy {
    if slot.is_none() {
        *slot = Some(device.create_buffer());
    }
    if let Some(ref buffer) = *slot {
        device.upload_to_buffer(buffer, data, target, BufferUploadMode::Static)?;
    }
    Ok(())
}

fn quad_tex_coords(inset_x: f32, inset_y: f32) -> [[f32; 2]; 4] {
    let (min_x, min_y, max_x, max_y) = (inset_x, inset_y, 1.0 - inset_x, 1.0 - inset_y);
    [[min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y]]
}

#[cfg(test)]
mod test {
    use crate::options::{RegionOptions, RenderModes};
    use curvegraph_content::command::OutlineSink;
    use curvegraph_content::outline::OutlineShape;
    use curvegraph_content::tessellation::{CurveParams, TessVertex, Tessellation, Triangle};
    use curvegraph_content::tessellation::TriangleKind;
    use curvegraph_geometry::rect::{RectF, RectI};
    use curvegraph_geometry::transform3d::Transform4F;
    use curvegraph_geometry::vector::{vec2f, vec2i};
    use curvegraph_gpu::headless::HeadlessDevice;
    use curvegraph_gpu::{Device, StencilOp};
    use super::{DrawStatus, Region, RegionError, RegionKind, RenderParams};

    fn square() -> OutlineShape {
        let mut shape = OutlineShape::new();
        shape.move_to(vec2f(0.0, 0.0));
        shape.line_to(vec2f(0.0, 10.0));
        shape.line_to(vec2f(10.0, 10.0));
        shape.line_to(vec2f(10.0, 0.0));
        shape.close();
        shape
    }

    fn params(scale: f32) -> RenderParams {
        let view = RectF::new(vec2f(0.0, 0.0), vec2f(100.0, 100.0));
        RenderParams {
            pmv: Transform4F::from_ortho_rect(view) * Transform4F::from_uniform_scale(scale),
            viewport: RectI::new(vec2i(0, 0), vec2i(100, 100)),
            color: [1.0, 0.0, 0.0, 1.0],
        }
    }

    fn updated_region(device: &HeadlessDevice, kind: RegionKind) -> Region<HeadlessDevice> {
        drop(env_logger::try_init());
        let mut region = Region::new(kind, RegionOptions::default());
        region.add_outline_shape(&square(), &Transform4F::default());
        region.update(device).unwrap();
        region
    }

    #[test]
    fn test_dirty_clean_transitions() {
        let device = HeadlessDevice::new();
        let mut region = Region::new(RegionKind::SinglePass, RegionOptions::default());
        assert!(!region.is_dirty());

        region.add_outline_shape(&square(), &Transform4F::default());
        assert!(region.is_dirty());
        assert_eq!(region.draw(&device, &params(1.0)), Err(RegionError::NotUpdated));

        region.update(&device).unwrap();
        assert!(!region.is_dirty());
        assert_eq!(region.generation(), 1);
        assert_eq!(region.bounds(), RectF::new(vec2f(0.0, 0.0), vec2f(10.0, 10.0)));

        // A second update without mutation does nothing.
        let uploads = device.upload_count();
        region.update(&device).unwrap();
        assert_eq!(region.generation(), 1);
        assert_eq!(device.upload_count(), uploads);

        region.push_index(0);
        assert!(region.is_dirty());
        region.destroy(&device);
    }

    #[test]
    fn test_shared_vertices_get_one_id() {
        let vertex = |x, y| TessVertex {
            position: vec2f(x, y),
            z: 0.0,
            curve: CurveParams::INTERIOR,
        };
        let tessellation = Tessellation {
            vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(1.0, 1.0), vertex(0.0, 1.0)],
            triangles: vec![
                Triangle { indices: [0, 1, 2], kind: TriangleKind::Interior },
                Triangle { indices: [0, 2, 3], kind: TriangleKind::Interior },
            ],
            bounds: RectF::new(vec2f(0.0, 0.0), vec2f(1.0, 1.0)),
        };

        let mut region: Region<HeadlessDevice> =
            Region::new(RegionKind::SinglePass, RegionOptions::default());
        region.add_tessellation(&tessellation);
        assert_eq!(region.num_vertices(), 4);
        assert_eq!(region.num_indices(), 6);
        assert_eq!(region.indices.as_slice(), &[0u32, 1, 2, 0, 2, 3][..]);
        assert!(region.is_dirty());

        // The same tessellation added again gets its own vertices.
        region.add_tessellation(&tessellation);
        assert_eq!(region.num_vertices(), 8);
        assert_eq!(&region.indices.as_slice()[6..], &[4u32, 5, 6, 4, 6, 7][..]);
    }

    #[test]
    fn test_single_pass_stencils_then_covers() {
        let device = HeadlessDevice::new();
        let mut region = updated_region(&device, RegionKind::SinglePass);
        assert_eq!(region.draw(&device, &params(1.0)), Ok(DrawStatus::Drawn));

        let calls = device.draw_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].index_count, 6);
        assert_eq!(calls[0].render_state.stencil.map(|stencil| stencil.op),
                   Some(StencilOp::Invert));
        assert!(!calls[0].render_state.color_mask);
        assert_eq!(calls[1].render_state.stencil.map(|stencil| stencil.op),
                   Some(StencilOp::Zero));
        assert!(calls.iter().all(|call| call.framebuffer.is_none()));
        region.destroy(&device);
    }

    #[test]
    fn test_two_pass_rerenders_only_when_needed() {
        let device = HeadlessDevice::new();
        let mut region = updated_region(&device, RegionKind::TwoPassVbaa);
        assert!(region.is_fbo_dirty());

        region.draw(&device, &params(1.0)).unwrap();
        assert_eq!(device.draw_calls().len(), 3);
        assert!(!region.is_fbo_dirty());
        // 10 pixels plus a 2 pixel border on each side, supersampled 4 times.
        let fbo_size = device.framebuffer_size(region.fbo().unwrap().framebuffer());
        assert_eq!(fbo_size, vec2i(56, 56));

        device.clear_log();
        region.draw(&device, &params(1.0)).unwrap();
        assert_eq!(device.draw_calls().len(), 1);
        assert_eq!(device.framebuffer_resets(), 0);

        device.clear_log();
        region.draw(&device, &params(2.0)).unwrap();
        assert_eq!(device.draw_calls().len(), 3);
        assert_eq!(device.framebuffer_resets(), 1);
        assert_eq!(region.fbo().unwrap().footprint(), vec2i(24, 24));
        region.destroy(&device);
    }

    #[test]
    fn test_resize_boundary_absorbs_small_changes() {
        let device = HeadlessDevice::new();
        let options = RegionOptions {
            render_modes: RenderModes::MSAA,
            resize_boundary: 4,
            ..RegionOptions::default()
        };
        let mut region = Region::from_options(options);
        assert_eq!(region.kind(), RegionKind::TwoPassMsaa);
        region.add_outline_shape(&square(), &Transform4F::default());
        region.update(&device).unwrap();

        region.draw(&device, &params(1.0)).unwrap();
        assert_eq!(region.fbo().unwrap().framebuffer().samples(), 4);
        region.draw(&device, &params(1.2)).unwrap();
        assert_eq!(device.framebuffer_resets(), 0);
        region.destroy(&device);
    }

    #[test]
    fn test_geometry_change_rerenders_offscreen() {
        let device = HeadlessDevice::new();
        let mut region = updated_region(&device, RegionKind::TwoPassMsaa);
        region.draw(&device, &params(1.0)).unwrap();

        region.add_outline_shape(&square(), &Transform4F::from_translation(1.0, 1.0, 0.0));
        region.update(&device).unwrap();
        assert!(region.is_fbo_dirty());
        device.clear_log();
        region.draw(&device, &params(1.0)).unwrap();
        assert_eq!(device.draw_calls().len(), 3);
        region.destroy(&device);
    }

    #[test]
    fn test_degenerate_bounds_are_skipped() {
        let device = HeadlessDevice::new();
        let mut region = Region::new(RegionKind::SinglePass, RegionOptions::default());
        let mut line = OutlineShape::new();
        line.move_to(vec2f(0.0, 0.0));
        line.line_to(vec2f(10.0, 0.0));
        line.line_to(vec2f(20.0, 0.0));
        line.close();
        region.add_outline_shape(&line, &Transform4F::default());
        region.update(&device).unwrap();
        assert_eq!(region.draw(&device, &params(1.0)), Ok(DrawStatus::Skipped));
        assert!(device.draw_calls().is_empty());
        region.destroy(&device);
    }

    #[test]
    fn test_destroy_releases_everything_once() {
        let device = HeadlessDevice::new();
        let mut region = updated_region(&device, RegionKind::TwoPassVbaa);
        region.draw(&device, &params(1.0)).unwrap();
        assert_eq!(device.live_framebuffer_count(), 1);
        assert_eq!(device.live_buffer_count(), 6);

        region.destroy(&device);
        assert_eq!(device.live_framebuffer_count(), 0);
        assert_eq!(device.live_buffer_count(), 0);
        region.destroy(&device);
        assert_eq!(region.draw(&device, &params(1.0)), Err(RegionError::Destroyed));
        assert_eq!(region.update(&device), Err(RegionError::Destroyed));
    }

    #[test]
    fn test_color_channel_uploads_colors() {
        let device = HeadlessDevice::new();
        let options =
            RegionOptions { render_modes: RenderModes::COLOR_CHANNEL, ..RegionOptions::default() };
        let mut region = Region::from_options(options);
        region.set_color([0.0, 1.0, 0.0, 1.0]);
        region.add_outline_shape(&square(), &Transform4F::default());
        region.update(&device).unwrap();
        assert_eq!(region.colors.len(), region.num_vertices());
        assert_eq!(device.live_buffer_count(), 7);
        region.destroy(&device);
    }
}
