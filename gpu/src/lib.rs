// curvegraph/gpu/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstractions over GPU device capabilities.

#[macro_use]
extern crate log;

use curvegraph_geometry::rect::RectI;
use curvegraph_geometry::vector::Vector2I;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

pub mod context;
pub mod headless;

/// A device that can hold buffers and framebuffers and draw indexed triangles.
///
/// All methods take `&self`; a device is bound to the thread its context is current on.
pub trait Device {
    type Buffer;
    type Framebuffer;
    type Texture;

    fn create_buffer(&self) -> Self::Buffer;
    fn upload_to_buffer<T>(&self,
                           buffer: &Self::Buffer,
                           data: &[T],
                           target: BufferTarget,
                           mode: BufferUploadMode)
                           -> Result<(), GpuError>
                           where T: Copy;
    fn bind_buffer(&self, buffer: &Self::Buffer, target: BufferTarget);
    /// Binds `buffer` as the source of `attr`, `components` floats per vertex.
    fn bind_vertex_attr(&self, buffer: &Self::Buffer, attr: VertexAttr, components: usize);

    fn create_framebuffer(&self, size: Vector2I, format: TextureFormat, samples: u32)
                          -> Result<Self::Framebuffer, GpuError>;
    /// Reallocates the storage of `framebuffer` at a new size, keeping its format and samples.
    fn reset_framebuffer(&self, framebuffer: &mut Self::Framebuffer, size: Vector2I)
                         -> Result<(), GpuError>;
    fn framebuffer_size(&self, framebuffer: &Self::Framebuffer) -> Vector2I;
    fn framebuffer_texture<'f>(&self, framebuffer: &'f Self::Framebuffer) -> &'f Self::Texture;
    fn bind_framebuffer(&self, framebuffer: &Self::Framebuffer);
    fn bind_default_framebuffer(&self, viewport: RectI);
    fn bind_texture(&self, texture: &Self::Texture, unit: u32);

    fn set_uniform(&self, uniform: UniformId, data: UniformData);
    fn clear(&self, color: Option<[f32; 4]>, stencil: Option<u8>);
    fn draw_elements(&self, primitive: Primitive, index_count: u32, render_state: &RenderState);

    fn destroy_buffer(&self, buffer: Self::Buffer);
    fn destroy_framebuffer(&self, framebuffer: Self::Framebuffer);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    RGBA8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BufferUploadMode {
    Static,
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    Position,
    CurveParams,
    Color,
    TexCoord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformId {
    /// The projection-modelview matrix.
    Pmv,
    /// The color used when vertices carry none.
    StaticColor,
    /// Per-axis sample count of the two-pass resolve.
    SampleCount,
    /// Size of the offscreen texture in pixels.
    TextureSize,
    TextureUnit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformData {
    Mat4([f32; 16]),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    Float(f32),
    TextureUnit(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Triangles,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    pub blend: BlendState,
    pub stencil: Option<StencilState>,
    pub color_mask: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlendState {
    Off,
    RGBSrcAlphaAlphaOneMinusSrcAlpha,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilState {
    pub func: StencilFunc,
    pub reference: u32,
    pub mask: u32,
    pub op: StencilOp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StencilFunc {
    Always,
    Equal,
    NotEqual,
}

/// What happens to the stencil value of a fragment that passes the test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StencilOp {
    Keep,
    Invert,
    Zero,
}

impl Default for RenderState {
    #[inline]
    fn default() -> RenderState {
        RenderState { blend: BlendState::default(), stencil: None, color_mask: true }
    }
}

impl Default for BlendState {
    #[inline]
    fn default() -> BlendState {
        BlendState::Off
    }
}

impl Default for StencilState {
    #[inline]
    fn default() -> StencilState {
        StencilState { func: StencilFunc::default(), reference: 0, mask: !0, op: StencilOp::Keep }
    }
}

impl Default for StencilFunc {
    #[inline]
    fn default() -> StencilFunc {
        StencilFunc::Always
    }
}

impl RenderState {
    /// Writes the fill parity of the drawn triangles into the stencil buffer, leaving the
    /// color untouched.
    pub fn stencil_invert() -> RenderState {
        RenderState {
            blend: BlendState::Off,
            stencil: Some(StencilState {
                func: StencilFunc::Always,
                reference: 0,
                mask: 1,
                op: StencilOp::Invert,
            }),
            color_mask: false,
        }
    }

    /// Colors the fragments whose stencil parity is odd and clears the stencil behind them.
    pub fn stencil_cover() -> RenderState {
        RenderState {
            blend: BlendState::RGBSrcAlphaAlphaOneMinusSrcAlpha,
            stencil: Some(StencilState {
                func: StencilFunc::NotEqual,
                reference: 0,
                mask: 1,
                op: StencilOp::Zero,
            }),
            color_mask: true,
        }
    }

    /// Plain alpha-blended drawing.
    pub fn blended() -> RenderState {
        RenderState {
            blend: BlendState::RGBSrcAlphaAlphaOneMinusSrcAlpha,
            ..RenderState::default()
        }
    }
}

/// Errors reported by a device. Native codes are shown in hex.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuError {
    FramebufferIncomplete {
        handle: u32,
        status: u32,
    },
    OutOfMemory {
        what: &'static str,
        size: usize,
    },
    ContextLost,
}

impl Display for GpuError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            GpuError::FramebufferIncomplete { handle, status } => {
                write!(formatter,
                       "framebuffer {:#x} is incomplete (status {:#06x})",
                       handle,
                       status)
            }
            GpuError::OutOfMemory { what, size } => {
                write!(formatter, "out of memory allocating {} of {:#x} bytes", what, size)
            }
            GpuError::ContextLost => write!(formatter, "the GPU context was lost"),
        }
    }
}

impl Error for GpuError {}

#[cfg(test)]
mod test {
    use super::GpuError;

    #[test]
    fn test_error_display_uses_hex() {
        let error = GpuError::FramebufferIncomplete { handle: 0x1f, status: 0x8cd6 };
        assert_eq!(error.to_string(), "framebuffer 0x1f is incomplete (status 0x8cd6)");
        let error = GpuError::OutOfMemory { what: "vertex buffer", size: 4096 };
        assert_eq!(error.to_string(), "out of memory allocating vertex buffer of 0x1000 bytes");
    }
}
