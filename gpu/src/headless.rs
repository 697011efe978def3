// curvegraph/gpu/src/headless.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A device that keeps everything in CPU memory and records what it was asked to do.

use crate::{BufferTarget, BufferUploadMode, Device, GpuError, Primitive, RenderState};
use crate::{TextureFormat, UniformData, UniformId, VertexAttr};
use curvegraph_geometry::rect::RectI;
use curvegraph_geometry::vector::Vector2I;
use fxhash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::mem;

const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8cd6;
const FRAMEBUFFER_INCOMPLETE_MULTISAMPLE: u32 = 0x8d56;

/// Limits of a headless device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessLimits {
    pub max_framebuffer_size: i32,
    pub max_samples: u32,
    pub max_buffer_bytes: usize,
}

impl Default for HeadlessLimits {
    #[inline]
    fn default() -> HeadlessLimits {
        HeadlessLimits {
            max_framebuffer_size: 8192,
            max_samples: 8,
            max_buffer_bytes: 64 * 1024 * 1024,
        }
    }
}

pub struct HeadlessDevice {
    limits: HeadlessLimits,
    state: RefCell<HeadlessState>,
}

#[derive(Default)]
struct HeadlessState {
    next_handle: u32,
    live_buffers: FxHashSet<u32>,
    live_framebuffers: FxHashSet<u32>,
    bound_framebuffer: Option<u32>,
    uniforms: FxHashMap<UniformId, UniformData>,
    draw_calls: Vec<DrawCall>,
    upload_count: usize,
    framebuffer_resets: usize,
}

impl HeadlessState {
    fn allocate_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[derive(Debug)]
pub struct HeadlessBuffer {
    handle: u32,
    len: Cell<usize>,
}

impl HeadlessBuffer {
    #[inline]
    pub fn handle(&self) -> u32 {
        self.handle
    }

    /// The size of the last upload, in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }
}

#[derive(Debug)]
pub struct HeadlessFramebuffer {
    handle: u32,
    samples: u32,
    texture: HeadlessTexture,
}

impl HeadlessFramebuffer {
    #[inline]
    pub fn handle(&self) -> u32 {
        self.handle
    }

    #[inline]
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

#[derive(Debug)]
pub struct HeadlessTexture {
    format: TextureFormat,
    size: Vector2I,
}

impl HeadlessTexture {
    #[inline]
    pub fn size(&self) -> Vector2I {
        self.size
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

/// A recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub index_count: u32,
    pub render_state: RenderState,
    /// The bound framebuffer, or `None` for the default one.
    pub framebuffer: Option<u32>,
}

impl HeadlessDevice {
    #[inline]
    pub fn new() -> HeadlessDevice {
        HeadlessDevice::with_limits(HeadlessLimits::default())
    }

    pub fn with_limits(limits: HeadlessLimits) -> HeadlessDevice {
        HeadlessDevice { limits, state: RefCell::new(HeadlessState::default()) }
    }

    #[inline]
    pub fn live_buffer_count(&self) -> usize {
        self.state.borrow().live_buffers.len()
    }

    #[inline]
    pub fn live_framebuffer_count(&self) -> usize {
        self.state.borrow().live_framebuffers.len()
    }

    #[inline]
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draw_calls.clone()
    }

    #[inline]
    pub fn upload_count(&self) -> usize {
        self.state.borrow().upload_count
    }

    #[inline]
    pub fn framebuffer_resets(&self) -> usize {
        self.state.borrow().framebuffer_resets
    }

    #[inline]
    pub fn uniform(&self, uniform: UniformId) -> Option<UniformData> {
        self.state.borrow().uniforms.get(&uniform).cloned()
    }

    /// Forgets the recorded draw calls and uploads.
    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.draw_calls.clear();
        state.upload_count = 0;
    }

    fn check_framebuffer(&self, handle: u32, size: Vector2I, samples: u32)
                         -> Result<(), GpuError> {
        let max_size = self.limits.max_framebuffer_size;
        if size.x() <= 0 || size.y() <= 0 || size.x() > max_size || size.y() > max_size {
            return Err(GpuError::FramebufferIncomplete {
                handle,
                status: FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            });
        }
        if samples > self.limits.max_samples {
            return Err(GpuError::FramebufferIncomplete {
                handle,
                status: FRAMEBUFFER_INCOMPLETE_MULTISAMPLE,
            });
        }
        Ok(())
    }
}

impl Default for HeadlessDevice {
    #[inline]
    fn default() -> HeadlessDevice {
        HeadlessDevice::new()
    }
}

impl Device for HeadlessDevice {
    type Buffer = HeadlessBuffer;
    type Framebuffer = HeadlessFramebuffer;
    type Texture = HeadlessTexture;

    fn create_buffer(&self) -> HeadlessBuffer {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate_handle();
        state.live_buffers.insert(handle);
        HeadlessBuffer { handle, len: Cell::new(0) }
    }

    fn upload_to_buffer<T>(&self,
                           buffer: &HeadlessBuffer,
                           data: &[T],
                           _: BufferTarget,
                           _: BufferUploadMode)
                           -> Result<(), GpuError>
                           where T: Copy {
        let size = data.len() * mem::size_of::<T>();
        if size > self.limits.max_buffer_bytes {
            return Err(GpuError::OutOfMemory { what: "buffer", size });
        }
        buffer.len.set(size);
        self.state.borrow_mut().upload_count += 1;
        Ok(())
    }

    fn bind_buffer(&self, buffer: &HeadlessBuffer, _: BufferTarget) {
        debug_assert!(self.state.borrow().live_buffers.contains(&buffer.handle));
    }

    fn bind_vertex_attr(&self, buffer: &HeadlessBuffer, _: VertexAttr, _: usize) {
        debug_assert!(self.state.borrow().live_buffers.contains(&buffer.handle));
    }

    fn create_framebuffer(&self, size: Vector2I, format: TextureFormat, samples: u32)
                          -> Result<HeadlessFramebuffer, GpuError> {
        let handle = self.state.borrow_mut().allocate_handle();
        self.check_framebuffer(handle, size, samples)?;
        self.state.borrow_mut().live_framebuffers.insert(handle);
        Ok(HeadlessFramebuffer { handle, samples, texture: HeadlessTexture { format, size } })
    }

    fn reset_framebuffer(&self, framebuffer: &mut HeadlessFramebuffer, size: Vector2I)
                         -> Result<(), GpuError> {
        self.check_framebuffer(framebuffer.handle, size, framebuffer.samples)?;
        framebuffer.texture.size = size;
        self.state.borrow_mut().framebuffer_resets += 1;
        Ok(())
    }

    #[inline]
    fn framebuffer_size(&self, framebuffer: &HeadlessFramebuffer) -> Vector2I {
        framebuffer.texture.size
    }

    #[inline]
    fn framebuffer_texture<'f>(&self, framebuffer: &'f HeadlessFramebuffer)
                               -> &'f HeadlessTexture {
        &framebuffer.texture
    }

    fn bind_framebuffer(&self, framebuffer: &HeadlessFramebuffer) {
        self.state.borrow_mut().bound_framebuffer = Some(framebuffer.handle);
    }

    fn bind_default_framebuffer(&self, _: RectI) {
        self.state.borrow_mut().bound_framebuffer = None;
    }

    fn bind_texture(&self, _: &HeadlessTexture, _: u32) {}

    fn set_uniform(&self, uniform: UniformId, data: UniformData) {
        self.state.borrow_mut().uniforms.insert(uniform, data);
    }

    fn clear(&self, _: Option<[f32; 4]>, _: Option<u8>) {}

    fn draw_elements(&self, primitive: Primitive, index_count: u32, render_state: &RenderState) {
        let mut state = self.state.borrow_mut();
        let framebuffer = state.bound_framebuffer;
        state.draw_calls.push(DrawCall {
            primitive,
            index_count,
            render_state: render_state.clone(),
            framebuffer,
        });
    }

    fn destroy_buffer(&self, buffer: HeadlessBuffer) {
        if !self.state.borrow_mut().live_buffers.remove(&buffer.handle) {
            warn!("destroying unknown buffer {:#x}", buffer.handle);
        }
    }

    fn destroy_framebuffer(&self, framebuffer: HeadlessFramebuffer) {
        let mut state = self.state.borrow_mut();
        if !state.live_framebuffers.remove(&framebuffer.handle) {
            warn!("destroying unknown framebuffer {:#x}", framebuffer.handle);
        }
        if state.bound_framebuffer == Some(framebuffer.handle) {
            state.bound_framebuffer = None;
        }
    }
}
