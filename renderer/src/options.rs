// curvegraph/renderer/src/options.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Options that control how regions are rendered.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// How a region antialiases and colors its geometry.
    #[derive(Default)]
    pub struct RenderModes: u32 {
        /// Two passes, supersampling the offscreen texture by `sample_count` per axis.
        const VBAA = 0x01;
        /// Two passes into a multisampled offscreen texture.
        const MSAA = 0x02;
        /// Vertices carry their own color.
        const COLOR_CHANNEL = 0x04;
    }
}

impl Serialize for RenderModes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for RenderModes {
    fn deserialize<D>(deserializer: D) -> Result<RenderModes, D::Error> where D: Deserializer<'de> {
        let bits = u32::deserialize(deserializer)?;
        Ok(RenderModes::from_bits_truncate(bits))
    }
}

/// Options shared by the regions of one renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOptions {
    pub render_modes: RenderModes,
    /// Samples per axis for VBAA, or per pixel for MSAA.
    pub sample_count: u32,
    /// Pixels of padding on each side of the offscreen texture.
    pub fbo_border: i32,
    /// The offscreen texture is kept while the wanted size is within this many pixels of its
    /// current size on both axes.
    pub resize_boundary: i32,
    /// Capacity multiplier applied when a staging buffer fills up.
    pub growth_factor: f32,
    /// Initial element capacity of staging buffers.
    pub initial_capacity: usize,
}

impl Default for RegionOptions {
    #[inline]
    fn default() -> RegionOptions {
        RegionOptions {
            render_modes: RenderModes::empty(),
            sample_count: 4,
            fbo_border: 2,
            resize_boundary: 0,
            growth_factor: 2.0,
            initial_capacity: 256,
        }
    }
}

impl RegionOptions {
    pub fn from_json(json: &str) -> Result<RegionOptions, serde_json::Error> {
        let options: RegionOptions = serde_json::from_str(json)?;
        Ok(options.sanitized())
    }

    /// Clamps out-of-range values to the nearest usable ones.
    pub fn sanitized(mut self) -> RegionOptions {
        if self.sample_count == 0 {
            warn!("sample count of 0 is invalid; using 1");
            self.sample_count = 1;
        }
        if !(self.growth_factor > 1.0) {
            warn!("growth factor {} is too small; using 2", self.growth_factor);
            self.growth_factor = 2.0;
        }
        self.fbo_border = self.fbo_border.max(0);
        self.resize_boundary = self.resize_boundary.max(0);
        self
    }
}
