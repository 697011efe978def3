// curvegraph/geometry/src/util.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various utilities.

/// Rounds a pixel extent up to the next whole pixel.
#[inline]
pub fn ceil_to_pixels(extent: f32) -> i32 {
    extent.ceil().max(0.0) as i32
}
