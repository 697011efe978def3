// curvegraph/geometry/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Basic geometry for the curvegraph renderer: vectors, bounding boxes and the 4x4 transforms
//! needed to project bounding boxes to the screen.

pub mod rect;
pub mod transform3d;
pub mod util;
pub mod vector;
