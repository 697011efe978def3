// curvegraph/renderer/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Regions of tessellated outlines drawn with stencil and cover, with optional offscreen
//! antialiasing.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod concurrent;
pub mod fbo;
pub mod options;
pub mod region;
pub mod staging;
pub mod text;
