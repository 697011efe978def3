// curvegraph/font/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Glyph outlines, kerning and metrics.
//!
//! Fonts are read through a `GlyphSource`, which hands out the raw points of each glyph. The
//! outline builder turns those into `OutlineShape`s that the renderer can tessellate.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod error;
pub mod font;
pub mod glyph;
pub mod kerning;
pub mod outline;
pub mod point;
pub mod source;
pub mod typesetter;

#[cfg(test)]
mod tests;
