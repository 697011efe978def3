// curvegraph/font/src/error.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Errors that can occur when turning font data into glyphs.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FontError {
    /// The glyph source has no glyph with this ID.
    GlyphNotFound(u16),
    /// The point list ends without closing its final contour.
    MalformedGlyphContour {
        glyph_id: u16,
        contour: usize,
    },
    /// A cubic contour has an on/off-curve adjacency that isn't a line or a cubic segment.
    UnsupportedContourPattern {
        glyph_id: u16,
        contour: usize,
        point: usize,
    },
    /// The font declared zero units per em.
    InvalidUnitsPerEm,
}

impl FontError {
    /// Returns true if this error was caused by bad font data rather than by the environment.
    #[inline]
    pub fn is_data_error(&self) -> bool {
        match *self {
            FontError::MalformedGlyphContour { .. } |
            FontError::UnsupportedContourPattern { .. } |
            FontError::InvalidUnitsPerEm => true,
            FontError::GlyphNotFound(_) => false,
        }
    }
}

impl Display for FontError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            FontError::GlyphNotFound(glyph_id) => {
                write!(formatter, "no glyph with ID {}", glyph_id)
            }
            FontError::MalformedGlyphContour { glyph_id, contour } => {
                write!(formatter,
                       "glyph {}: contour {} is not terminated by an end-of-contour point",
                       glyph_id,
                       contour)
            }
            FontError::UnsupportedContourPattern { glyph_id, contour, point } => {
                write!(formatter,
                       "glyph {}: unsupported on/off-curve pattern at point {} of contour {}",
                       glyph_id,
                       point,
                       contour)
            }
            FontError::InvalidUnitsPerEm => write!(formatter, "font has zero units per em"),
        }
    }
}

impl Error for FontError {}
