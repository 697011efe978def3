// curvegraph/font/src/glyph.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A glyph with its outline, metrics and kerning.

use crate::kerning::KerningTable;
use curvegraph_content::outline::OutlineShape;
use curvegraph_geometry::rect::RectF;
use std::sync::Arc;

/// Metrics are in font units; the `_em` accessors convert with the font's scale.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub(crate) id: u16,
    pub(crate) codepoint: Option<char>,
    pub(crate) advance: i32,
    pub(crate) bounds: RectF,
    pub(crate) kerning: KerningTable,
    pub(crate) shape: Option<Arc<OutlineShape>>,
}

impl Glyph {
    #[inline]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// The character this glyph was first looked up for, if any.
    #[inline]
    pub fn codepoint(&self) -> Option<char> {
        self.codepoint
    }

    #[inline]
    pub fn advance(&self) -> i32 {
        self.advance
    }

    #[inline]
    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    #[inline]
    pub fn kerning_table(&self) -> &KerningTable {
        &self.kerning
    }

    #[inline]
    pub fn shape(&self) -> Option<&Arc<OutlineShape>> {
        self.shape.as_ref()
    }

    /// True if the glyph draws nothing, like a space.
    #[inline]
    pub fn is_whitespace(&self) -> bool {
        self.shape.is_none()
    }

    #[inline]
    pub fn advance_em(&self, scale: f32) -> f32 {
        self.advance as f32 * scale
    }

    #[inline]
    pub fn bounds_em(&self, scale: f32) -> RectF {
        self.bounds.scale(scale)
    }

    #[inline]
    pub fn kerning_em(&self, right: u16, scale: f32) -> f32 {
        self.kerning.kerning(right) as f32 * scale
    }
}
