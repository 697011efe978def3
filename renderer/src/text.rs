// curvegraph/renderer/src/text.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lays out strings and adds their glyphs to a region.

use crate::concurrent::executor::Executor;
use crate::region::Region;
use curvegraph_content::outline::OutlineShape;
use curvegraph_content::tessellation::{self, Tessellation};
use curvegraph_font::error::FontError;
use curvegraph_font::font::Font;
use curvegraph_font::source::GlyphSource;
use curvegraph_font::typesetter::Typesetter;
use curvegraph_geometry::transform3d::Transform4F;
use curvegraph_geometry::vector::Vector2F;
use curvegraph_gpu::Device;
use fxhash::FxHashMap;
use std::sync::Arc;

/// Adds text to regions, tessellating each distinct glyph once per call.
pub struct TextRegionBuilder<E> where E: Executor {
    executor: E,
}

impl<E> TextRegionBuilder<E> where E: Executor {
    #[inline]
    pub fn new(executor: E) -> TextRegionBuilder<E> {
        TextRegionBuilder { executor }
    }

    /// Lays out `text` with its first line's top-left corner at `origin` and appends the
    /// glyphs to `region` in layout order. Returns the number of glyphs added.
    ///
    /// Glyph outlines are y-up in font units; they are flipped into the y-down layout space.
    pub fn add_text<D, S>(&self,
                          region: &mut Region<D>,
                          font: &mut Font<S>,
                          typesetter: &Typesetter,
                          text: &str,
                          origin: Vector2F)
                          -> Result<usize, FontError>
                          where D: Device, S: GlyphSource {
        let positions = typesetter.layout(font, text)?;

        let mut slots: FxHashMap<u16, usize> = FxHashMap::default();
        let mut shapes: Vec<Option<Arc<OutlineShape>>> = vec![];
        for position in &positions {
            if slots.contains_key(&position.glyph_id) {
                continue;
            }
            let glyph = font.glyph(position.glyph_id)?;
            slots.insert(position.glyph_id, shapes.len());
            shapes.push(glyph.shape().cloned());
        }

        let tessellations: Vec<Option<Tessellation>> =
            self.executor.build_vector(shapes.len(), |index| {
                shapes[index].as_ref().map(|shape| tessellation::tessellate(shape))
            });
        debug!("tessellated {} distinct glyphs for {} placements",
               tessellations.len(),
               positions.len());

        let scale = typesetter.font_size() * font.scale();
        let glyph_scale = Transform4F::from_scale(scale, -scale, 1.0);
        let mut added = 0;
        for position in &positions {
            let tessellation = match slots.get(&position.glyph_id)
                                          .and_then(|&slot| tessellations[slot].as_ref()) {
                Some(tessellation) => tessellation,
                None => continue,
            };
            let offset = origin + position.origin;
            let transform = Transform4F::from_translation(offset.x(), offset.y(), 0.0) *
                glyph_scale;
            region.add_tessellation(&tessellation.transformed(&transform));
            added += 1;
        }
        Ok(added)
    }
}
