// curvegraph/font/src/font.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fonts and their glyph caches.

use crate::error::FontError;
use crate::glyph::Glyph;
use crate::kerning::KerningTable;
use crate::outline::OutlineBuilder;
use crate::source::GlyphSource;
use curvegraph_geometry::rect::RectF;
use curvegraph_geometry::vector::Vector2F;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How glyphs are built from the source data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontOptions {
    /// Whether kerning tables are read and applied to string metrics.
    pub kerning: bool,
    /// Whether glyphs without an outline but with a bounding box get a hollow box, so that
    /// missing outlines are visible.
    pub placeholder_for_empty_glyphs: bool,
}

impl Default for FontOptions {
    #[inline]
    fn default() -> FontOptions {
        FontOptions { kerning: true, placeholder_for_empty_glyphs: false }
    }
}

/// A font with a lazily filled glyph cache.
///
/// Glyphs are built on first access and kept for the lifetime of the font.
pub struct Font<S> where S: GlyphSource {
    source: S,
    options: FontOptions,
    scale: f32,
    glyphs: FxHashMap<u16, Arc<Glyph>>,
}

impl<S> Font<S> where S: GlyphSource {
    pub fn new(source: S, options: FontOptions) -> Result<Font<S>, FontError> {
        let units_per_em = source.units_per_em();
        if units_per_em == 0 {
            return Err(FontError::InvalidUnitsPerEm);
        }
        Ok(Font { source, options, scale: 1.0 / units_per_em as f32, glyphs: FxHashMap::default() })
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn options(&self) -> &FontOptions {
        &self.options
    }

    /// The factor converting font units to EM units.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn ascent_em(&self) -> f32 {
        self.source.ascent() as f32 * self.scale
    }

    #[inline]
    pub fn descent_em(&self) -> f32 {
        self.source.descent() as f32 * self.scale
    }

    #[inline]
    pub fn line_gap_em(&self) -> f32 {
        self.source.line_gap() as f32 * self.scale
    }

    #[inline]
    pub fn line_height_em(&self) -> f32 {
        self.ascent_em() - self.descent_em() + self.line_gap_em()
    }

    #[inline]
    pub fn cached_glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph(&mut self, glyph_id: u16) -> Result<Arc<Glyph>, FontError> {
        self.load_glyph(glyph_id, None)
    }

    /// Returns the glyph for `character`, or `None` if the font doesn't map it.
    pub fn glyph_for_char(&mut self, character: char) -> Result<Option<Arc<Glyph>>, FontError> {
        match self.source.glyph_id_for_char(character) {
            None => Ok(None),
            Some(glyph_id) => self.load_glyph(glyph_id, Some(character)).map(Some),
        }
    }

    /// The width of the widest line of `text`, kerned if enabled.
    pub fn string_width_em(&mut self, text: &str) -> Result<f32, FontError> {
        Ok(self.measure(text)?.0)
    }

    /// The box from the origin enclosing all lines of `text`.
    pub fn string_bounds_em(&mut self, text: &str) -> Result<RectF, FontError> {
        let (width, line_count) = self.measure(text)?;
        let height = line_count as f32 * self.line_height_em();
        Ok(RectF::new(Vector2F::zero(), Vector2F::new(width, height)))
    }

    fn measure(&mut self, text: &str) -> Result<(f32, usize), FontError> {
        let (mut width, mut line_width, mut line_count) = (0.0f32, 0.0, 1);
        let mut previous: Option<Arc<Glyph>> = None;
        for character in text.chars() {
            if character == '\n' {
                width = width.max(line_width);
                line_width = 0.0;
                line_count += 1;
                previous = None;
                continue;
            }
            let glyph = match self.glyph_for_char(character)? {
                Some(glyph) => glyph,
                None => continue,
            };
            if let Some(ref previous) = previous {
                line_width += self.kerning_em(previous, glyph.id());
            }
            line_width += glyph.advance_em(self.scale);
            previous = Some(glyph);
        }
        Ok((width.max(line_width), line_count))
    }

    /// The kerning adjustment between `left` and a following `right`, or 0 if kerning is off.
    #[inline]
    pub fn kerning_em(&self, left: &Glyph, right: u16) -> f32 {
        if self.options.kerning {
            left.kerning_em(right, self.scale)
        } else {
            0.0
        }
    }

    fn load_glyph(&mut self, glyph_id: u16, codepoint: Option<char>)
                  -> Result<Arc<Glyph>, FontError> {
        if let Some(glyph) = self.glyphs.get(&glyph_id) {
            return Ok((*glyph).clone());
        }

        let data = self.source.glyph_data(glyph_id)?;
        let builder = OutlineBuilder::new(glyph_id, self.source.outline_format());
        let mut shape = builder.build_shape(&data.points)?;
        if shape.is_none() && self.options.placeholder_for_empty_glyphs &&
                !data.bounds.is_degenerate() {
            debug!("glyph {} has no outline; using a placeholder", glyph_id);
            shape = Some(OutlineBuilder::placeholder_shape(data.bounds));
        }

        let kerning = if self.options.kerning {
            KerningTable::for_glyph(glyph_id, self.source.kerning_pairs())
        } else {
            KerningTable::default()
        };

        let glyph = Arc::new(Glyph {
            id: glyph_id,
            codepoint,
            advance: data.advance,
            bounds: data.bounds,
            kerning,
            shape: shape.map(Arc::new),
        });
        self.glyphs.insert(glyph_id, glyph.clone());
        Ok(glyph)
    }
}

#[cfg(test)]
mod test {
    use crate::error::FontError;
    use crate::kerning::KerningPair;
    use crate::outline::OutlineFormat;
    use crate::point::Point;
    use crate::source::{GlyphData, MemoryGlyphSource};
    use curvegraph_geometry::rect::RectF;
    use curvegraph_geometry::vector::vec2f;
    use std::sync::Arc;
    use super::{Font, FontOptions};

    fn source() -> MemoryGlyphSource {
        let mut source = MemoryGlyphSource::new(1000, OutlineFormat::TrueType);
        source.set_vertical_metrics(800, -200, 100);
        let square = vec![
            Point::on(0, 0),
            Point::on(0, 500),
            Point::on(500, 500),
            Point::on(500, 0).end_of_contour(),
        ];
        let bounds = RectF::from_points(vec2f(0.0, 0.0), vec2f(500.0, 500.0));
        source.add_glyph(1, GlyphData { points: square, advance: 600, bounds });
        source.add_glyph(2, GlyphData { points: vec![], advance: 250, bounds: RectF::default() });
        source.add_glyph(3, GlyphData { points: vec![], advance: 600, bounds });
        source.map_char('A', 1);
        source.map_char(' ', 2);
        source.map_char('?', 3);
        source.add_kerning_pair(KerningPair::new(1, 1, -100));
        source
    }

    #[test]
    fn test_glyphs_are_cached() {
        let mut font = Font::new(source(), FontOptions::default()).unwrap();
        assert_eq!(font.cached_glyph_count(), 0);
        let first = font.glyph_for_char('A').unwrap().unwrap();
        let second = font.glyph(1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(font.cached_glyph_count(), 1);
        assert_eq!(second.codepoint(), Some('A'));
        assert!(!first.is_whitespace());
    }

    #[test]
    fn test_metrics_are_scaled_to_em() {
        let font = Font::new(source(), FontOptions::default()).unwrap();
        assert_eq!(font.scale(), 0.001);
        assert!((font.ascent_em() - 0.8).abs() < 1e-6);
        assert!((font.descent_em() + 0.2).abs() < 1e-6);
        assert!((font.line_height_em() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_string_width_applies_kerning() {
        let mut font = Font::new(source(), FontOptions::default()).unwrap();
        assert!((font.string_width_em("AA").unwrap() - 1.1).abs() < 1e-6);
        assert!((font.string_width_em("A A").unwrap() - 1.45).abs() < 1e-6);

        let options = FontOptions { kerning: false, ..FontOptions::default() };
        let mut font = Font::new(source(), options).unwrap();
        assert!((font.string_width_em("AA").unwrap() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_string_bounds_cover_every_line() {
        let mut font = Font::new(source(), FontOptions::default()).unwrap();
        let bounds = font.string_bounds_em("A\nAA").unwrap();
        assert_eq!(bounds.origin(), vec2f(0.0, 0.0));
        assert!((bounds.width() - 1.1).abs() < 1e-6);
        assert!((bounds.height() - 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_placeholder_for_empty_glyphs() {
        let mut font = Font::new(source(), FontOptions::default()).unwrap();
        assert!(font.glyph_for_char('?').unwrap().unwrap().is_whitespace());

        let options = FontOptions { placeholder_for_empty_glyphs: true, ..FontOptions::default() };
        let mut font = Font::new(source(), options).unwrap();
        let glyph = font.glyph_for_char('?').unwrap().unwrap();
        assert_eq!(glyph.shape().map(|shape| shape.outlines().len()), Some(2));
        // A space has no bounding box, so it stays empty.
        assert!(font.glyph_for_char(' ').unwrap().unwrap().is_whitespace());
    }

    #[test]
    fn test_zero_units_per_em_is_rejected() {
        let source = MemoryGlyphSource::new(0, OutlineFormat::TrueType);
        assert!(match Font::new(source, FontOptions::default()) {
            Err(FontError::InvalidUnitsPerEm) => true,
            _ => false,
        });
    }

    #[test]
    fn test_options_from_json() {
        let options: FontOptions =
            serde_json::from_str(r#"{ "placeholder_for_empty_glyphs": true }"#).unwrap();
        assert!(options.kerning);
        assert!(options.placeholder_for_empty_glyphs);
    }
}
