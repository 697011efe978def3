// curvegraph/font/src/typesetter.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Simple text layout.
//!
//! Left-to-right only, one glyph per character, with explicit line breaks. There is no shaping,
//! no bidi, and no wrapping.

use crate::error::FontError;
use crate::font::Font;
use crate::source::GlyphSource;
use crate::glyph::Glyph;
use std::sync::Arc;
use curvegraph_geometry::vector::Vector2F;

pub struct Typesetter {
    font_size: f32,
}

impl Typesetter {
    #[inline]
    pub fn new(font_size: f32) -> Typesetter {
        Typesetter { font_size }
    }

    #[inline]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Positions every drawable character of `text`.
    ///
    /// The first baseline sits one ascent below the origin and each `\n` moves down by the
    /// font's line height. Positions are in EM units times the font size.
    pub fn layout<S>(&self, font: &mut Font<S>, text: &str)
                     -> Result<Vec<GlyphPosition>, FontError>
                     where S: GlyphSource {
        let mut positions = vec![];
        let line_height = font.line_height_em() * self.font_size;
        let mut cursor = Vector2F::new(0.0, font.ascent_em() * self.font_size);
        let mut previous: Option<Arc<Glyph>> = None;

        for character in text.chars() {
            if character == '\n' {
                cursor = Vector2F::new(0.0, cursor.y() + line_height);
                previous = None;
                continue;
            }

            let glyph = match font.glyph_for_char(character)? {
                Some(glyph) => glyph,
                None => {
                    warn!("no glyph for {:?}; skipping", character);
                    continue;
                }
            };

            if let Some(ref previous) = previous {
                let kerning = font.kerning_em(previous, glyph.id()) * self.font_size;
                cursor.set_x(cursor.x() + kerning);
            }
            if !glyph.is_whitespace() {
                positions.push(GlyphPosition { glyph_id: glyph.id(), origin: cursor });
            }
            cursor.set_x(cursor.x() + glyph.advance_em(font.scale()) * self.font_size);
            previous = Some(glyph);
        }

        Ok(positions)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPosition {
    pub glyph_id: u16,
    pub origin: Vector2F,
}

#[cfg(test)]
mod test {
    use crate::font::{Font, FontOptions};
    use crate::kerning::KerningPair;
    use crate::outline::OutlineFormat;
    use crate::point::Point;
    use crate::source::{GlyphData, MemoryGlyphSource};
    use curvegraph_geometry::rect::RectF;
    use curvegraph_geometry::vector::vec2f;
    use super::Typesetter;

    fn font() -> Font<MemoryGlyphSource> {
        let mut source = MemoryGlyphSource::new(100, OutlineFormat::TrueType);
        source.set_vertical_metrics(80, -20, 0);
        let bar = vec![
            Point::on(0, 0),
            Point::on(0, 50),
            Point::on(10, 50),
            Point::on(10, 0).end_of_contour(),
        ];
        let bounds = RectF::from_points(vec2f(0.0, 0.0), vec2f(10.0, 50.0));
        source.add_glyph(1, GlyphData { points: bar, advance: 20, bounds });
        source.add_glyph(2, GlyphData { points: vec![], advance: 30, bounds: RectF::default() });
        source.map_char('l', 1);
        source.map_char(' ', 2);
        source.add_kerning_pair(KerningPair::new(1, 1, -5));
        Font::new(source, FontOptions::default()).unwrap()
    }

    #[test]
    fn test_layout_advances_kerns_and_breaks_lines() {
        let mut font = font();
        let positions = Typesetter::new(10.0).layout(&mut font, "ll l\nl").unwrap();
        let origins: Vec<_> = positions.iter().map(|position| position.origin).collect();
        assert_eq!(origins.len(), 4);
        assert_eq!(origins[0].x(), 0.0);
        assert!((origins[0].y() - 8.0).abs() < 1e-5);
        assert!((origins[1].x() - 1.5).abs() < 1e-5);
        assert!((origins[2].x() - 6.5).abs() < 1e-5);
        assert_eq!(origins[3].x(), 0.0);
        assert!((origins[3].y() - 18.0).abs() < 1e-5);
    }

    #[test]
    fn test_unmapped_characters_are_skipped() {
        let _ = env_logger::try_init();
        let mut font = font();
        let positions = Typesetter::new(1.0).layout(&mut font, "lxl").unwrap();
        assert_eq!(positions.len(), 2);
        // The missing character doesn't break kerning state, but it does not advance either.
        assert!((positions[1].origin.x() - 0.15).abs() < 1e-5);
    }
}
