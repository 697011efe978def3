// curvegraph/font/src/source.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where glyph data comes from.
//!
//! Parsing the font tables themselves is left to the embedder, which exposes the parsed data
//! through `GlyphSource`.

use crate::error::FontError;
use crate::kerning::KerningPair;
use crate::outline::OutlineFormat;
use crate::point::Point;
use curvegraph_geometry::rect::RectF;
use fxhash::FxHashMap;

/// The raw data of one glyph, in font units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphData {
    pub points: Vec<Point>,
    pub advance: i32,
    pub bounds: RectF,
}

/// Font-wide metrics plus per-glyph lookup.
pub trait GlyphSource {
    fn units_per_em(&self) -> u16;
    fn ascent(&self) -> i32;
    fn descent(&self) -> i32;
    fn line_gap(&self) -> i32;
    fn outline_format(&self) -> OutlineFormat;
    fn glyph_id_for_char(&self, character: char) -> Option<u16>;
    fn glyph_data(&self, glyph_id: u16) -> Result<GlyphData, FontError>;

    /// All kerning pairs of the font, sorted by left and then right glyph ID.
    fn kerning_pairs(&self) -> &[KerningPair];
}

/// A glyph source backed by tables held in memory.
#[derive(Clone, Debug)]
pub struct MemoryGlyphSource {
    units_per_em: u16,
    ascent: i32,
    descent: i32,
    line_gap: i32,
    format: OutlineFormat,
    glyphs: FxHashMap<u16, GlyphData>,
    char_map: FxHashMap<char, u16>,
    kerning_pairs: Vec<KerningPair>,
}

impl MemoryGlyphSource {
    pub fn new(units_per_em: u16, format: OutlineFormat) -> MemoryGlyphSource {
        MemoryGlyphSource {
            units_per_em,
            ascent: 0,
            descent: 0,
            line_gap: 0,
            format,
            glyphs: FxHashMap::default(),
            char_map: FxHashMap::default(),
            kerning_pairs: vec![],
        }
    }

    /// Sets the vertical metrics. `descent` is negative below the baseline.
    pub fn set_vertical_metrics(&mut self, ascent: i32, descent: i32, line_gap: i32) {
        self.ascent = ascent;
        self.descent = descent;
        self.line_gap = line_gap;
    }

    pub fn add_glyph(&mut self, glyph_id: u16, data: GlyphData) {
        self.glyphs.insert(glyph_id, data);
    }

    pub fn map_char(&mut self, character: char, glyph_id: u16) {
        self.char_map.insert(character, glyph_id);
    }

    /// Adds or replaces a kerning pair, keeping the pair list sorted.
    pub fn add_kerning_pair(&mut self, pair: KerningPair) {
        let key = (pair.left, pair.right);
        match self.kerning_pairs.binary_search_by_key(&key, |pair| (pair.left, pair.right)) {
            Ok(index) => self.kerning_pairs[index] = pair,
            Err(index) => self.kerning_pairs.insert(index, pair),
        }
    }

    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

impl GlyphSource for MemoryGlyphSource {
    #[inline]
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    #[inline]
    fn ascent(&self) -> i32 {
        self.ascent
    }

    #[inline]
    fn descent(&self) -> i32 {
        self.descent
    }

    #[inline]
    fn line_gap(&self) -> i32 {
        self.line_gap
    }

    #[inline]
    fn outline_format(&self) -> OutlineFormat {
        self.format
    }

    #[inline]
    fn glyph_id_for_char(&self, character: char) -> Option<u16> {
        self.char_map.get(&character).cloned()
    }

    fn glyph_data(&self, glyph_id: u16) -> Result<GlyphData, FontError> {
        self.glyphs.get(&glyph_id).cloned().ok_or(FontError::GlyphNotFound(glyph_id))
    }

    #[inline]
    fn kerning_pairs(&self) -> &[KerningPair] {
        &self.kerning_pairs
    }
}

#[cfg(test)]
mod test {
    use crate::error::FontError;
    use crate::kerning::KerningPair;
    use crate::outline::OutlineFormat;
    use super::{GlyphSource, MemoryGlyphSource};

    #[test]
    fn test_kerning_pairs_stay_sorted() {
        let mut source = MemoryGlyphSource::new(1000, OutlineFormat::TrueType);
        source.add_kerning_pair(KerningPair::new(5, 2, -10));
        source.add_kerning_pair(KerningPair::new(1, 9, -20));
        source.add_kerning_pair(KerningPair::new(5, 1, -30));
        source.add_kerning_pair(KerningPair::new(5, 2, -40));

        let keys: Vec<_> =
            source.kerning_pairs().iter().map(|pair| (pair.left, pair.right, pair.value)).collect();
        assert_eq!(keys, vec![(1, 9, -20), (5, 1, -30), (5, 2, -40)]);
    }

    #[test]
    fn test_missing_glyph() {
        let source = MemoryGlyphSource::new(1000, OutlineFormat::TrueType);
        assert_eq!(source.glyph_data(3), Err(FontError::GlyphNotFound(3)));
        assert_eq!(source.glyph_id_for_char('a'), None);
    }
}
