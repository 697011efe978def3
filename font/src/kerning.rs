// curvegraph/font/src/kerning.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-glyph horizontal kerning.

use serde::{Deserialize, Serialize};

const INITIAL_CAPACITY: usize = 64;

/// An adjustment to the advance between two glyphs, in font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KerningPair {
    pub left: u16,
    pub right: u16,
    pub value: i32,
}

impl KerningPair {
    #[inline]
    pub fn new(left: u16, right: u16, value: i32) -> KerningPair {
        KerningPair { left, right, value }
    }
}

/// The kerning pairs that have one glyph on their left, sorted by the right glyph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KerningTable {
    pairs: Vec<KerningPair>,
}

impl KerningTable {
    /// Collects the pairs whose left glyph is `glyph_id`.
    ///
    /// `all_pairs` must be sorted by left glyph ID (as the `kern` table stores them); the scan
    /// stops at the first pair past `glyph_id`.
    pub fn for_glyph(glyph_id: u16, all_pairs: &[KerningPair]) -> KerningTable {
        let mut pairs = Vec::with_capacity(INITIAL_CAPACITY);
        for pair in all_pairs {
            if pair.left > glyph_id {
                break;
            }
            if pair.left < glyph_id {
                continue;
            }
            if pairs.len() == pairs.capacity() {
                let additional = pairs.capacity();
                pairs.reserve_exact(additional);
            }
            pairs.push(*pair);
        }
        pairs.sort_by_key(|pair| pair.right);
        pairs.shrink_to_fit();
        KerningTable { pairs }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn pairs(&self) -> &[KerningPair] {
        &self.pairs
    }

    /// Returns the adjustment for `right` following this glyph, or 0 if there is none.
    pub fn kerning(&self, right: u16) -> i32 {
        match self.pairs.binary_search_by_key(&right, |pair| pair.right) {
            Ok(index) => self.pairs[index].value,
            Err(_) => 0,
        }
    }
}
