// curvegraph/font/src/outline.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turns the raw on/off-curve points of a glyph into outline commands.
//!
//! TrueType outlines are quadratic B-splines: two consecutive off-curve points imply an
//! on-curve point halfway between them. CFF outlines are cubic: each curve segment is an
//! on-curve point followed by exactly two off-curve points and another on-curve point.

use crate::error::FontError;
use crate::point::Point;
use curvegraph_content::command::OutlineSink;
use curvegraph_content::outline::OutlineShape;
use curvegraph_geometry::rect::RectF;
use curvegraph_geometry::vector::Vector2F;
use serde::{Deserialize, Serialize};

/// How off-curve points are to be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineFormat {
    /// Quadratic outlines from a `glyf` table.
    TrueType,
    /// Cubic outlines from a `CFF` table.
    Cff,
}

impl OutlineFormat {
    #[inline]
    pub fn is_quadratic(self) -> bool {
        self == OutlineFormat::TrueType
    }
}

/// Builds outlines for one glyph.
#[derive(Clone, Copy, Debug)]
pub struct OutlineBuilder {
    glyph_id: u16,
    format: OutlineFormat,
}

impl OutlineBuilder {
    #[inline]
    pub fn new(glyph_id: u16, format: OutlineFormat) -> OutlineBuilder {
        OutlineBuilder { glyph_id, format }
    }

    /// Sends the glyph's outline to `sink`, one contour at a time.
    ///
    /// Each contour starts with a move-to and ends with a close. Processing stops at the first
    /// malformed contour; the sink then holds a partial outline and should be discarded.
    pub fn build<S>(&self, points: &[Point], sink: &mut S) -> Result<(), FontError>
                    where S: OutlineSink {
        let mut contour_start = 0;
        let mut contour_index = 0;
        for (point_index, point) in points.iter().enumerate() {
            if !point.is_end_of_contour() {
                continue;
            }
            let contour = &points[contour_start..=point_index];
            let result = match self.format {
                OutlineFormat::TrueType => self.build_quadratic_contour(contour, sink),
                OutlineFormat::Cff => self.build_cubic_contour(contour_index, contour, sink),
            };
            if let Err(error) = result {
                warn!("{}", error);
                return Err(error);
            }
            contour_start = point_index + 1;
            contour_index += 1;
        }

        if contour_start < points.len() {
            let error = FontError::MalformedGlyphContour {
                glyph_id: self.glyph_id,
                contour: contour_index,
            };
            warn!("{}: {} trailing points", error, points.len() - contour_start);
            return Err(error);
        }
        Ok(())
    }

    /// Builds the glyph's outline shape, or `None` if the glyph has no geometry.
    pub fn build_shape(&self, points: &[Point]) -> Result<Option<OutlineShape>, FontError> {
        if points.is_empty() {
            return Ok(None);
        }
        let mut shape = OutlineShape::new();
        shape.set_quadratic_nurbs(self.format.is_quadratic());
        self.build(points, &mut shape)?;
        shape.close_last_outline();
        if shape.is_empty() {
            Ok(None)
        } else {
            Ok(Some(shape))
        }
    }

    fn build_quadratic_contour<S>(&self, contour: &[Point], sink: &mut S) -> Result<(), FontError>
                                  where S: OutlineSink {
        let count = contour.len();
        if count < 2 {
            debug!("glyph {}: skipping single-point contour", self.glyph_id);
            return Ok(());
        }
        let point_at = |offset: usize| &contour[offset % count];

        let mut offset = 0;
        while offset < count {
            let previous = point_at(offset + count - 1);
            let (point, next, next2) =
                (point_at(offset), point_at(offset + 1), point_at(offset + 2));

            if offset == 0 {
                let start = if point.is_on_curve() {
                    *point
                } else if previous.is_on_curve() {
                    *previous
                } else {
                    Point::midpoint(previous, point)
                };
                sink.move_to(start.to_f32());
            }

            match (point.is_on_curve(), next.is_on_curve(), next2.is_on_curve()) {
                (true, true, _) => {
                    sink.line_to(next.to_f32());
                    offset += 1;
                }
                (true, false, true) => {
                    sink.quadratic_to(next.to_f32(), next2.to_f32());
                    offset += 2;
                }
                (true, false, false) => {
                    // The implicit point is derived again when `next2` becomes the current
                    // point, so only two points are consumed here.
                    sink.quadratic_to(next.to_f32(), Point::midpoint(next, next2).to_f32());
                    offset += 2;
                }
                (false, false, _) => {
                    sink.quadratic_to(point.to_f32(), Point::midpoint(point, next).to_f32());
                    offset += 1;
                }
                (false, true, _) => {
                    sink.quadratic_to(point.to_f32(), next.to_f32());
                    offset += 1;
                }
            }
        }

        sink.close();
        Ok(())
    }

    fn build_cubic_contour<S>(&self, contour_index: usize, contour: &[Point], sink: &mut S)
                              -> Result<(), FontError>
                              where S: OutlineSink {
        let count = contour.len();
        if count < 2 {
            debug!("glyph {}: skipping single-point contour", self.glyph_id);
            return Ok(());
        }
        let point_at = |offset: usize| &contour[offset % count];

        let mut offset = 0;
        while offset < count {
            let point = point_at(offset);
            let (next, next2, next3) =
                (point_at(offset + 1), point_at(offset + 2), point_at(offset + 3));

            if offset == 0 {
                sink.move_to(point.to_f32());
            }

            match (point.is_on_curve(),
                   next.is_on_curve(),
                   next2.is_on_curve(),
                   next3.is_on_curve()) {
                (true, true, _, _) => {
                    sink.line_to(next.to_f32());
                    offset += 1;
                }
                (true, false, false, true) => {
                    sink.cubic_to(next.to_f32(), next2.to_f32(), next3.to_f32());
                    offset += 3;
                }
                _ => {
                    return Err(FontError::UnsupportedContourPattern {
                        glyph_id: self.glyph_id,
                        contour: contour_index,
                        point: offset,
                    });
                }
            }
        }

        sink.close();
        Ok(())
    }

    /// Builds a hollow box filling `bounds`, used to make outline-less glyphs visible.
    ///
    /// The inner box is inset by a tenth of the smaller side and wound against the outer one.
    pub fn placeholder_shape(bounds: RectF) -> OutlineShape {
        let inset = bounds.width().min(bounds.height()).abs() * 0.1;
        let inner = bounds.dilate(Vector2F::splat(-inset));

        let mut shape = OutlineShape::new();
        shape.move_to(bounds.origin());
        shape.line_to(bounds.lower_left());
        shape.line_to(bounds.lower_right());
        shape.line_to(bounds.upper_right());
        shape.close();

        shape.move_to(inner.origin());
        shape.line_to(inner.upper_right());
        shape.line_to(inner.lower_right());
        shape.line_to(inner.lower_left());
        shape.close();
        shape
    }
}
