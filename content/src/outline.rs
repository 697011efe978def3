// curvegraph/content/src/outline.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory representation of glyph and shape outlines.

use curvegraph_geometry::rect::RectF;
use curvegraph_geometry::transform3d::Transform4F;
use curvegraph_geometry::vector::Vector2F;
use std::fmt::{self, Debug, Formatter};

/// A control point of an outline.
///
/// Off-curve vertices are Bézier control points; on-curve vertices are segment endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vector2F,
    pub z: f32,
    pub on_curve: bool,
}

impl Vertex {
    #[inline]
    pub fn new(position: Vector2F, on_curve: bool) -> Vertex {
        Vertex { position, z: 0.0, on_curve }
    }

    #[inline]
    pub fn with_z(position: Vector2F, z: f32, on_curve: bool) -> Vertex {
        Vertex { position, z, on_curve }
    }

    #[inline]
    pub fn transformed(&self, transform: &Transform4F) -> Vertex {
        Vertex { position: transform.transform_point_2d(self.position, self.z), ..*self }
    }

    #[inline]
    fn coincides_with(&self, other: &Vertex) -> bool {
        self.position == other.position && self.z == other.z
    }
}

/// A single closed (or deliberately open) run of vertices.
///
/// The names "outline" and "contour" come from the TrueType specification. Here an `Outline` is
/// one contour and an `OutlineShape` is the set of them making up a glyph.
#[derive(Clone, Default)]
pub struct Outline {
    vertices: Vec<Vertex>,
    bounds: RectF,
    closed: bool,
}

impl Outline {
    #[inline]
    pub fn new() -> Outline {
        Outline::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Outline {
        Outline { vertices: Vec::with_capacity(capacity), ..Outline::default() }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    #[inline]
    pub fn first_vertex(&self) -> Option<&Vertex> {
        self.vertices.first()
    }

    #[inline]
    pub fn last_vertex(&self) -> Option<&Vertex> {
        self.vertices.last()
    }

    #[inline]
    pub fn push_vertex(&mut self, vertex: Vertex) {
        let index = self.vertices.len();
        self.insert_vertex(index, vertex);
    }

    pub fn insert_vertex(&mut self, index: usize, vertex: Vertex) {
        if self.vertices.is_empty() {
            self.bounds = RectF::from_points(vertex.position, vertex.position);
        } else {
            self.bounds = self.bounds.union_point(vertex.position);
        }
        self.vertices.insert(index, vertex);
    }

    /// Seals this outline so that its first and last vertex coincide.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let (Some(first), Some(last)) = (self.vertices.first(), self.vertices.last()) {
            if !first.coincides_with(last) {
                let first = *first;
                self.vertices.push(first);
            }
        }
        self.closed = true;
    }

    pub fn transformed(&self, transform: &Transform4F) -> Outline {
        let mut outline = Outline::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            outline.push_vertex(vertex.transformed(transform));
        }
        outline.closed = self.closed;
        outline
    }
}

impl Debug for Outline {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        for (index, vertex) in self.vertices.iter().enumerate() {
            if index > 0 {
                write!(formatter, " ")?;
            }
            let kind = match (index, vertex.on_curve) {
                (0, _) => "M",
                (_, true) => "L",
                (_, false) => "C",
            };
            write!(formatter, "{} {} {}", kind, vertex.position.x(), vertex.position.y())?;
        }
        if self.closed {
            write!(formatter, " z")?;
        }
        Ok(())
    }
}

/// A set of outlines describing one glyph or shape.
#[derive(Clone)]
pub struct OutlineShape {
    outlines: Vec<Outline>,
    bounds: RectF,
    quadratic_nurbs: bool,
}

impl Default for OutlineShape {
    #[inline]
    fn default() -> OutlineShape {
        OutlineShape::new()
    }
}

impl OutlineShape {
    /// Creates a shape holding one empty outline, ready for vertices.
    #[inline]
    pub fn new() -> OutlineShape {
        OutlineShape {
            outlines: vec![Outline::new()],
            bounds: RectF::default(),
            quadratic_nurbs: true,
        }
    }

    /// Returns true if off-curve vertices are quadratic control points. Cubic outlines (from
    /// CFF fonts) pair their off-curve vertices instead.
    #[inline]
    pub fn is_quadratic_nurbs(&self) -> bool {
        self.quadratic_nurbs
    }

    #[inline]
    pub fn set_quadratic_nurbs(&mut self, quadratic_nurbs: bool) {
        self.quadratic_nurbs = quadratic_nurbs
    }

    #[inline]
    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    #[inline]
    pub fn bounds(&self) -> RectF {
        self.bounds
    }

    /// Returns true if no outline holds any vertex.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outlines.iter().all(Outline::is_empty)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.outlines.iter().map(Outline::len).sum()
    }

    /// Starts a new outline. An empty last outline is reused instead.
    pub fn add_empty_outline(&mut self) {
        match self.outlines.last() {
            Some(outline) if outline.is_empty() => {}
            _ => self.outlines.push(Outline::new()),
        }
    }

    /// Appends a vertex to the last outline.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        let index = self.last_outline_mut().len();
        self.insert_into_last_outline(index, vertex);
    }

    /// Inserts a vertex at the front of the last outline, which reverses the winding of
    /// whatever is built through this call.
    pub fn add_vertex_front(&mut self, vertex: Vertex) {
        self.insert_into_last_outline(0, vertex);
    }

    /// Closes the last outline if it has any vertices.
    pub fn close_last_outline(&mut self) {
        if let Some(outline) = self.outlines.last_mut() {
            if !outline.is_empty() {
                outline.close();
            }
        }
    }

    /// Returns a copy of this shape with every vertex transformed.
    pub fn transformed(&self, transform: &Transform4F) -> OutlineShape {
        let mut shape = OutlineShape {
            outlines: Vec::with_capacity(self.outlines.len()),
            bounds: RectF::default(),
            quadratic_nurbs: self.quadratic_nurbs,
        };
        for outline in &self.outlines {
            let outline = outline.transformed(transform);
            shape.union_bounds(outline.bounds(), outline.is_empty());
            shape.outlines.push(outline);
        }
        shape
    }

    fn insert_into_last_outline(&mut self, index: usize, vertex: Vertex) {
        let was_empty = self.is_empty();
        self.last_outline_mut().insert_vertex(index, vertex);
        if was_empty {
            self.bounds = RectF::from_points(vertex.position, vertex.position);
        } else {
            self.bounds = self.bounds.union_point(vertex.position);
        }
    }

    fn union_bounds(&mut self, bounds: RectF, outline_is_empty: bool) {
        if outline_is_empty {
            return;
        }
        if self.outlines.iter().all(Outline::is_empty) {
            self.bounds = bounds;
        } else {
            self.bounds = self.bounds.union_rect(bounds);
        }
    }

    fn last_outline_mut(&mut self) -> &mut Outline {
        if self.outlines.is_empty() {
            self.outlines.push(Outline::new());
        }
        let last = self.outlines.len() - 1;
        &mut self.outlines[last]
    }
}

impl Debug for OutlineShape {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        for (outline_index, outline) in self.outlines.iter().enumerate() {
            if outline_index > 0 {
                write!(formatter, " ")?;
            }
            outline.fmt(formatter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use curvegraph_geometry::transform3d::Transform4F;
    use curvegraph_geometry::vector::vec2f;
    use super::{OutlineShape, Vertex};

    #[test]
    fn test_close_appends_first_vertex() {
        let mut shape = OutlineShape::new();
        shape.add_vertex(Vertex::new(vec2f(0.0, 0.0), true));
        shape.add_vertex(Vertex::new(vec2f(10.0, 0.0), true));
        shape.add_vertex(Vertex::new(vec2f(10.0, 10.0), true));
        shape.close_last_outline();

        let outline = &shape.outlines()[0];
        assert!(outline.is_closed());
        assert_eq!(outline.len(), 4);
        assert_eq!(outline.first_vertex(), outline.last_vertex());

        // Closing twice is harmless.
        shape.close_last_outline();
        assert_eq!(shape.outlines()[0].len(), 4);
    }

    #[test]
    fn test_front_insertion_reverses_order() {
        let mut shape = OutlineShape::new();
        for &(x, y) in &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            shape.add_vertex_front(Vertex::new(vec2f(x, y), true));
        }
        let positions: Vec<_> =
            shape.outlines()[0].vertices().iter().map(|vertex| vertex.position).collect();
        assert_eq!(positions, vec![vec2f(1.0, 1.0), vec2f(0.0, 1.0), vec2f(0.0, 0.0)]);
    }

    #[test]
    fn test_empty_outline_is_reused() {
        let mut shape = OutlineShape::new();
        shape.add_empty_outline();
        shape.add_empty_outline();
        assert_eq!(shape.outlines().len(), 1);
        assert!(shape.is_empty());

        shape.add_vertex(Vertex::new(vec2f(3.0, 4.0), true));
        shape.add_empty_outline();
        assert_eq!(shape.outlines().len(), 2);
    }

    #[test]
    fn test_bounds_follow_transform() {
        let mut shape = OutlineShape::new();
        shape.add_vertex(Vertex::new(vec2f(0.0, 0.0), true));
        shape.add_vertex(Vertex::new(vec2f(2.0, 1.0), false));
        shape.add_vertex(Vertex::new(vec2f(4.0, 0.0), true));
        assert_eq!(shape.bounds().size(), vec2f(4.0, 1.0));

        let moved = shape.transformed(&(Transform4F::from_translation(10.0, 0.0, 0.0) *
                                        Transform4F::from_uniform_scale(0.5)));
        assert_eq!(moved.bounds().origin(), vec2f(10.0, 0.0));
        assert_eq!(moved.bounds().size(), vec2f(2.0, 0.5));
        assert_eq!(moved.vertex_count(), 3);
    }
}
