// curvegraph/content/src/tessellation.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Converts outline shapes to triangles for stencil-and-cover rendering.
//!
//! Every outline becomes a triangle fan anchored at its first on-curve vertex plus one curve
//! triangle per quadratic segment. The fan triangles overlap, so they must be drawn into the
//! stencil buffer with an invert operation and then covered; this yields the even-odd fill of
//! the outline regardless of its convexity. Curve triangles carry Loop-Blinn coordinates so the
//! fragment stage can discard the part outside the curve.

use crate::outline::{Outline, OutlineShape, Vertex};
use curvegraph_geometry::rect::{self, RectF};
use curvegraph_geometry::transform3d::Transform4F;
use curvegraph_geometry::vector::Vector2F;
use smallvec::SmallVec;
use std::u32;

const SENTINEL: u32 = u32::MAX;

/// Loop-Blinn texture coordinates. A fragment is inside when `s² - t < 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveParams {
    pub s: f32,
    pub t: f32,
}

impl CurveParams {
    /// Always inside; used for the triangle fan.
    pub const INTERIOR: CurveParams = CurveParams { s: 0.0, t: 1.0 };
    pub const START: CurveParams = CurveParams { s: 0.0, t: 0.0 };
    pub const CONTROL: CurveParams = CurveParams { s: 0.5, t: 0.0 };
    pub const END: CurveParams = CurveParams { s: 1.0, t: 1.0 };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TessVertex {
    pub position: Vector2F,
    pub z: f32,
    pub curve: CurveParams,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriangleKind {
    Interior,
    Curve,
}

/// Three indices into `Tessellation::vertices`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub kind: TriangleKind,
}

/// Triangles of one shape. Interior vertices are shared between adjacent fan triangles.
#[derive(Clone, Debug, Default)]
pub struct Tessellation {
    pub vertices: Vec<TessVertex>,
    pub triangles: Vec<Triangle>,
    pub bounds: RectF,
}

impl Tessellation {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn curve_triangle_count(&self) -> usize {
        self.triangles.iter().filter(|triangle| triangle.kind == TriangleKind::Curve).count()
    }

    /// Moves every vertex through `transform`. Curve parameters are affine invariant, so the
    /// result is the tessellation of the transformed shape.
    pub fn transformed(&self, transform: &Transform4F) -> Tessellation {
        let mut bounds = None;
        let vertices = self.vertices.iter().map(|vertex| {
            let position = transform.transform_point_2d(vertex.position, vertex.z);
            rect::union_rect(&mut bounds, position);
            TessVertex { position, ..*vertex }
        }).collect();
        Tessellation {
            vertices,
            triangles: self.triangles.clone(),
            bounds: bounds.unwrap_or_default(),
        }
    }

    fn push_vertex(&mut self, position: Vector2F, z: f32, curve: CurveParams) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(TessVertex { position, z, curve });
        index
    }

    fn push_curve_triangle(&mut self, from: Point, ctrl: Point, to: Point) {
        let indices = [
            self.push_vertex(from.position, from.z, CurveParams::START),
            self.push_vertex(ctrl.position, ctrl.z, CurveParams::CONTROL),
            self.push_vertex(to.position, to.z, CurveParams::END),
        ];
        self.triangles.push(Triangle { indices, kind: TriangleKind::Curve });
    }
}

/// Tessellates every outline of `shape`.
pub fn tessellate(shape: &OutlineShape) -> Tessellation {
    let mut tessellation = Tessellation { bounds: shape.bounds(), ..Tessellation::default() };
    for outline in shape.outlines() {
        OutlineTessellator::new(outline, shape.is_quadratic_nurbs(), &mut tessellation).run();
    }
    tessellation
}

#[derive(Clone, Copy, Debug)]
struct Point {
    position: Vector2F,
    z: f32,
}

impl Point {
    #[inline]
    fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            position: self.position.lerp(other.position, t),
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl From<&Vertex> for Point {
    #[inline]
    fn from(vertex: &Vertex) -> Point {
        Point { position: vertex.position, z: vertex.z }
    }
}

// An on-curve endpoint: either a real vertex or one synthesized by splitting a curve. Both
// index into a table of lazily assigned interior ids.
#[derive(Clone, Copy, Debug)]
enum Endpoint {
    Vertex(usize),
    Synthesized(usize),
}

struct OutlineTessellator<'a> {
    vertices: &'a [Vertex],
    quadratic: bool,
    tessellation: &'a mut Tessellation,
    interior_ids: Vec<u32>,
    synthesized: Vec<(Point, u32)>,
    anchor: usize,
}

impl<'a> OutlineTessellator<'a> {
    fn new(outline: &'a Outline, quadratic: bool, tessellation: &'a mut Tessellation)
           -> OutlineTessellator<'a> {
        let mut vertices = outline.vertices();
        // The closing vertex duplicates the first one; walk the outline cyclically instead.
        if vertices.len() > 1 && outline.first_vertex() == outline.last_vertex() {
            vertices = &vertices[..vertices.len() - 1];
        }
        OutlineTessellator {
            vertices,
            quadratic,
            tessellation,
            interior_ids: vec![SENTINEL; vertices.len()],
            synthesized: vec![],
            anchor: 0,
        }
    }

    fn run(mut self) {
        let count = self.vertices.len();
        self.anchor = match self.vertices.iter().position(|vertex| vertex.on_curve) {
            Some(anchor) => anchor,
            None => {
                if count > 0 {
                    debug!("skipping outline of {} vertices without an on-curve vertex", count);
                }
                return;
            }
        };

        let mut from = self.anchor;
        let mut ctrls: SmallVec<[usize; 4]> = SmallVec::new();
        for step in 1..=count {
            let index = (self.anchor + step) % count;
            if !self.vertices[index].on_curve {
                ctrls.push(index);
                continue;
            }
            self.span(from, &ctrls, index);
            ctrls.clear();
            from = index;
        }
    }

    fn span(&mut self, from: usize, ctrls: &[usize], to: usize) {
        let p0 = Point::from(&self.vertices[from]);
        let p3 = Point::from(&self.vertices[to]);
        match (ctrls.len(), self.quadratic) {
            (0, _) => self.fan(Endpoint::Vertex(from), Endpoint::Vertex(to)),
            (1, _) => {
                let ctrl = Point::from(&self.vertices[ctrls[0]]);
                self.tessellation.push_curve_triangle(p0, ctrl, p3);
                self.fan(Endpoint::Vertex(from), Endpoint::Vertex(to));
            }
            (2, false) => {
                let (c1, c2) =
                    (Point::from(&self.vertices[ctrls[0]]), Point::from(&self.vertices[ctrls[1]]));
                self.cubic(from, c1, c2, to);
            }
            (_, true) => {
                // Implicit on-curve points sit halfway between consecutive controls.
                let mut current = Endpoint::Vertex(from);
                let mut current_point = p0;
                for (ctrl_index, &ctrl) in ctrls.iter().enumerate() {
                    let ctrl = Point::from(&self.vertices[ctrl]);
                    let (next, next_point) = match ctrls.get(ctrl_index + 1) {
                        Some(&following) => {
                            let mid = ctrl.lerp(Point::from(&self.vertices[following]), 0.5);
                            (self.synthesize(mid), mid)
                        }
                        None => (Endpoint::Vertex(to), p3),
                    };
                    self.tessellation.push_curve_triangle(current_point, ctrl, next_point);
                    self.fan(current, next);
                    current = next;
                    current_point = next_point;
                }
            }
            (count, false) => {
                warn!("cubic span with {} control points; filling its hull as lines", count);
                let mut current = Endpoint::Vertex(from);
                for &ctrl in ctrls {
                    self.fan(current, Endpoint::Vertex(ctrl));
                    current = Endpoint::Vertex(ctrl);
                }
                self.fan(current, Endpoint::Vertex(to));
            }
        }
    }

    // Splits the cubic at t = 1/2 and approximates each half with one quadratic.
    fn cubic(&mut self, from: usize, c1: Point, c2: Point, to: usize) {
        let p0 = Point::from(&self.vertices[from]);
        let p3 = Point::from(&self.vertices[to]);
        let (p01, p12, p23) = (p0.lerp(c1, 0.5), c1.lerp(c2, 0.5), c2.lerp(p3, 0.5));
        let (p012, p123) = (p01.lerp(p12, 0.5), p12.lerp(p23, 0.5));
        let mid = p012.lerp(p123, 0.5);

        let first_ctrl = quadratic_control(p0, p01, p012, mid);
        let second_ctrl = quadratic_control(mid, p123, p23, p3);
        self.tessellation.push_curve_triangle(p0, first_ctrl, mid);
        self.tessellation.push_curve_triangle(mid, second_ctrl, p3);

        let mid = self.synthesize(mid);
        self.fan(Endpoint::Vertex(from), mid);
        self.fan(mid, Endpoint::Vertex(to));
    }

    #[inline]
    fn synthesize(&mut self, point: Point) -> Endpoint {
        self.synthesized.push((point, SENTINEL));
        Endpoint::Synthesized(self.synthesized.len() - 1)
    }

    fn fan(&mut self, from: Endpoint, to: Endpoint) {
        if self.is_anchor(from) || self.is_anchor(to) {
            return;
        }
        let indices = [self.interior(Endpoint::Vertex(self.anchor)),
                       self.interior(from),
                       self.interior(to)];
        self.tessellation.triangles.push(Triangle { indices, kind: TriangleKind::Interior });
    }

    #[inline]
    fn is_anchor(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Vertex(index) => index == self.anchor,
            Endpoint::Synthesized(_) => false,
        }
    }

    fn interior(&mut self, endpoint: Endpoint) -> u32 {
        match endpoint {
            Endpoint::Vertex(index) => {
                if self.interior_ids[index] == SENTINEL {
                    let vertex = &self.vertices[index];
                    self.interior_ids[index] =
                        self.tessellation.push_vertex(vertex.position,
                                                      vertex.z,
                                                      CurveParams::INTERIOR);
                }
                self.interior_ids[index]
            }
            Endpoint::Synthesized(slot) => {
                let (point, id) = self.synthesized[slot];
                if id != SENTINEL {
                    return id;
                }
                let id = self.tessellation.push_vertex(point.position,
                                                       point.z,
                                                       CurveParams::INTERIOR);
                self.synthesized[slot].1 = id;
                id
            }
        }
    }
}

// Midpoint approximation of a cubic by a quadratic: (3 (c1 + c2) - (p0 + p3)) / 4.
fn quadratic_control(p0: Point, c1: Point, c2: Point, p3: Point) -> Point {
    let position = (c1.position + c2.position).scale(3.0) - (p0.position + p3.position);
    Point { position: position.scale(0.25), z: (3.0 * (c1.z + c2.z) - (p0.z + p3.z)) * 0.25 }
}

#[cfg(test)]
mod test {
    use crate::command::OutlineSink;
    use crate::outline::OutlineShape;
    use curvegraph_geometry::transform3d::Transform4F;
    use curvegraph_geometry::vector::{vec2f, Vector2F};
    use std::f32::consts::PI;
    use super::{tessellate, CurveParams, Tessellation, TriangleKind};

    fn rectangle() -> OutlineShape {
        let mut shape = OutlineShape::new();
        shape.move_to(vec2f(0.0, 0.0));
        shape.line_to(vec2f(0.0, 100.0));
        shape.line_to(vec2f(100.0, 100.0));
        shape.line_to(vec2f(100.0, 0.0));
        shape.close();
        shape
    }

    #[test]
    fn test_rectangle_fan_shares_vertices() {
        let tessellation = tessellate(&rectangle());
        assert_eq!(tessellation.triangles.len(), 2);
        assert_eq!(tessellation.curve_triangle_count(), 0);
        // Four corners, each emitted once.
        assert_eq!(tessellation.vertices.len(), 4);
        assert!(tessellation.vertices.iter().all(|vertex| vertex.curve == CurveParams::INTERIOR));
        let first = tessellation.triangles[0].indices;
        let second = tessellation.triangles[1].indices;
        assert_eq!(first[0], second[0]);
        assert_eq!(first[2], second[1]);
    }

    #[test]
    fn test_quadratic_arc_yields_curve_triangle() {
        let mut shape = OutlineShape::new();
        shape.move_to(vec2f(0.0, 0.0));
        shape.quadratic_to(vec2f(50.0, 50.0), vec2f(100.0, 0.0));
        shape.line_to(vec2f(0.0, 0.0));
        shape.close();

        let tessellation = tessellate(&shape);
        assert_eq!(tessellation.curve_triangle_count(), 1);
        let curve = tessellation.triangles
                                .iter()
                                .find(|triangle| triangle.kind == TriangleKind::Curve)
                                .unwrap();
        let params: Vec<_> = curve.indices
                                  .iter()
                                  .map(|&index| tessellation.vertices[index as usize].curve)
                                  .collect();
        assert_eq!(params, vec![CurveParams::START, CurveParams::CONTROL, CurveParams::END]);
        assert_eq!(tessellation.vertices[curve.indices[1] as usize].position, vec2f(50.0, 50.0));
    }

    #[test]
    fn test_cubic_is_split_in_two() {
        let mut shape = OutlineShape::new();
        shape.set_quadratic_nurbs(false);
        shape.move_to(vec2f(0.0, 0.0));
        shape.cubic_to(vec2f(0.0, 100.0), vec2f(100.0, 100.0), vec2f(100.0, 0.0));
        shape.close();

        let tessellation = tessellate(&shape);
        assert_eq!(tessellation.curve_triangle_count(), 2);
        let mid = tessellation.vertices
                              .iter()
                              .find(|vertex| vertex.position == vec2f(50.0, 75.0));
        assert!(mid.is_some());
    }

    fn interior_copies_at(tessellation: &Tessellation, position: Vector2F) -> usize {
        tessellation.vertices.iter().filter(|vertex| {
            vertex.curve == CurveParams::INTERIOR &&
                (vertex.position.x() - position.x()).abs() < 1e-4 &&
                (vertex.position.y() - position.y()).abs() < 1e-4
        }).count()
    }

    #[test]
    fn test_cubic_midpoint_is_shared_by_fan_triangles() {
        let mut shape = OutlineShape::new();
        shape.set_quadratic_nurbs(false);
        shape.move_to(vec2f(0.0, 0.0));
        shape.line_to(vec2f(100.0, 0.0));
        shape.cubic_to(vec2f(150.0, 30.0), vec2f(150.0, 70.0), vec2f(100.0, 100.0));
        shape.line_to(vec2f(0.0, 100.0));
        shape.close();

        let tessellation = tessellate(&shape);
        assert_eq!(tessellation.curve_triangle_count(), 2);
        assert_eq!(interior_copies_at(&tessellation, vec2f(137.5, 50.0)), 1);
        // Four corners and the split point, each emitted once.
        let interior = tessellation.vertices
                                   .iter()
                                   .filter(|vertex| vertex.curve == CurveParams::INTERIOR)
                                   .count();
        assert_eq!(interior, 5);
        assert_eq!(tessellation.triangles.len() - tessellation.curve_triangle_count(), 3);
    }

    #[test]
    fn test_implicit_quadratic_midpoint_is_shared_by_fan_triangles() {
        let mut shape = OutlineShape::new();
        shape.move_to(vec2f(0.0, 0.0));
        shape.line_to(vec2f(100.0, 0.0));
        shape.add_vertex_front(super::Vertex::new(vec2f(150.0, 20.0), false));
        shape.add_vertex_front(super::Vertex::new(vec2f(150.0, 80.0), false));
        shape.line_to(vec2f(100.0, 100.0));
        shape.line_to(vec2f(0.0, 100.0));
        shape.close();

        let tessellation = tessellate(&shape);
        assert_eq!(tessellation.curve_triangle_count(), 2);
        assert_eq!(interior_copies_at(&tessellation, vec2f(150.0, 50.0)), 1);
    }

    #[test]
    fn test_outline_without_on_curve_vertices_is_skipped() {
        let mut shape = OutlineShape::new();
        shape.add_vertex(super::Vertex::new(vec2f(0.0, 0.0), false));
        shape.add_vertex(super::Vertex::new(vec2f(1.0, 1.0), false));
        assert!(tessellate(&shape).is_empty());
    }

    #[test]
    fn test_transformed_moves_vertices_only() {
        let tessellation = tessellate(&rectangle());
        let moved = tessellation.transformed(&Transform4F::from_translation(5.0, -5.0, 0.0));
        assert_eq!(moved.triangles, tessellation.triangles);
        assert_eq!(moved.vertices[0].position,
                   tessellation.vertices[0].position + vec2f(5.0, -5.0));
        assert_eq!(moved.bounds.origin(), vec2f(5.0, -5.0));
    }

    quickcheck! {
        fn polygons_fan_into_n_minus_2_triangles(sides: u8) -> bool {
            let sides = 3 + (sides % 60) as usize;
            let mut shape = OutlineShape::new();
            for side in 0..sides {
                let angle = 2.0 * PI * side as f32 / sides as f32;
                let point = vec2f(angle.cos() * 100.0, angle.sin() * 100.0);
                if side == 0 {
                    shape.move_to(point);
                } else {
                    shape.line_to(point);
                }
            }
            shape.close();

            let tessellation = tessellate(&shape);
            tessellation.triangles.len() == sides - 2 &&
                tessellation.vertices.len() == sides &&
                tessellation.curve_triangle_count() == 0
        }
    }
}
