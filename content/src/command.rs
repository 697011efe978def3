// curvegraph/content/src/command.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Path commands and the sinks that consume them.

use crate::outline::{OutlineShape, Vertex};
use curvegraph_geometry::vector::Vector2F;

/// One drawing command of a glyph or shape outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vector2F),
    LineTo(Vector2F),
    QuadraticTo(Vector2F, Vector2F),
    CubicTo(Vector2F, Vector2F, Vector2F),
    Close,
}

impl PathCommand {
    #[inline]
    pub fn is_curve(&self) -> bool {
        match *self {
            PathCommand::QuadraticTo(..) | PathCommand::CubicTo(..) => true,
            _ => false,
        }
    }
}

/// Something that accepts outline commands, one contour at a time.
pub trait OutlineSink {
    fn move_to(&mut self, to: Vector2F);
    fn line_to(&mut self, to: Vector2F);
    fn quadratic_to(&mut self, ctrl: Vector2F, to: Vector2F);
    fn cubic_to(&mut self, ctrl0: Vector2F, ctrl1: Vector2F, to: Vector2F);
    fn close(&mut self);

    fn push_command(&mut self, command: PathCommand) {
        match command {
            PathCommand::MoveTo(to) => self.move_to(to),
            PathCommand::LineTo(to) => self.line_to(to),
            PathCommand::QuadraticTo(ctrl, to) => self.quadratic_to(ctrl, to),
            PathCommand::CubicTo(ctrl0, ctrl1, to) => self.cubic_to(ctrl0, ctrl1, to),
            PathCommand::Close => self.close(),
        }
    }
}

/// Records the commands verbatim.
impl OutlineSink for Vec<PathCommand> {
    #[inline]
    fn move_to(&mut self, to: Vector2F) {
        self.push(PathCommand::MoveTo(to))
    }

    #[inline]
    fn line_to(&mut self, to: Vector2F) {
        self.push(PathCommand::LineTo(to))
    }

    #[inline]
    fn quadratic_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        self.push(PathCommand::QuadraticTo(ctrl, to))
    }

    #[inline]
    fn cubic_to(&mut self, ctrl0: Vector2F, ctrl1: Vector2F, to: Vector2F) {
        self.push(PathCommand::CubicTo(ctrl0, ctrl1, to))
    }

    #[inline]
    fn close(&mut self) {
        self.push(PathCommand::Close)
    }
}

/// Builds outlines with reversed winding.
///
/// TrueType outer contours run clockwise; inserting every vertex at the front of its outline
/// turns them counterclockwise (and holes clockwise), which is what the region fill expects.
impl OutlineSink for OutlineShape {
    fn move_to(&mut self, to: Vector2F) {
        self.close_last_outline();
        self.add_empty_outline();
        self.add_vertex_front(Vertex::new(to, true));
    }

    #[inline]
    fn line_to(&mut self, to: Vector2F) {
        self.add_vertex_front(Vertex::new(to, true));
    }

    #[inline]
    fn quadratic_to(&mut self, ctrl: Vector2F, to: Vector2F) {
        self.add_vertex_front(Vertex::new(ctrl, false));
        self.add_vertex_front(Vertex::new(to, true));
    }

    #[inline]
    fn cubic_to(&mut self, ctrl0: Vector2F, ctrl1: Vector2F, to: Vector2F) {
        self.add_vertex_front(Vertex::new(ctrl0, false));
        self.add_vertex_front(Vertex::new(ctrl1, false));
        self.add_vertex_front(Vertex::new(to, true));
    }

    #[inline]
    fn close(&mut self) {
        self.close_last_outline();
    }
}

#[cfg(test)]
mod test {
    use crate::outline::OutlineShape;
    use curvegraph_geometry::vector::vec2f;
    use super::{OutlineSink, PathCommand};

    #[test]
    fn test_shape_sink_reverses_winding_and_closes() {
        let commands = vec![
            PathCommand::MoveTo(vec2f(0.0, 0.0)),
            PathCommand::LineTo(vec2f(0.0, 100.0)),
            PathCommand::QuadraticTo(vec2f(50.0, 150.0), vec2f(100.0, 100.0)),
            PathCommand::LineTo(vec2f(100.0, 0.0)),
            PathCommand::Close,
            PathCommand::MoveTo(vec2f(25.0, 25.0)),
            PathCommand::LineTo(vec2f(75.0, 25.0)),
            PathCommand::LineTo(vec2f(75.0, 75.0)),
            PathCommand::Close,
        ];

        let mut shape = OutlineShape::new();
        for &command in &commands {
            shape.push_command(command);
        }

        assert_eq!(shape.outlines().len(), 2);
        let outer = &shape.outlines()[0];
        let positions: Vec<_> = outer.vertices().iter().map(|vertex| vertex.position).collect();
        assert_eq!(positions, vec![
            vec2f(100.0, 0.0),
            vec2f(100.0, 100.0),
            vec2f(50.0, 150.0),
            vec2f(0.0, 100.0),
            vec2f(0.0, 0.0),
            vec2f(100.0, 0.0),
        ]);
        assert!(!outer.vertices()[2].on_curve);
        for outline in shape.outlines() {
            assert!(outline.is_closed());
            assert_eq!(outline.first_vertex(), outline.last_vertex());
        }
    }

    #[test]
    fn test_recording_sink() {
        let mut commands = vec![];
        commands.move_to(vec2f(1.0, 2.0));
        commands.cubic_to(vec2f(2.0, 3.0), vec2f(3.0, 3.0), vec2f(4.0, 2.0));
        commands.close();
        assert_eq!(commands.iter().filter(|command| command.is_curve()).count(), 1);
        assert_eq!(commands.last(), Some(&PathCommand::Close));
    }
}
