//! Drawing surface abstraction and a recording implementation

use drift_core::{Color, Rect, Vec2};

/// Two-stop gradient along a line segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub from: Color,
    pub to: Color,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, from: Color, to: Color) -> Self {
        Self {
            start,
            end,
            from,
            to,
        }
    }

    /// Color at `point`, projected onto the gradient axis and clamped to the stops
    pub fn color_at(&self, point: Vec2) -> Color {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return self.from;
        }
        let t = ((point - self.start).dot(axis) / len_sq).clamp(0.0, 1.0);
        self.from.lerp(self.to, t)
    }
}

/// A 2D drawing surface, in the style of an immediate-mode canvas.
///
/// Coordinates are surface units with the origin at the top-left corner.
/// All painting composites source-over onto existing content.
pub trait Canvas {
    /// Surface size as (width, height)
    fn size(&self) -> (u32, u32);

    /// Resize the surface. Existing content is discarded.
    fn resize(&mut self, width: u32, height: u32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, gradient: &LinearGradient);

    /// Disc whose color fades from `inner` at the center to `outer` at `radius`
    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);
}

/// One recorded drawing operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        gradient: LinearGradient,
    },
    Radial {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
    },
}

/// Canvas that records commands instead of rasterizing them
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded connection lines
    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    /// Recorded radial discs
    pub fn discs(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Radial { .. }))
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, gradient: &LinearGradient) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            gradient: *gradient,
        });
    }

    fn fill_radial(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        self.commands.push(DrawCommand::Radial {
            center,
            radius,
            inner,
            outer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_and_midpoint() {
        let g = LinearGradient::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Color::new(0.0, 0.0, 0.0, 0.0),
            Color::new(1.0, 1.0, 1.0, 1.0),
        );
        assert_eq!(g.color_at(Vec2::new(0.0, 5.0)), g.from);
        assert_eq!(g.color_at(Vec2::new(10.0, -3.0)), g.to);
        assert!((g.color_at(Vec2::new(5.0, 0.0)).r - 0.5).abs() < 1e-6);
        // Clamped beyond the stops
        assert_eq!(g.color_at(Vec2::new(-20.0, 0.0)), g.from);
        assert_eq!(g.color_at(Vec2::new(30.0, 0.0)), g.to);
    }

    #[test]
    fn degenerate_gradient_uses_first_stop() {
        let p = Vec2::new(3.0, 3.0);
        let g = LinearGradient::new(p, p, Color::WHITE, Color::BLACK);
        assert_eq!(g.color_at(Vec2::new(9.0, 9.0)), Color::WHITE);
    }

    #[test]
    fn recording_canvas_records_in_order() {
        let mut canvas = RecordingCanvas::new(10, 10);
        canvas.fill_rect(Rect::from_size(10, 10), Color::BLACK);
        canvas.fill_radial(Vec2::ONE, 2.0, Color::WHITE, Color::TRANSPARENT);
        assert_eq!(canvas.commands().len(), 2);
        assert!(matches!(canvas.commands()[0], DrawCommand::FillRect { .. }));
        assert_eq!(canvas.discs().count(), 1);
        assert_eq!(canvas.lines().count(), 0);

        canvas.resize(20, 5);
        assert_eq!(canvas.size(), (20, 5));
        assert!(canvas.commands().is_empty());
    }
}
