//! Paints a particle store onto a canvas

use crate::canvas::{Canvas, LinearGradient};
use crate::particle::Particle;
use drift_core::{Color, Rect};

/// Pairs closer than this are joined by a line
pub const CONNECTION_THRESHOLD: f32 = 100.0;
/// Stroke width of connection lines
pub const LINE_WIDTH: f32 = 0.8;
/// Peak alpha of a connection line (at zero distance)
pub const LINE_ALPHA: f32 = 0.3;
/// Outer disc radius as a multiple of the particle radius
pub const GLOW_SCALE: f32 = 2.0;

/// Translucent fill laid over the previous frame; leaves motion trails
pub fn trail_color() -> Color {
    Color::from_rgba8(10, 10, 20, 0.2)
}

/// Gradient stops of a connection line, light violet to indigo
pub fn connection_stops(opacity: f32) -> (Color, Color) {
    let alpha = opacity * LINE_ALPHA;
    (
        Color::from_rgba8(167, 139, 250, alpha),
        Color::from_rgba8(99, 102, 241, alpha),
    )
}

/// Opacity of the line joining two particles `distance` apart.
///
/// Linear from 1 at zero distance down to 0 at the threshold; `None` at or
/// beyond it, where no line is drawn.
pub fn connection_opacity(distance: f32) -> Option<f32> {
    (distance < CONNECTION_THRESHOLD).then(|| 1.0 - distance / CONNECTION_THRESHOLD)
}

/// Draws one frame: trail fill, connection lines, then particle glows.
///
/// Reads the particles only; painting the same state twice issues the same
/// commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldRenderer;

impl FieldRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Paint `particles` onto `canvas`. Returns false when the surface has no
    /// area and nothing was drawn.
    pub fn paint<C: Canvas + ?Sized>(&self, particles: &[Particle], canvas: &mut C) -> bool {
        let (width, height) = canvas.size();
        if width == 0 || height == 0 {
            return false;
        }

        canvas.fill_rect(Rect::from_size(width, height), trail_color());

        // O(n^2) over unordered pairs
        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                let Some(opacity) = connection_opacity(a.position.distance(b.position)) else {
                    continue;
                };
                let (from, to) = connection_stops(opacity);
                let gradient = LinearGradient::new(a.position, b.position, from, to);
                canvas.stroke_line(a.position, b.position, LINE_WIDTH, &gradient);
            }
        }

        for p in particles {
            let color = p.color();
            canvas.fill_radial(
                p.position,
                p.radius() * GLOW_SCALE,
                color,
                color.with_alpha(0.0),
            );
        }
        true
    }
}
