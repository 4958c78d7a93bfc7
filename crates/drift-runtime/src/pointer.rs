//! Pointer position tracking

use drift_core::Vec2;

/// Last known pointer position in viewport coordinates.
///
/// Reads as the origin until the first pointer event arrives; `is_known`
/// tells the two apart.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    position: Vec2,
    known: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process pointer movement
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.known = true;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether any pointer event has been seen
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// Position, only once a pointer event has been seen
    pub fn known_position(&self) -> Option<Vec2> {
        self.known.then_some(self.position)
    }
}
