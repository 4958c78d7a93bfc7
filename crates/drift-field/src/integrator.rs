//! One simulation step: Euler move, edge reflection, pointer repulsion

use crate::particle::{Particle, ParticleStore};
use drift_core::Vec2;

/// Distance within which the pointer displaces particles
pub const POINTER_RADIUS: f32 = 150.0;
/// Peak-scale of the pointer nudge
pub const REPULSION_STRENGTH: f32 = 0.05;
/// Divisor applied to the remaining distance inside the pointer radius
pub const REPULSION_FALLOFF: f32 = 30.0;

/// Reflection bounds, taken from the surface dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Whether `p` lies within the bounds grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= -margin
            && p.x <= self.width + margin
            && p.y >= -margin
            && p.y <= self.height + margin
    }
}

/// Displacement the pointer applies to a particle at `position`.
///
/// Points away from the pointer with magnitude `0.05 * (150 - d) / 30`,
/// zero at and beyond 150 units. A particle exactly under the pointer is
/// pushed along -x.
pub fn repulsion(position: Vec2, pointer: Vec2) -> Vec2 {
    let toward_pointer = pointer - position;
    let distance = toward_pointer.length();
    if distance >= POINTER_RADIUS {
        return Vec2::ZERO;
    }
    let magnitude = REPULSION_STRENGTH * (POINTER_RADIUS - distance) / REPULSION_FALLOFF;
    let direction = toward_pointer.try_normalize().unwrap_or(Vec2::X);
    -direction * magnitude
}

/// Advance particles by one step.
///
/// `pointer` is `None` until the host has reported a pointer position, in
/// which case no repulsion is applied. `step_scale` multiplies both the
/// velocity step and the pointer nudge; 1.0 means one unit of simulated time
/// per call.
pub fn step(particles: &mut [Particle], bounds: Bounds, pointer: Option<Vec2>, step_scale: f32) {
    for particle in particles {
        particle.position += particle.velocity * step_scale;

        // Reflection flips velocity only; position may sit outside for a frame
        if particle.position.x < 0.0 || particle.position.x > bounds.width {
            particle.velocity.x = -particle.velocity.x;
        }
        if particle.position.y < 0.0 || particle.position.y > bounds.height {
            particle.velocity.y = -particle.velocity.y;
        }

        if let Some(pointer) = pointer {
            particle.position += repulsion(particle.position, pointer) * step_scale;
        }
    }
}

/// Steps a whole particle store against fixed surface bounds
#[derive(Clone, Copy, Debug)]
pub struct Integrator {
    step_scale: f32,
}

impl Default for Integrator {
    fn default() -> Self {
        Self { step_scale: 1.0 }
    }
}

impl Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_scale(&self) -> f32 {
        self.step_scale
    }

    /// Simulated time per tick; negative scales clamp to zero
    pub fn set_step_scale(&mut self, scale: f32) {
        self.step_scale = scale.max(0.0);
    }

    pub fn advance(&self, store: &mut ParticleStore, bounds: Bounds) {
        let pointer = store.pointer_state().known_position();
        step(store.particles_mut(), bounds, pointer, self.step_scale);
    }
}
