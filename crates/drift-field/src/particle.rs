//! Particle state and the particle store

use drift_core::{Color, Vec2};
use drift_runtime::PointerState;
use rand::Rng;
use tracing::debug;

/// Surface area (square units) allotted to each particle
pub const DENSITY_DIVISOR: u64 = 20_000;
/// Particle radius range at creation, [min, max)
pub const RADIUS_RANGE: (f32, f32) = (0.5, 2.0);
/// Range of each velocity component at creation, units per tick
pub const SPEED_RANGE: (f32, f32) = (-0.15, 0.15);
/// Hue band in degrees
pub const HUE_BAND: (f32, f32) = (200.0, 260.0);
/// Particle alpha range
pub const ALPHA_RANGE: (f32, f32) = (0.1, 0.4);
const SATURATION: f32 = 0.8;
const LIGHTNESS: f32 = 0.6;

/// One animated point.
///
/// Radius and color are fixed at creation; position and velocity are
/// rewritten every simulation step.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    radius: f32,
    color: Color,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            radius,
            color,
        }
    }

    /// A freshly randomized particle somewhere on a `width` x `height` surface
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32) -> Self {
        let position = Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height);
        let velocity = Vec2::new(range(rng, SPEED_RANGE), range(rng, SPEED_RANGE));
        let radius = range(rng, RADIUS_RANGE);
        let color = Color::from_hsla(
            range(rng, HUE_BAND),
            SATURATION,
            LIGHTNESS,
            range(rng, ALPHA_RANGE),
        );
        Self::new(position, velocity, radius, color)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Uniform float in [min, max)
fn range<R: Rng + ?Sized>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}

/// Number of particles seeded for a surface: `floor(width * height / 20000)`
pub fn seed_count(width: u32, height: u32) -> usize {
    (u64::from(width) * u64::from(height) / DENSITY_DIVISOR) as usize
}

/// The ordered particle collection plus the last known pointer position.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    pointer: PointerState,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding exactly these particles (pointer unknown)
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            pointer: PointerState::new(),
        }
    }

    /// Replace every particle with a fresh set sized to the surface.
    /// The pointer is left untouched.
    pub fn reseed<R: Rng + ?Sized>(&mut self, width: u32, height: u32, rng: &mut R) {
        let count = seed_count(width, height);
        let (w, h) = (width as f32, height as f32);
        self.particles.clear();
        self.particles
            .extend((0..count).map(|_| Particle::random(rng, w, h)));
        debug!(width, height, count, "reseeded particle store");
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Pointer position; the origin before the first pointer event
    pub fn pointer(&self) -> Vec2 {
        self.pointer.position()
    }

    /// Whether a pointer event has been seen since the store was created
    pub fn pointer_known(&self) -> bool {
        self.pointer.is_known()
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer.move_to(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn seed_count_matches_density() {
        assert_eq!(seed_count(800, 600), 24);
        assert_eq!(seed_count(1920, 1080), 103);
        assert_eq!(seed_count(0, 600), 0);
        assert_eq!(seed_count(800, 0), 0);
        assert_eq!(seed_count(100, 199), 0);
        assert_eq!(seed_count(100, 200), 1);
    }

    #[test]
    fn seed_count_is_floor_for_many_sizes() {
        for w in (0..2000).step_by(37) {
            for h in (0..1500).step_by(41) {
                let expected = ((w as f64) * (h as f64) / 20000.0).floor() as usize;
                assert_eq!(seed_count(w, h), expected, "{w}x{h}");
            }
        }
    }

    #[test]
    fn reseed_replaces_everything() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut store = ParticleStore::new();
        store.reseed(800, 600, &mut rng);
        assert_eq!(store.len(), 24);
        let before = store.particles().to_vec();

        store.reseed(400, 300, &mut rng);
        assert_eq!(store.len(), 6);
        assert!(store.particles().iter().all(|p| !before.contains(p)));

        store.reseed(0, 0, &mut rng);
        assert!(store.is_empty());
    }

    #[test]
    fn reseed_keeps_pointer() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut store = ParticleStore::new();
        store.set_pointer(12.0, 34.0);
        store.reseed(800, 600, &mut rng);
        assert_eq!(store.pointer(), Vec2::new(12.0, 34.0));
        assert!(store.pointer_known());
    }

    #[test]
    fn pointer_defaults_to_origin() {
        let store = ParticleStore::new();
        assert_eq!(store.pointer(), Vec2::ZERO);
        assert!(!store.pointer_known());
    }

    #[test]
    fn random_particles_respect_ranges() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let p = Particle::random(&mut rng, 800.0, 600.0);
            assert!(p.position.x >= 0.0 && p.position.x < 800.0);
            assert!(p.position.y >= 0.0 && p.position.y < 600.0);
            assert!(p.velocity.x >= -0.15 && p.velocity.x < 0.15);
            assert!(p.velocity.y >= -0.15 && p.velocity.y < 0.15);
            assert!(p.radius() >= 0.5 && p.radius() < 2.0);
            let a = p.color().a;
            assert!(a >= 0.1 - 1e-6 && a < 0.4 + 1e-6);
            // Blue-violet band: blue always dominates red
            assert!(p.color().b > p.color().r);
        }
    }

    #[test]
    fn same_seed_same_particles() {
        let mut a = ParticleStore::new();
        let mut b = ParticleStore::new();
        a.reseed(640, 480, &mut SmallRng::seed_from_u64(9));
        b.reseed(640, 480, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a.particles(), b.particles());
    }
}
