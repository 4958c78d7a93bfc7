//! Drift Field - ambient particle field engine
//!
//! A drifting field of faint blue-violet particles drawn behind page content:
//! - `ParticleStore` - particle state plus the last known pointer position
//! - `Integrator` - Euler step, edge reflection, pointer repulsion
//! - `FieldRenderer` - trail fill, distance-faded connection lines, glow discs
//! - `Canvas` - drawing surface trait, with `PixelCanvas` (software raster)
//!   and `RecordingCanvas` (command list)
//! - `ParticleField` - mount / frame loop / resize / pointer / teardown
//! - `FieldHost` - what an embedding environment provides, and `OffscreenHost`

pub mod canvas;
pub mod field;
pub mod host;
pub mod integrator;
pub mod particle;
pub mod raster;
pub mod render;

pub use canvas::{Canvas, DrawCommand, LinearGradient, RecordingCanvas};
pub use field::{ParticleField, Phase};
pub use host::{FieldHost, OffscreenHost};
pub use integrator::{repulsion, Bounds, Integrator};
pub use particle::{seed_count, Particle, ParticleStore};
pub use raster::PixelCanvas;
pub use render::{connection_opacity, FieldRenderer};
