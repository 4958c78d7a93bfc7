//! Drift Core - Foundational types for the Drift particle field
//!
//! This crate provides the types that all other Drift crates depend on:
//! - `Vec2` - 2D positions and velocities (re-exported from glam)
//! - `Color`, `Rect` - Paint types shared by the renderer and the hosts
//! - Error types and Result alias

mod error;
mod types;

pub use error::{DriftError, Result};
pub use glam::Vec2;
pub use types::{Color, Rect};
