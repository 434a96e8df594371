//! World Module
//!
//! World-space conventions shared by terrain synthesis, rendering and physics.
//!
//! 1 unit = 1 meter. Y is up; terrain height fields span the XZ plane.

pub mod grid;

pub use grid::{GridTransform, centered_origin};
