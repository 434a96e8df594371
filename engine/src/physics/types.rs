//! Physics type conversions
//!
//! The public API speaks glam; rapier speaks nalgebra. These helpers are the
//! only place the two meet.

pub use glam::{Vec2, Vec3};
use rapier3d::prelude::{Point, Real, Vector, point, vector};

#[inline]
pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

#[inline]
pub fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

#[inline]
pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Horizontal (x, z) part of a 3D vector.
#[inline]
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}
