//! Terrain-Physics Bridge
//!
//! Turns a [`HeightField`] and its [`TerrainFeature`]s into static rapier
//! colliders:
//!
//! - one heightfield collider laid out from the field's [`GridTransform`]
//! - one sphere per feature large enough to matter
//! - a half-space ground plane just below the lowest sample
//!
//! Feed it the collision field
//! ([`HeightSynthesizer::build_collision_heightfield`]), where overlapping
//! features count as the tallest one. The summed field is for the mesh only.
//!
//! A malformed height matrix never aborts the scene. The bridge reports a
//! [`BridgeError`] through telemetry and keeps only the ground plane.
//!
//! ## Alignment
//! rapier centers a heightfield on its collider translation, rows along Z and
//! columns along X. Placing the collider at the grid center puts cell (0, 0)
//! at `grid.origin`, which for a centered grid is
//! `-((resolution - 1) * cell_size) / 2` on both axes.
//!
//! [`HeightSynthesizer::build_collision_heightfield`]: crate::terrain::HeightSynthesizer::build_collision_heightfield

use glam::{Vec2, Vec3};
use rapier3d::na::DMatrix;
use rapier3d::prelude::{ColliderBuilder, ColliderHandle, Vector, vector};
use serde::{Deserialize, Serialize};

use super::materials::SurfaceMaterial;
use super::types::to_vector;
use super::world::PhysicsWorld;
use crate::error::{BridgeError, ConfigError};
use crate::telemetry::{Telemetry, TelemetryEvent};
use crate::terrain::{HeightField, TerrainFeature};
use crate::world::GridTransform;

/// Bridge tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Features with a smaller footprint get no sphere
    pub feature_collider_min_radius: f32,
    /// Footprint multiplier for feature spheres (1.0 = same as the render)
    pub physics_radius_scale: f32,
    /// Distance of the ground plane below the lowest sample
    pub ground_plane_offset: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            feature_collider_min_radius: 0.03,
            physics_radius_scale: 1.0,
            ground_plane_offset: 0.05,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_radius_scale <= 0.0 {
            return Err(ConfigError::Invalid("physics_radius_scale must be positive".into()));
        }
        if self.ground_plane_offset < 0.0 || self.feature_collider_min_radius < 0.0 {
            return Err(ConfigError::Invalid(
                "ground_plane_offset and feature_collider_min_radius must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Where the heightfield collider goes and how it is scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightfieldLayout {
    pub rows: usize,
    pub cols: usize,
    /// World (x, z) of cell (0, 0)
    pub origin: Vec2,
    /// Collider translation (the grid center)
    pub translation: Vec3,
    /// Collider scale: full extent on X and Z, 1 on Y
    pub scale: Vec3,
}

impl HeightfieldLayout {
    pub fn from_grid(grid: &GridTransform) -> Self {
        let extent = grid.extent();
        let center = grid.center();
        Self {
            rows: grid.rows,
            cols: grid.cols,
            origin: grid.origin,
            translation: Vec3::new(center.x, 0.0, center.y),
            scale: Vec3::new(extent.x, 1.0, extent.y),
        }
    }
}

/// Sphere standing in for one feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureCollider {
    pub handle: ColliderHandle,
    /// Index into the feature list passed to the bridge
    pub feature: usize,
    pub center: Vec3,
    pub radius: f32,
}

/// Everything the bridge inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainColliders {
    pub heightfield: Option<ColliderHandle>,
    pub layout: Option<HeightfieldLayout>,
    pub features: Vec<FeatureCollider>,
    pub ground_plane: ColliderHandle,
    pub ground_height: f32,
    /// Set when the heightfield could not be built
    pub degraded: bool,
}

/// Builds static terrain colliders from synthesized terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerrainPhysicsBridge {
    config: BridgeConfig,
}

impl TerrainPhysicsBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn build(
        &self,
        world: &mut PhysicsWorld,
        field: &HeightField,
        features: &[TerrainFeature],
        telemetry: &mut dyn Telemetry,
    ) -> TerrainColliders {
        let (heightfield, layout, degraded) = match Self::heightfield_collider(field) {
            Ok((builder, layout)) => {
                let handle = world.add_static_collider(builder.build());
                log::debug!(
                    "heightfield collider {}x{} at origin ({:.3}, {:.3})",
                    layout.rows,
                    layout.cols,
                    layout.origin.x,
                    layout.origin.y
                );
                (Some(handle), Some(layout), false)
            }
            Err(err) => {
                log::warn!("heightfield collider rejected: {err}");
                telemetry.record(TelemetryEvent::BridgeFallback(err));
                (None, None, true)
            }
        };

        let lowest = field
            .samples()
            .iter()
            .copied()
            .filter(|h| h.is_finite())
            .reduce(f32::min)
            .unwrap_or(0.0);
        let ground_height = lowest - self.config.ground_plane_offset;
        let ground_plane = world.add_static_collider(
            ColliderBuilder::halfspace(Vector::y_axis())
                .translation(vector![0.0, ground_height, 0.0])
                .user_data(SurfaceMaterial::GroundPlane.to_user_data())
                .build(),
        );

        let features = if degraded {
            Vec::new()
        } else {
            self.feature_colliders(world, field, features)
        };

        TerrainColliders {
            heightfield,
            layout,
            features,
            ground_plane,
            ground_height,
            degraded,
        }
    }

    fn heightfield_collider(
        field: &HeightField,
    ) -> Result<(ColliderBuilder, HeightfieldLayout), BridgeError> {
        field.validate()?;
        let grid = field.grid();
        let layout = HeightfieldLayout::from_grid(grid);
        let samples = field.samples();
        let heights = DMatrix::from_fn(grid.rows, grid.cols, |row, col| samples[grid.index(row, col)]);

        let builder = ColliderBuilder::heightfield(heights, to_vector(layout.scale))
            .translation(to_vector(layout.translation))
            .user_data(SurfaceMaterial::Terrain.to_user_data());
        Ok((builder, layout))
    }

    fn feature_colliders(
        &self,
        world: &mut PhysicsWorld,
        field: &HeightField,
        features: &[TerrainFeature],
    ) -> Vec<FeatureCollider> {
        let mut out = Vec::new();
        for (index, feature) in features.iter().enumerate() {
            let footprint = feature.radius * self.config.physics_radius_scale;
            if footprint < self.config.feature_collider_min_radius || feature.height <= 0.0 {
                continue;
            }

            let base = field.sample_at(feature.position.x, feature.position.y) - feature.height;
            let (center, radius) = spherical_cap(feature.position, base, footprint, feature.height);
            let handle = world.add_static_collider(
                ColliderBuilder::ball(radius)
                    .translation(to_vector(center))
                    .user_data(SurfaceMaterial::from_feature(feature.kind).to_user_data())
                    .build(),
            );
            out.push(FeatureCollider {
                handle,
                feature: index,
                center,
                radius,
            });
        }
        log::debug!("{} of {} features got sphere colliders", out.len(), features.len());
        out
    }
}

/// Sphere whose cap passes through the rim circle (radius `footprint` at
/// `base`) and the peak (`base + height`).
pub fn spherical_cap(position: Vec2, base: f32, footprint: f32, height: f32) -> (Vec3, f32) {
    let radius = (footprint * footprint + height * height) / (2.0 * height);
    let center = Vec3::new(position.x, base + height - radius, position.y);
    (center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_centered_grid() {
        for (resolution, cell) in [(65, 1.0), (129, 0.0234375), (33, 2.5)] {
            let grid = GridTransform::square(resolution, cell);
            let layout = HeightfieldLayout::from_grid(&grid);
            let expected = -((resolution - 1) as f32 * cell) / 2.0;
            assert!((layout.origin.x - expected).abs() < 1e-5);
            assert!((layout.origin.y - expected).abs() < 1e-5);
            assert!(layout.translation.length() < 1e-5);
            assert_eq!(layout.scale.y, 1.0);
        }
    }

    #[test]
    fn test_layout_for_offset_grid() {
        let grid = GridTransform {
            cols: 5,
            rows: 3,
            cell_size: 1.0,
            origin: Vec2::new(10.0, 20.0),
        };
        let layout = HeightfieldLayout::from_grid(&grid);
        assert_eq!(layout.translation, Vec3::new(12.0, 0.0, 21.0));
        assert_eq!(layout.scale, Vec3::new(4.0, 1.0, 2.0));
    }

    #[test]
    fn test_spherical_cap_touches_rim_and_peak() {
        let (center, radius) = spherical_cap(Vec2::new(1.0, 2.0), 0.5, 0.3, 0.1);
        // Peak
        assert!((center.y + radius - 0.6).abs() < 1e-5);
        // Rim
        let rim = Vec3::new(1.3, 0.5, 2.0);
        assert!((rim.distance(center) - radius).abs() < 1e-5);
    }
}
