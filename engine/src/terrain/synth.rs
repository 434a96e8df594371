//! Height Synthesizer
//!
//! Pure `(x, z) -> elevation` evaluation. Stages run in a fixed order:
//!
//! 1. Base noise (layered sine or value noise, plus an optional heightmap seed)
//! 2. Shaping around the origin: Gaussian peak, or hole / bowl / rim
//! 3. Feature stamping: rocks and hills, summed
//! 4. Sparse micro-bumps on a hashed lattice
//!
//! The result is clamped to the configured [`HeightEnvelope`]. Collision
//! queries use the same stages except that overlapping features combine with
//! `max` instead of being summed.
//!
//! [`HeightEnvelope`]: super::params::HeightEnvelope

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::features::TerrainFeature;
use super::heightfield::{HeightField, TerrainQuery};
use super::heightmap::HeightmapSeed;
use super::noise::{lattice_hash, layered_noise, octave_phase};
use super::params::{BaseShape, TargetZone, TerrainParams};
use crate::world::GridTransform;

const MICRO_BUMP_SALT: u32 = 0x5eed_b0b5;
const RIM_NOISE_SALT: u32 = 0x0000_0a11;

/// Deterministic terrain height function.
#[derive(Clone, Debug)]
pub struct HeightSynthesizer {
    params: TerrainParams,
    features: Vec<TerrainFeature>,
    seed: Option<HeightmapSeed>,
}

impl HeightSynthesizer {
    pub fn new(params: TerrainParams, features: Vec<TerrainFeature>) -> Self {
        Self {
            params,
            features,
            seed: None,
        }
    }

    /// Layer a heightmap image under the procedural noise.
    pub fn with_heightmap(mut self, seed: Option<HeightmapSeed>) -> Self {
        self.seed = seed;
        self
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn features(&self) -> &[TerrainFeature] {
        &self.features
    }

    pub fn has_heightmap(&self) -> bool {
        self.seed.is_some()
    }

    /// Stage 1: noise plus the scaled heightmap seed.
    pub fn base_noise(&self, x: f32, z: f32) -> f32 {
        let noise = layered_noise(x, z, &self.params.noise);
        match &self.seed {
            Some(seed) => noise + seed.sample(x, z) * self.params.seed_scale,
            None => noise,
        }
    }

    /// Stages 1 and 2.
    pub fn shaped_height(&self, x: f32, z: f32) -> f32 {
        let d = (x * x + z * z).sqrt();
        match self.params.shape {
            BaseShape::Flat => self.base_noise(x, z),
            BaseShape::Peak { height, radius } => {
                let t = d / radius;
                height * (-t * t).exp() + self.base_noise(x, z)
            }
            BaseShape::Bowl(zone) => self.bowl_height(&zone, x, z, d),
        }
    }

    fn bowl_height(&self, zone: &TargetZone, x: f32, z: f32, d: f32) -> f32 {
        let theta = z.atan2(x);
        let seed = self.params.noise.seed;

        if d < zone.center_hole_radius {
            // Inverted parabola: -depth at the center, bowl value at the edge
            let edge = bowl_profile(zone, zone.center_hole_radius, theta, seed);
            let t = d / zone.center_hole_radius;
            return -zone.center_hole_depth + (zone.center_hole_depth + edge) * t * t;
        }

        let noise = self.base_noise(x, z);
        if d < zone.circle_radius {
            let fade = ((d - zone.center_hole_radius)
                / (zone.circle_radius - zone.center_hole_radius))
                .clamp(0.0, 1.0);
            return bowl_profile(zone, d, theta, seed) + noise * fade;
        }

        if d < zone.outer_radius() && zone.rim_width > 0.0 {
            let rim_position = (d - zone.circle_radius) / zone.rim_width;
            let jitter = zone.rim_noise * angular_noise(theta, seed ^ RIM_NOISE_SALT);
            return zone.rim_height * (PI * rim_position).sin() * (1.0 + jitter) + noise;
        }

        noise
    }

    /// Stage 3, additive.
    pub fn feature_height(&self, x: f32, z: f32) -> f32 {
        self.features.iter().map(|f| f.contribution_at(x, z)).sum()
    }

    /// Stage 3, tallest feature only.
    pub fn obstacle_height(&self, x: f32, z: f32) -> f32 {
        self.features
            .iter()
            .map(|f| f.contribution_at(x, z))
            .fold(0.0, f32::max)
    }

    /// Stage 4. Non-negative, and zero inside the center hole.
    pub fn micro_bump(&self, x: f32, z: f32) -> f32 {
        let bumps = &self.params.micro_bumps;
        if bumps.probability <= 0.0 || bumps.spacing <= 0.0 || bumps.height <= 0.0 {
            return 0.0;
        }
        if let Some(zone) = self.params.shape.target_zone() {
            if Vec2::new(x, z).length() < zone.center_hole_radius {
                return 0.0;
            }
        }

        let i = (x / bumps.spacing).floor() as i32;
        let j = (z / bumps.spacing).floor() as i32;
        let seed = self.params.noise.seed ^ MICRO_BUMP_SALT;
        if lattice_hash(i, j, seed) >= bumps.probability {
            return 0.0;
        }

        let center = Vec2::new(i as f32 + 0.5, j as f32 + 0.5) * bumps.spacing;
        let r = center.distance(Vec2::new(x, z)) / (bumps.spacing * 0.5);
        if r >= 1.0 {
            return 0.0;
        }
        let scale = 0.5 + 0.5 * lattice_hash(j, i, seed);
        bumps.height * scale * 0.5 * (1.0 + (PI * r).cos())
    }

    /// Render elevation at world (x, z).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let h = self.shaped_height(x, z) + self.feature_height(x, z) + self.micro_bump(x, z);
        self.params.envelope.clamp(h)
    }

    /// Elevation where overlapping obstacles count as the tallest one.
    pub fn collision_height_at(&self, x: f32, z: f32) -> f32 {
        let h = self.shaped_height(x, z) + self.obstacle_height(x, z) + self.micro_bump(x, z);
        self.params.envelope.clamp(h)
    }

    /// Evaluate [`Self::height_at`] at every vertex of `grid`.
    pub fn build_heightfield(&self, grid: &GridTransform) -> HeightField {
        HeightField::from_fn(*grid, |x, z| self.height_at(x, z))
    }

    /// Evaluate [`Self::collision_height_at`] at every vertex of `grid`. This
    /// is the field the physics bridge and the post-processor consume.
    pub fn build_collision_heightfield(&self, grid: &GridTransform) -> HeightField {
        HeightField::from_fn(*grid, |x, z| self.collision_height_at(x, z))
    }

    /// Surface normal from central differences.
    pub fn normal_at(&self, x: f32, z: f32, epsilon: f32) -> Vec3 {
        let g = self.gradient_at(x, z, epsilon);
        Vec3::new(-g.x, 1.0, -g.y).normalize()
    }
}

impl TerrainQuery for HeightSynthesizer {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        HeightSynthesizer::height_at(self, x, z)
    }
}

/// `-holeDepth * (1 - (d / circleRadius)^(2 + edgeNoise))`
fn bowl_profile(zone: &TargetZone, d: f32, theta: f32, seed: u32) -> f32 {
    let exponent = 2.0 + zone.edge_noise * angular_noise(theta, seed);
    -zone.hole_depth * (1.0 - (d / zone.circle_radius).powf(exponent))
}

/// Smooth periodic noise in [-1, 1] over the angle around the origin.
fn angular_noise(theta: f32, seed: u32) -> f32 {
    [(3.0, 0.5), (5.0, 0.3), (7.0, 0.2)]
        .iter()
        .enumerate()
        .map(|(k, &(harmonic, weight))| {
            weight * (harmonic * theta + octave_phase(seed, k as u32, 2)).sin()
        })
        .sum()
}
