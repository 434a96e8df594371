//! Terrain Parameters
//!
//! Configurable parameters for procedural terrain synthesis. Every struct has
//! a tuned `Default` and deserializes with `#[serde(default)]`, so a JSON
//! override only needs the fields it changes.

use serde::{Deserialize, Serialize};

use super::noise::{NoiseKind, NoiseParams};
use crate::error::ConfigError;

/// Concentric target profile carved around the world origin (marble game).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetZone {
    /// Radius of the small scoring hole at the center
    pub center_hole_radius: f32,
    /// Depth of the scoring hole at d = 0 (positive number)
    pub center_hole_depth: f32,
    /// Radius where the bowl meets the rim
    pub circle_radius: f32,
    /// Depth of the bowl (positive number)
    pub hole_depth: f32,
    /// Radial width of the raised rim
    pub rim_width: f32,
    /// Peak rim height above the surrounding ground
    pub rim_height: f32,
    /// Amplitude of the angular exponent jitter in the bowl
    pub edge_noise: f32,
    /// Relative amplitude of rim height variation
    pub rim_noise: f32,
}

impl Default for TargetZone {
    fn default() -> Self {
        Self {
            center_hole_radius: 0.05,
            center_hole_depth: 0.2,
            circle_radius: 0.5,
            hole_depth: 0.15,
            rim_width: 0.12,
            rim_height: 0.04,
            edge_noise: 0.25,
            rim_noise: 0.2,
        }
    }
}

impl TargetZone {
    /// Outer radius of the rim.
    pub fn outer_radius(&self) -> f32 {
        self.circle_radius + self.rim_width
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.center_hole_radius <= 0.0 || self.circle_radius <= self.center_hole_radius {
            return Err(ConfigError::Invalid(format!(
                "target zone needs 0 < center_hole_radius ({}) < circle_radius ({})",
                self.center_hole_radius, self.circle_radius
            )));
        }
        if self.hole_depth < 0.0 || self.center_hole_depth < self.hole_depth {
            return Err(ConfigError::Invalid(format!(
                "center_hole_depth ({}) must be at least hole_depth ({})",
                self.center_hole_depth, self.hole_depth
            )));
        }
        if self.rim_width < 0.0 || self.rim_height < 0.0 {
            return Err(ConfigError::Invalid("rim dimensions must be non-negative".into()));
        }
        if !(0.0..2.0).contains(&self.edge_noise) {
            return Err(ConfigError::Invalid(format!(
                "edge_noise must be in [0, 2), got {}",
                self.edge_noise
            )));
        }
        if !(0.0..1.0).contains(&self.rim_noise) {
            return Err(ConfigError::Invalid(format!(
                "rim_noise must be in [0, 1), got {}",
                self.rim_noise
            )));
        }
        Ok(())
    }
}

/// Large-scale shaping around the world origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaseShape {
    /// Noise only
    Flat,
    /// Gaussian massif, `height * exp(-(d / radius)^2)` (condor)
    Peak { height: f32, radius: f32 },
    /// Hole, bowl and rim (marble)
    Bowl(TargetZone),
}

impl Default for BaseShape {
    fn default() -> Self {
        BaseShape::Bowl(TargetZone::default())
    }
}

impl BaseShape {
    pub fn target_zone(&self) -> Option<&TargetZone> {
        match self {
            BaseShape::Bowl(zone) => Some(zone),
            _ => None,
        }
    }
}

/// Sparse lattice bumps that keep the surface from looking machined.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroBumps {
    /// Chance that a lattice cell carries a bump
    pub probability: f32,
    /// Lattice cell size (world units)
    pub spacing: f32,
    /// Maximum bump height
    pub height: f32,
}

impl Default for MicroBumps {
    fn default() -> Self {
        Self {
            probability: 0.08,
            spacing: 0.1,
            height: 0.004,
        }
    }
}

/// Output clamp applied after every synthesis stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightEnvelope {
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for HeightEnvelope {
    fn default() -> Self {
        Self {
            min_height: -1.0,
            max_height: 1.0,
        }
    }
}

impl HeightEnvelope {
    #[inline]
    pub fn clamp(&self, height: f32) -> f32 {
        height.clamp(self.min_height, self.max_height)
    }
}

/// Everything the synthesizer needs besides the placed features.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub noise: NoiseParams,
    pub shape: BaseShape,
    pub micro_bumps: MicroBumps,
    pub envelope: HeightEnvelope,
    /// World-unit scale applied to a normalized heightmap seed
    pub seed_scale: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            shape: BaseShape::default(),
            micro_bumps: MicroBumps::default(),
            envelope: HeightEnvelope::default(),
            seed_scale: 0.0,
        }
    }
}

impl TerrainParams {
    /// Flat ground with no noise; mostly for tests.
    pub fn flat() -> Self {
        Self {
            noise: NoiseParams {
                amplitude: 0.0,
                ..NoiseParams::default()
            },
            shape: BaseShape::Flat,
            micro_bumps: MicroBumps {
                probability: 0.0,
                ..MicroBumps::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.noise.kind == NoiseKind::Sine && !(2..=4).contains(&self.noise.octaves) {
            return Err(ConfigError::Invalid(format!(
                "sine noise uses 2 to 4 octaves, got {}",
                self.noise.octaves
            )));
        }
        if self.noise.octaves == 0 || self.noise.octaves > 8 {
            return Err(ConfigError::Invalid(format!(
                "noise octaves must be in 1..=8, got {}",
                self.noise.octaves
            )));
        }
        if self.envelope.min_height > self.envelope.max_height {
            return Err(ConfigError::Invalid(format!(
                "height envelope is inverted: [{}, {}]",
                self.envelope.min_height, self.envelope.max_height
            )));
        }
        if !(0.0..=1.0).contains(&self.micro_bumps.probability) {
            return Err(ConfigError::Invalid(format!(
                "micro bump probability must be in [0, 1], got {}",
                self.micro_bumps.probability
            )));
        }
        if self.micro_bumps.probability > 0.0 && self.micro_bumps.spacing <= 0.0 {
            return Err(ConfigError::Invalid("micro bump spacing must be positive".into()));
        }
        match self.shape {
            BaseShape::Bowl(zone) => zone.validate()?,
            BaseShape::Peak { radius, .. } if radius <= 0.0 => {
                return Err(ConfigError::Invalid("peak radius must be positive".into()));
            }
            _ => {}
        }
        Ok(())
    }
}
