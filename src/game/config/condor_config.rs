//! Condor Flight Configuration
//!
//! A few hundred meters of mountain around a single Gaussian peak, optionally
//! roughened by a grayscale heightmap, and the glider that soars over it.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::marble_config::TerrainGridConfig;
use crate::error::ConfigError;
use crate::physics::GliderConfig;
use crate::terrain::{BaseShape, HeightEnvelope, MicroBumps, NoiseKind, NoiseParams, TerrainParams};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondorConfig {
    pub terrain: TerrainParams,
    pub grid: TerrainGridConfig,
    /// Optional grayscale heightmap, stretched over the whole grid
    pub heightmap: Option<String>,
    pub glider: GliderConfig,
    /// Launch point (meters); raised if it would start below the clearance floor
    pub start_position: Vec3,
    /// Launch direction, flattened onto the ground plane
    pub start_heading: Vec3,
    /// Launch airspeed (m/s)
    pub start_speed: f32,
    /// Fixed integration step (seconds)
    pub fixed_dt: f32,
    pub max_substeps: u32,
    /// Frame deltas are clamped to this (seconds)
    pub max_frame_dt: f32,
}

impl Default for CondorConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParams {
                noise: NoiseParams {
                    kind: NoiseKind::Sine,
                    seed: 11,
                    octaves: 4,
                    base_frequency: 0.02,
                    amplitude: 6.0,
                    lacunarity: 2.1,
                    persistence: 0.45,
                },
                shape: BaseShape::Peak {
                    height: 60.0,
                    radius: 90.0,
                },
                micro_bumps: MicroBumps {
                    probability: 0.0,
                    ..MicroBumps::default()
                },
                envelope: HeightEnvelope {
                    min_height: -20.0,
                    max_height: 120.0,
                },
                seed_scale: 25.0,
            },
            grid: TerrainGridConfig {
                size: 400.0,
                resolution: 257,
            },
            heightmap: None,
            glider: GliderConfig::default(),
            start_position: Vec3::new(0.0, 90.0, -170.0),
            start_heading: Vec3::Z,
            start_speed: 13.0,
            fixed_dt: 1.0 / 60.0,
            max_substeps: 4,
            max_frame_dt: 0.1,
        }
    }
}

impl CondorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        super::from_json_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        super::load_json(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.grid.validate()?;
        self.glider.validate()?;
        if !(self.fixed_dt > 0.0 && self.fixed_dt <= self.max_frame_dt) {
            return Err(ConfigError::Invalid(format!(
                "fixed_dt {} must be positive and not exceed max_frame_dt {}",
                self.fixed_dt, self.max_frame_dt
            )));
        }
        if self.max_substeps == 0 || self.start_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "max_substeps and start_speed must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CondorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_overrides() {
        let config = CondorConfig::from_json_str(
            r#"{ "heightmap": "andes.png", "glider": { "wind": [4.0, 0.0, 0.0] } }"#,
        )
        .unwrap();
        assert_eq!(config.heightmap.as_deref(), Some("andes.png"));
        assert_eq!(config.glider.wind, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(config.glider.mass, GliderConfig::default().mass);
        assert!(matches!(config.terrain.shape, BaseShape::Peak { .. }));
    }

    #[test]
    fn test_rejects_degenerate_grid_size() {
        for size in [0.0, -400.0, f32::NAN] {
            let mut config = CondorConfig::default();
            config.grid.size = size;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "grid size {size} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_substeps() {
        let config = CondorConfig {
            max_substeps: 0,
            ..CondorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
