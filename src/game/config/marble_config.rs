//! Marble Toss Configuration
//!
//! Terrain, physics and gameplay tuning for the marble toss. The world is
//! small: a 3 m square board, 2.5 cm marbles, a target zone at the origin.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::{
    BallParams, BridgeConfig, ContactMaterial, ContactMaterialTable, PhysicsConfig,
    PostProcessConfig, SurfaceMaterial,
};
use crate::terrain::{PlacementConfig, TargetZone, TerrainParams};
use crate::world::GridTransform;

/// Size and resolution of the square terrain grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainGridConfig {
    /// Side length (meters)
    pub size: f32,
    /// Vertices per side
    pub resolution: usize,
}

impl Default for TerrainGridConfig {
    fn default() -> Self {
        Self {
            size: 3.0,
            resolution: 129,
        }
    }
}

impl TerrainGridConfig {
    pub fn grid(&self) -> GridTransform {
        GridTransform::covering(self.size, self.resolution)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution < 2 || !(self.size.is_finite() && self.size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "terrain grid needs resolution >= 2 and positive size, got {} / {}",
                self.resolution, self.size
            )));
        }
        Ok(())
    }
}

/// Contact materials against the marble, one per surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    pub terrain: ContactMaterial,
    pub rock: ContactMaterial,
    pub hill: ContactMaterial,
    pub ground_plane: ContactMaterial,
    /// Marble on marble
    pub marble: ContactMaterial,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            terrain: ContactMaterial::TERRAIN_MARBLE,
            rock: ContactMaterial::ROCK_MARBLE,
            hill: ContactMaterial::HILL_MARBLE,
            ground_plane: ContactMaterial::GROUND_PLANE_MARBLE,
            marble: ContactMaterial::MARBLE_MARBLE,
        }
    }
}

impl ContactTuning {
    pub fn table(&self) -> ContactMaterialTable {
        let mut table = ContactMaterialTable::new();
        let marble = SurfaceMaterial::Marble;
        table.insert(SurfaceMaterial::Terrain, marble, self.terrain);
        table.insert(SurfaceMaterial::Rock, marble, self.rock);
        table.insert(SurfaceMaterial::Hill, marble, self.hill);
        table.insert(SurfaceMaterial::GroundPlane, marble, self.ground_plane);
        table.insert(marble, marble, self.marble);
        table
    }
}

/// Launcher placement, movement limits and charge meter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Starting position (meters)
    pub position: Vec3,
    /// Point on the ground the launcher aims at
    pub aim_at: Vec2,
    /// Sideways step per move (meters)
    pub lateral_step: f32,
    /// Furthest the launcher may move sideways from x = 0
    pub lateral_limit: f32,
    /// Vertical step per adjustment (meters)
    pub height_step: f32,
    /// Minimum height above the terrain below the launcher
    pub min_clearance: f32,
    pub max_height: f32,
    /// Elevation of the throw (radians)
    pub launch_angle: f32,
    /// Speed when charging starts (m/s)
    pub min_power: f32,
    /// Charge cap (m/s)
    pub max_power: f32,
    /// Charge gain (m/s per second held)
    pub charge_rate: f32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, 1.3),
            aim_at: Vec2::ZERO,
            lateral_step: 0.05,
            lateral_limit: 1.2,
            height_step: 0.05,
            min_clearance: 0.1,
            max_height: 1.2,
            launch_angle: 0.5,
            min_power: 1.0,
            max_power: 5.0,
            charge_rate: 2.0,
        }
    }
}

impl LauncherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_power > 0.0 && self.min_power <= self.max_power) {
            return Err(ConfigError::Invalid(format!(
                "launcher power range [{}, {}] is empty",
                self.min_power, self.max_power
            )));
        }
        if self.charge_rate <= 0.0 || self.lateral_step <= 0.0 || self.height_step <= 0.0 {
            return Err(ConfigError::Invalid(
                "charge_rate and launcher steps must be positive".into(),
            ));
        }
        if !(0.0..std::f32::consts::FRAC_PI_2).contains(&self.launch_angle) {
            return Err(ConfigError::Invalid("launch_angle must be in [0, pi/2)".into()));
        }
        Ok(())
    }
}

/// Points per landing band, measured from the target center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub hole: u32,
    pub circle: u32,
    pub rim: u32,
    pub miss: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            hole: 100,
            circle: 50,
            rim: 20,
            miss: 0,
        }
    }
}

/// Everything the marble toss needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarbleConfig {
    pub terrain: TerrainParams,
    pub grid: TerrainGridConfig,
    pub placement: PlacementConfig,
    pub bridge: BridgeConfig,
    pub physics: PhysicsConfig,
    pub ball: BallParams,
    pub post_process: PostProcessConfig,
    pub contacts: ContactTuning,
    pub launcher: LauncherConfig,
    pub scoring: ScoringConfig,
    /// A marble slower than this (m/s) counts as still
    pub rest_speed: f32,
    /// Consecutive still sub-steps before a marble is settled
    pub rest_frames: u32,
    /// Marbles are settled where they are after this long (seconds)
    pub max_roll_time: f32,
}

impl Default for MarbleConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParams::default(),
            grid: TerrainGridConfig::default(),
            placement: PlacementConfig::default(),
            bridge: BridgeConfig::default(),
            physics: PhysicsConfig::default(),
            ball: BallParams::default(),
            post_process: PostProcessConfig::default(),
            contacts: ContactTuning::default(),
            launcher: LauncherConfig::default(),
            scoring: ScoringConfig::default(),
            rest_speed: 0.05,
            rest_frames: 30,
            max_roll_time: 15.0,
        }
    }
}

impl MarbleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        super::from_json_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        super::load_json(path)
    }

    /// The target zone used for scoring; a default zone when the terrain
    /// has no bowl.
    pub fn target_zone(&self) -> TargetZone {
        self.terrain.shape.target_zone().copied().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.grid.validate()?;
        self.placement.validate()?;
        self.bridge.validate()?;
        self.physics.validate()?;
        self.post_process.validate()?;
        self.launcher.validate()?;
        self.contacts
            .table()
            .validate(&ContactMaterialTable::required_pairs(SurfaceMaterial::Marble))?;
        if self.ball.radius <= 0.0 || self.ball.mass <= 0.0 {
            return Err(ConfigError::Invalid("ball radius and mass must be positive".into()));
        }
        if self.rest_speed <= 0.0 || self.rest_frames == 0 || self.max_roll_time <= 0.0 {
            return Err(ConfigError::Invalid(
                "rest_speed, rest_frames and max_roll_time must be positive".into(),
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
        assert!(MarbleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MarbleConfig::from_json_str(
            r#"{ "rest_frames": 10, "grid": { "resolution": 65 }, "contacts": { "rock": { "friction": 0.95 } } }"#,
        )
        .unwrap();
        assert_eq!(config.rest_frames, 10);
        assert_eq!(config.grid.resolution, 65);
        assert_eq!(config.grid.size, 3.0);
        assert_eq!(config.contacts.rock.friction, 0.95);
        assert_eq!(config.contacts.rock.restitution, ContactMaterial::default().restitution);
        assert_eq!(config.max_roll_time, 15.0);
    }

    #[test]
    fn test_default_contacts_match_marble_table() {
        assert_eq!(ContactTuning::default().table(), ContactMaterialTable::marble_defaults());
        assert_eq!(ContactTuning::default().rock, ContactMaterial::ROCK_MARBLE);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            MarbleConfig::from_json_str("{ rest_frames: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let config = MarbleConfig {
            rest_frames: 0,
            ..MarbleConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = MarbleConfig::default();
        config.launcher.max_power = 0.5;
        assert!(config.validate().is_err());

        let mut config = MarbleConfig::default();
        config.grid.resolution = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_contact_tuning_covers_every_pair() {
        let table = ContactTuning::default().table();
        let required = ContactMaterialTable::required_pairs(SurfaceMaterial::Marble);
        assert!(table.missing_pairs(&required).is_empty());
    }

    #[test]
    fn test_target_zone_falls_back_to_default() {
        let config = MarbleConfig {
            terrain: TerrainParams::flat(),
            ..MarbleConfig::default()
        };
        assert_eq!(config.target_zone(), TargetZone::default());
    }
}
