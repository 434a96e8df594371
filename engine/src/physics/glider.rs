//! Glider flight model for the condor
//!
//! A point-mass glider: gravity, drag along the relative wind, lift
//! perpendicular to it and tilted by the bank angle. Banking tilts lift
//! sideways, which is all a coordinated turn needs. Air rising over a slope
//! facing the wind (ridge lift) is added to the air velocity, so it feeds
//! through lift and drag instead of pushing the bird directly.
//!
//! The glider never touches rapier. Terrain is read through
//! [`TerrainQuery`], and a clearance floor keeps it above the surface.
//!
//! # Example
//!
//! ```ignore
//! use condor_marble_engine::physics::glider::{Glider, GliderConfig, GliderControls};
//! use glam::Vec3;
//!
//! let config = GliderConfig::default();
//! let mut condor = Glider::launch(Vec3::new(0.0, 80.0, -120.0), Vec3::Z, 14.0);
//! let state = condor.integrate(&config, GliderControls::default(), &terrain, 1.0 / 60.0);
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain::TerrainQuery;

/// Flight environment and airframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GliderConfig {
    /// Gravity acceleration vector (m/s²)
    pub gravity: Vec3,
    /// Air density (kg/m³)
    pub air_density: f32,
    /// Body mass (kilograms). An Andean condor is 11-15 kg.
    pub mass: f32,
    /// Wing area (m²)
    pub wing_area: f32,
    /// Lift coefficient with the climb input centered
    pub lift_coefficient: f32,
    /// How far full climb/dive input moves the lift coefficient
    pub climb_authority: f32,
    /// Drag coefficient (wing + body)
    pub drag_coefficient: f32,
    /// Bank angle at full input (radians)
    pub max_bank: f32,
    /// How fast the bank angle follows the input (radians/second)
    pub bank_rate: f32,
    /// Horizontal wind (m/s); the y component is ignored
    pub wind: Vec3,
    /// Updraft per unit of (wind · uphill slope)
    pub ridge_lift: f32,
    /// Height above ground over which ridge lift fades out (meters)
    pub ridge_height: f32,
    /// The glider is held at least this far above the terrain (meters)
    pub min_clearance: f32,
    /// Below this airspeed lift is not computed (m/s)
    pub min_airspeed: f32,
}

impl Default for GliderConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            air_density: 1.225,
            mass: 11.0,
            wing_area: 1.1,
            lift_coefficient: 1.0,
            climb_authority: 0.4,
            drag_coefficient: 0.06,
            max_bank: 0.7,
            bank_rate: 1.2,
            wind: Vec3::new(0.0, 0.0, 6.0),
            ridge_lift: 1.0,
            ridge_height: 60.0,
            min_clearance: 2.0,
            min_airspeed: 0.5,
        }
    }
}

impl GliderConfig {
    /// Still air, no ridge lift.
    pub fn calm() -> Self {
        Self {
            wind: Vec3::ZERO,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mass <= 0.0 || self.wing_area <= 0.0 {
            return Err(ConfigError::Invalid("glider mass and wing_area must be positive".into()));
        }
        if self.air_density < 0.0 || self.drag_coefficient < 0.0 {
            return Err(ConfigError::Invalid(
                "air_density and drag_coefficient must be non-negative".into(),
            ));
        }
        if !(0.0..std::f32::consts::FRAC_PI_2).contains(&self.max_bank) {
            return Err(ConfigError::Invalid(format!(
                "max_bank {} must be in [0, pi/2)",
                self.max_bank
            )));
        }
        if self.bank_rate <= 0.0 || self.ridge_height <= 0.0 || self.min_clearance < 0.0 {
            return Err(ConfigError::Invalid(
                "bank_rate and ridge_height must be positive, min_clearance non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Pilot input, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GliderControls {
    /// Positive banks right
    pub bank: f32,
    /// Positive raises the nose (more lift, more drag)
    pub climb: f32,
}

impl GliderControls {
    pub fn clamped(self) -> Self {
        Self {
            bank: self.bank.clamp(-1.0, 1.0),
            climb: self.climb.clamp(-1.0, 1.0),
        }
    }
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GliderState {
    /// Free flight
    #[default]
    Flying,
    /// Held up by the clearance floor this step
    Skimming {
        /// Terrain height under the glider (meters)
        ground: f32,
    },
}

/// The condor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glider {
    /// World position (meters)
    pub position: Vec3,
    /// Ground velocity (m/s)
    pub velocity: Vec3,
    /// Current bank angle (radians, positive right)
    pub bank: f32,
    /// Updraft felt during the last step (m/s)
    pub updraft: f32,
}

impl Glider {
    /// Start level flight along `heading` (projected onto the ground plane).
    pub fn launch(position: Vec3, heading: Vec3, speed: f32) -> Self {
        let flat = Vec3::new(heading.x, 0.0, heading.z).normalize_or(Vec3::Z);
        Self {
            position,
            velocity: flat * speed,
            bank: 0.0,
            updraft: 0.0,
        }
    }

    /// Compass heading (radians, 0 = +Z, increasing toward +X).
    pub fn heading(&self) -> f32 {
        self.velocity.x.atan2(self.velocity.z)
    }

    pub fn airspeed(&self, config: &GliderConfig) -> f32 {
        (self.velocity - air_velocity(config, self.updraft)).length()
    }

    /// Height above the terrain directly below.
    pub fn clearance(&self, terrain: &dyn TerrainQuery) -> f32 {
        self.position.y - terrain.height_at(self.position.x, self.position.z)
    }

    /// Vertical air speed at the glider's position.
    pub fn ridge_updraft(&self, config: &GliderConfig, terrain: &dyn TerrainQuery) -> f32 {
        ridge_updraft(config, terrain, self.position)
    }

    /// Semi-implicit Euler step with lift, drag and ridge lift.
    pub fn integrate(
        &mut self,
        config: &GliderConfig,
        controls: GliderControls,
        terrain: &dyn TerrainQuery,
        dt: f32,
    ) -> GliderState {
        if !(dt.is_finite() && dt > 0.0) {
            return GliderState::Flying;
        }
        let controls = controls.clamped();

        let target_bank = controls.bank * config.max_bank;
        let max_change = config.bank_rate * dt;
        self.bank += (target_bank - self.bank).clamp(-max_change, max_change);

        self.updraft = ridge_updraft(config, terrain, self.position);
        let relative = self.velocity - air_velocity(config, self.updraft);
        let airspeed = relative.length();

        let mut force = config.gravity * config.mass;
        if airspeed > config.min_airspeed {
            let dir = relative / airspeed;
            let dynamic_pressure = 0.5 * config.air_density * airspeed * airspeed * config.wing_area;

            let lift_coefficient =
                (config.lift_coefficient + controls.climb * config.climb_authority).max(0.0);
            // Extra lift costs induced drag
            let drag_coefficient = config.drag_coefficient
                + 0.05 * (lift_coefficient - config.lift_coefficient).max(0.0);

            force -= dir * dynamic_pressure * drag_coefficient;
            force += lift_direction(dir, self.bank) * dynamic_pressure * lift_coefficient;
        }

        self.velocity += force / config.mass * dt;
        self.position += self.velocity * dt;

        let ground = terrain.height_at(self.position.x, self.position.z);
        let floor = ground + config.min_clearance;
        if self.position.y < floor {
            self.position.y = floor;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            return GliderState::Skimming { ground };
        }
        GliderState::Flying
    }
}

/// Air velocity: horizontal wind plus the local updraft.
fn air_velocity(config: &GliderConfig, updraft: f32) -> Vec3 {
    Vec3::new(config.wind.x, updraft, config.wind.z)
}

/// Updraft from wind blowing up a slope, fading with height above ground.
pub fn ridge_updraft(config: &GliderConfig, terrain: &dyn TerrainQuery, position: Vec3) -> f32 {
    let wind = Vec2::new(config.wind.x, config.wind.z);
    if wind == Vec2::ZERO || config.ridge_lift <= 0.0 {
        return 0.0;
    }
    let gradient = terrain.gradient_at(position.x, position.z, 1.0);
    let upslope = wind.dot(gradient).max(0.0);
    let above = (position.y - terrain.height_at(position.x, position.z)).max(0.0);
    let fade = (-above / config.ridge_height).exp();
    config.ridge_lift * upslope * fade
}

/// Unit vector perpendicular to `dir`, pointing up and rolled by `bank`.
fn lift_direction(dir: Vec3, bank: f32) -> Vec3 {
    let right = dir.cross(Vec3::Y);
    if right.length_squared() < 1e-8 {
        // Flying straight up or down: no meaningful lift plane
        return Vec3::ZERO;
    }
    let right = right.normalize();
    let up = right.cross(dir);
    up * bank.cos() + right * bank.sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(f32);

    impl TerrainQuery for Flat {
        fn height_at(&self, _x: f32, _z: f32) -> f32 {
            self.0
        }
    }

    /// Ramp rising toward +Z.
    struct Ramp(f32);

    impl TerrainQuery for Ramp {
        fn height_at(&self, _x: f32, z: f32) -> f32 {
            self.0 * z
        }
    }

    fn fly(
        glider: &mut Glider,
        config: &GliderConfig,
        controls: GliderControls,
        terrain: &dyn TerrainQuery,
        seconds: f32,
    ) {
        let dt = 1.0 / 60.0;
        let steps = (seconds / dt) as usize;
        for _ in 0..steps {
            glider.integrate(config, controls, terrain, dt);
            assert!(glider.position.is_finite() && glider.velocity.is_finite());
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(GliderConfig::default().validate().is_ok());
        let bad = GliderConfig {
            max_bank: 2.0,
            ..GliderConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_glides_forward_and_slowly_sinks() {
        let config = GliderConfig::calm();
        let mut glider = Glider::launch(Vec3::new(0.0, 500.0, 0.0), Vec3::Z, 12.0);
        fly(&mut glider, &config, GliderControls::default(), &Flat(0.0), 10.0);

        assert!(glider.position.z > 80.0, "z = {}", glider.position.z);
        assert!(glider.position.y < 500.0);
        assert!(glider.position.y > 450.0, "sank to {}", glider.position.y);
        let speed = glider.velocity.length();
        assert!((5.0..30.0).contains(&speed), "speed {speed}");
    }

    #[test]
    fn test_lift_direction_is_perpendicular() {
        let dir = Vec3::new(0.3, -0.1, 1.0).normalize();
        for bank in [-0.6, 0.0, 0.6] {
            let lift = lift_direction(dir, bank);
            assert!(lift.dot(dir).abs() < 1e-5);
            assert!((lift.length() - 1.0).abs() < 1e-5);
            assert!(lift.y > 0.0);
        }
        assert_eq!(lift_direction(Vec3::Y, 0.3), Vec3::ZERO);
    }

    #[test]
    fn test_bank_right_turns_right() {
        // Facing +Z with +Y up, right is -X
        let config = GliderConfig::calm();
        let mut glider = Glider::launch(Vec3::new(0.0, 500.0, 0.0), Vec3::Z, 13.0);
        let controls = GliderControls { bank: 1.0, climb: 0.0 };
        fly(&mut glider, &config, controls, &Flat(0.0), 3.0);

        assert!((glider.bank - config.max_bank).abs() < 1e-4);
        assert!(glider.velocity.x < -1.0, "vx = {}", glider.velocity.x);
        assert!(glider.heading() < 0.0);
    }

    #[test]
    fn test_bank_follows_rate_limit() {
        let config = GliderConfig::calm();
        let mut glider = Glider::launch(Vec3::new(0.0, 500.0, 0.0), Vec3::Z, 13.0);
        glider.integrate(&config, GliderControls { bank: -1.0, climb: 0.0 }, &Flat(0.0), 0.1);
        assert!((glider.bank + config.bank_rate * 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_ridge_lift_only_on_windward_slope() {
        let config = GliderConfig::default();
        let position = Vec3::new(0.0, 10.0, 0.0);
        // Wind along +Z, ramp rising toward +Z: windward
        assert!(ridge_updraft(&config, &Ramp(0.5), position) > 1.0);
        // Ramp falling toward +Z: lee side
        assert_eq!(ridge_updraft(&config, &Ramp(-0.5), position), 0.0);
        assert_eq!(ridge_updraft(&config, &Flat(0.0), position), 0.0);
    }

    #[test]
    fn test_ridge_lift_slows_sink() {
        let start = Vec3::new(0.0, 40.0, -100.0);
        let mut calm = Glider::launch(start, Vec3::X, 13.0);
        let mut windy = calm;
        let ramp = Ramp(0.3);

        let calm_config = GliderConfig {
            ridge_lift: 0.0,
            ..GliderConfig::default()
        };
        let windy_config = GliderConfig::default();

        fly(&mut calm, &calm_config, GliderControls::default(), &ramp, 4.0);
        fly(&mut windy, &windy_config, GliderControls::default(), &ramp, 4.0);
        assert!(windy.position.y > calm.position.y);
        assert!(windy.updraft > 0.0);
    }

    #[test]
    fn test_clearance_floor_holds() {
        let config = GliderConfig::calm();
        let mut glider = Glider::launch(Vec3::new(0.0, 6.0, 0.0), Vec3::Z, 13.0);
        glider.velocity.y = -10.0;
        let terrain = Flat(1.0);

        let dt = 1.0 / 60.0;
        let mut skimmed = false;
        for _ in 0..300 {
            let state = glider.integrate(&config, GliderControls { bank: 0.0, climb: -1.0 }, &terrain, dt);
            if let GliderState::Skimming { ground } = state {
                assert_eq!(ground, 1.0);
                skimmed = true;
            }
            assert!(glider.clearance(&terrain) >= config.min_clearance - 1e-4);
        }
        assert!(skimmed);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let config = GliderConfig::calm();
        let mut glider = Glider::launch(Vec3::new(0.0, 50.0, 0.0), Vec3::Z, 13.0);
        let before = glider;
        assert_eq!(
            glider.integrate(&config, GliderControls::default(), &Flat(0.0), f32::NAN),
            GliderState::Flying
        );
        assert_eq!(glider, before);
    }
}
