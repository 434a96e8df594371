//! Marble Launcher
//!
//! Slides along X at a fixed Z, moves up and down, and throws toward the
//! target with a fixed elevation. Throw speed comes from a charge meter that
//! fills while the throw key is held.

use glam::{Vec2, Vec3};

use crate::game::config::LauncherConfig;
use crate::terrain::TerrainQuery;

/// Position and initial velocity of a throw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    config: LauncherConfig,
    pub position: Vec3,
    charging: bool,
    power: f32,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            position: config.position,
            charging: false,
            power: config.min_power,
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Current throw speed (m/s).
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Charge as a fraction of the meter, for the UI.
    pub fn charge_fraction(&self) -> f32 {
        let range = self.config.max_power - self.config.min_power;
        if range <= 0.0 {
            return 1.0;
        }
        ((self.power - self.config.min_power) / range).clamp(0.0, 1.0)
    }

    pub fn move_left(&mut self, terrain: &dyn TerrainQuery) {
        self.position.x = (self.position.x - self.config.lateral_step).max(-self.config.lateral_limit);
        self.keep_clear(terrain);
    }

    pub fn move_right(&mut self, terrain: &dyn TerrainQuery) {
        self.position.x = (self.position.x + self.config.lateral_step).min(self.config.lateral_limit);
        self.keep_clear(terrain);
    }

    pub fn raise(&mut self, terrain: &dyn TerrainQuery) {
        self.position.y = (self.position.y + self.config.height_step).min(self.config.max_height);
        self.keep_clear(terrain);
    }

    pub fn lower(&mut self, terrain: &dyn TerrainQuery) {
        self.position.y -= self.config.height_step;
        self.keep_clear(terrain);
    }

    /// Never sit closer than `min_clearance` to the terrain below.
    pub fn keep_clear(&mut self, terrain: &dyn TerrainQuery) {
        let floor = terrain.height_at(self.position.x, self.position.z) + self.config.min_clearance;
        self.position.y = self.position.y.max(floor);
    }

    pub fn start_charging(&mut self) {
        self.charging = true;
        self.power = self.config.min_power;
    }

    /// Grow the charge while held.
    pub fn update(&mut self, dt: f32) {
        if self.charging {
            self.power = (self.power + self.config.charge_rate * dt).min(self.config.max_power);
        }
    }

    /// Horizontal aim toward the target, tilted up by the launch angle.
    pub fn direction(&self) -> Vec3 {
        let to_target = self.config.aim_at - Vec2::new(self.position.x, self.position.z);
        let flat = to_target.normalize_or(Vec2::new(0.0, -1.0));
        let (sin, cos) = self.config.launch_angle.sin_cos();
        Vec3::new(flat.x * cos, sin, flat.y * cos)
    }

    /// Finish charging and hand out the throw. `None` if not charging.
    pub fn release(&mut self) -> Option<Launch> {
        if !self.charging {
            return None;
        }
        self.charging = false;
        let launch = Launch {
            position: self.position,
            velocity: self.direction() * self.power,
        };
        self.power = self.config.min_power;
        Some(launch)
    }

    /// Back to the configured start.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
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

    #[test]
    fn test_charge_caps_at_max_power() {
        let mut launcher = Launcher::new(LauncherConfig::default());
        assert!(launcher.release().is_none());

        launcher.start_charging();
        launcher.update(0.5);
        assert!((launcher.power() - 2.0).abs() < 1e-5);
        launcher.update(10.0);
        assert_eq!(launcher.power(), launcher.config().max_power);
        assert_eq!(launcher.charge_fraction(), 1.0);

        let launch = launcher.release().unwrap();
        assert!((launch.velocity.length() - 5.0).abs() < 1e-4);
        assert!(!launcher.is_charging());
        assert_eq!(launcher.power(), launcher.config().min_power);
    }

    #[test]
    fn test_update_without_charging_does_nothing() {
        let mut launcher = Launcher::new(LauncherConfig::default());
        launcher.update(1.0);
        assert_eq!(launcher.power(), launcher.config().min_power);
    }

    #[test]
    fn test_aims_at_target() {
        let launcher = Launcher::new(LauncherConfig::default());
        let dir = launcher.direction();
        // Launcher sits on +Z, target at the origin
        assert!(dir.z < 0.0);
        assert!(dir.x.abs() < 1e-6);
        assert!((dir.y - 0.5_f32.sin()).abs() < 1e-6);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_lateral_limit() {
        let terrain = Flat(0.0);
        let mut launcher = Launcher::new(LauncherConfig::default());
        for _ in 0..100 {
            launcher.move_left(&terrain);
        }
        assert_eq!(launcher.position.x, -launcher.config().lateral_limit);
        launcher.move_right(&terrain);
        assert!(launcher.position.x > -launcher.config().lateral_limit);
    }

    #[test]
    fn test_height_stays_above_terrain() {
        let terrain = Flat(0.3);
        let mut launcher = Launcher::new(LauncherConfig::default());
        for _ in 0..100 {
            launcher.lower(&terrain);
        }
        assert!((launcher.position.y - 0.4).abs() < 1e-5);
        for _ in 0..100 {
            launcher.raise(&terrain);
        }
        assert_eq!(launcher.position.y, launcher.config().max_height);
    }
}
