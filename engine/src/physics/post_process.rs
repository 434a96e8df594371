//! Dynamics Post-Processor
//!
//! Velocity shaping applied to tracked marbles after every fixed sub-step.
//! It only adjusts velocities the solver already produced; contacts stay the
//! solver's job.
//!
//! Per body near the surface:
//! 1. Look ahead along the horizontal velocity. Uphill beyond
//!    `uphill_epsilon` scales horizontal velocity by
//!    `clamp(1 - slope * uphill_damping, min_uphill_factor, 1)`, and a body
//!    with almost no vertical speed gets `delta * step_nudge` upward.
//! 2. Horizontal velocity always loses `rolling_resistance`.
//! 3. Below `settle_speed`, the 4-point terrain gradient adds
//!    `-gradient * settle_strength * dt` (settling roll).
//!
//! Per-body statistics live in a side table keyed by rigid body handle.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::events::ImpactEvent;
use super::materials::SurfaceMaterial;
use super::types::horizontal;
use super::world::PhysicsWorld;
use crate::error::ConfigError;
use crate::terrain::TerrainQuery;

/// Tuning for the velocity shaping heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Max gap between body bottom and terrain to count as touching
    pub contact_threshold: f32,
    /// How far ahead the uphill check looks
    pub lookahead_distance: f32,
    pub uphill_epsilon: f32,
    pub uphill_damping: f32,
    pub min_uphill_factor: f32,
    pub vertical_rest_speed: f32,
    pub nudge_min_speed: f32,
    pub step_nudge: f32,
    /// Fraction of horizontal velocity removed per step
    pub rolling_resistance: f32,
    pub settle_speed: f32,
    pub gradient_epsilon: f32,
    pub settle_strength: f32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            contact_threshold: 0.01,
            lookahead_distance: 0.03,
            uphill_epsilon: 0.0005,
            uphill_damping: 0.5,
            min_uphill_factor: 0.6,
            vertical_rest_speed: 0.05,
            nudge_min_speed: 0.1,
            step_nudge: 5.0,
            rolling_resistance: 0.002,
            settle_speed: 0.05,
            gradient_epsilon: 0.01,
            settle_strength: 1.5,
        }
    }
}

impl PostProcessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.rolling_resistance) {
            return Err(ConfigError::Invalid(format!(
                "rolling_resistance must be in [0, 1), got {}",
                self.rolling_resistance
            )));
        }
        if !(0.0..=1.0).contains(&self.min_uphill_factor) {
            return Err(ConfigError::Invalid(format!(
                "min_uphill_factor must be in [0, 1], got {}",
                self.min_uphill_factor
            )));
        }
        if self.lookahead_distance <= 0.0 || self.gradient_epsilon <= 0.0 {
            return Err(ConfigError::Invalid(
                "lookahead_distance and gradient_epsilon must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// What the post-processor needs to know about one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySample {
    pub position: Vec3,
    pub linvel: Vec3,
    pub radius: f32,
}

/// Outcome of [`compute_correction`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    pub velocity: Vec3,
    pub near_surface: bool,
    pub uphill: bool,
    pub nudged: bool,
    /// Horizontal velocity added by settling roll
    pub settle: Vec2,
}

impl Correction {
    fn untouched(velocity: Vec3) -> Self {
        Self {
            velocity,
            near_surface: false,
            uphill: false,
            nudged: false,
            settle: Vec2::ZERO,
        }
    }
}

/// Corrected velocity for one body. Pure; no physics world involved.
pub fn compute_correction(
    config: &PostProcessConfig,
    body: &BodySample,
    terrain: &dyn TerrainQuery,
    dt: f32,
) -> Correction {
    let (x, z) = (body.position.x, body.position.z);
    let ground = terrain.height_at(x, z);
    let gap = body.position.y - body.radius - ground;
    if gap > config.contact_threshold {
        return Correction::untouched(body.linvel);
    }

    let mut result = Correction::untouched(body.linvel);
    result.near_surface = true;
    let mut flat = horizontal(body.linvel);
    let mut vy = body.linvel.y;

    let speed = flat.length();
    if speed > 1e-6 {
        let ahead = Vec2::new(x, z) + flat / speed * config.lookahead_distance;
        let delta = terrain.height_at(ahead.x, ahead.y) - ground;
        if delta > config.uphill_epsilon {
            let slope = delta / config.lookahead_distance;
            let factor = (1.0 - slope * config.uphill_damping).clamp(config.min_uphill_factor, 1.0);
            flat *= factor;
            result.uphill = true;

            if vy.abs() < config.vertical_rest_speed && speed > config.nudge_min_speed {
                vy += delta * config.step_nudge;
                result.nudged = true;
            }
        }
    }

    flat *= 1.0 - config.rolling_resistance;

    if Vec3::new(flat.x, vy, flat.y).length() < config.settle_speed {
        let gradient = terrain.gradient_at(x, z, config.gradient_epsilon);
        let push = -gradient * config.settle_strength * dt;
        flat += push;
        result.settle = push;
    }

    result.velocity = Vec3::new(flat.x, vy, flat.y);
    result
}

/// Per-body counters, keyed by handle in the post-processor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyStats {
    pub radius: f32,
    pub steps_in_contact: u32,
    pub uphill_steps: u32,
    pub nudges: u32,
    pub settle_steps: u32,
    pub impacts: u32,
    pub obstacle_hits: u32,
    pub strongest_impact: f32,
}

/// Applies [`compute_correction`] to every tracked body after a sub-step.
#[derive(Clone, Debug, Default)]
pub struct DynamicsPostProcessor {
    config: PostProcessConfig,
    stats: HashMap<RigidBodyHandle, BodyStats>,
}

impl DynamicsPostProcessor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self {
            config,
            stats: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    pub fn track(&mut self, handle: RigidBodyHandle, radius: f32) {
        self.stats.insert(
            handle,
            BodyStats {
                radius,
                ..BodyStats::default()
            },
        );
    }

    pub fn untrack(&mut self, handle: RigidBodyHandle) -> Option<BodyStats> {
        self.stats.remove(&handle)
    }

    pub fn stats(&self, handle: RigidBodyHandle) -> Option<&BodyStats> {
        self.stats.get(&handle)
    }

    pub fn tracked(&self) -> usize {
        self.stats.len()
    }

    /// Count an impact against the body's stats.
    pub fn record_impact(&mut self, impact: &ImpactEvent) {
        if let Some(stats) = self.stats.get_mut(&impact.body) {
            stats.impacts += 1;
            if matches!(impact.surface, SurfaceMaterial::Rock | SurfaceMaterial::Hill) {
                stats.obstacle_hits += 1;
            }
            stats.strongest_impact = stats.strongest_impact.max(impact.normal_speed);
        }
    }

    /// Correct every tracked, awake body. Returns how many were touched.
    pub fn apply(&mut self, world: &mut PhysicsWorld, terrain: &dyn TerrainQuery, dt: f32) -> usize {
        let mut corrected = 0;
        for (&handle, stats) in self.stats.iter_mut() {
            if world.is_sleeping(handle) {
                continue;
            }
            let Some(state) = world.body_state(handle) else {
                continue;
            };
            let sample = BodySample {
                position: state.position,
                linvel: state.linvel,
                radius: stats.radius,
            };
            let correction = compute_correction(&self.config, &sample, terrain, dt);
            if !correction.near_surface {
                continue;
            }

            stats.steps_in_contact += 1;
            stats.uphill_steps += correction.uphill as u32;
            stats.nudges += correction.nudged as u32;
            stats.settle_steps += (correction.settle != Vec2::ZERO) as u32;

            if correction.velocity.is_finite() {
                world.set_linvel(handle, correction.velocity);
                corrected += 1;
            }
        }
        corrected
    }
}
