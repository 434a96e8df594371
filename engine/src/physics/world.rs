//! Physics World
//!
//! Thin wrapper around a rapier pipeline. Owns the body and collider sets, the
//! contact material table (installed as physics hooks) and the impact
//! collector (installed as event handler). Stepping is always one fixed
//! `dt`; frame-time accumulation lives in [`FixedStepper`].
//!
//! [`FixedStepper`]: super::stepper::FixedStepper

use glam::Vec3;
use rapier3d::parry::query::RayCast;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::events::{ImpactCollector, ImpactEvent};
use super::materials::{ContactMaterialTable, SurfaceMaterial};
use super::types::{from_vector, to_point, to_vector};
use crate::error::ConfigError;

/// World-wide simulation settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
    /// Fixed sub-step length (seconds)
    pub fixed_dt: f32,
    /// Upper bound on sub-steps per frame
    pub max_substeps: u32,
    /// Frame deltas are clamped to this before accumulation (seconds)
    pub max_frame_dt: f32,
    /// Typical object size, scales rapier's internal tolerances
    pub length_unit: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_dt: 1.0 / 120.0,
            max_substeps: 8,
            max_frame_dt: 0.1,
            length_unit: 0.1,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt <= self.max_frame_dt) {
            return Err(ConfigError::Invalid(format!(
                "fixed_dt {} must be positive and not exceed max_frame_dt {}",
                self.fixed_dt, self.max_frame_dt
            )));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".into()));
        }
        if self.length_unit <= 0.0 {
            return Err(ConfigError::Invalid("length_unit must be positive".into()));
        }
        Ok(())
    }
}

/// Dynamic ball description (marbles).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallParams {
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            radius: 0.025,
            mass: 0.02,
            linear_damping: 0.5,
            angular_damping: 1.0,
        }
    }
}

/// Snapshot of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub linvel: Vec3,
    pub angvel: Vec3,
}

impl BodyState {
    pub fn speed(&self) -> f32 {
        self.linvel.length()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.linvel.is_finite() && self.angvel.is_finite()
    }
}

/// rapier sets plus the pipeline that steps them.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
    materials: ContactMaterialTable,
    impacts: ImpactCollector,
}

impl PhysicsWorld {
    pub fn new(config: &PhysicsConfig, materials: ContactMaterialTable) -> Self {
        let mut integration_parameters = IntegrationParameters {
            dt: config.fixed_dt,
            length_unit: config.length_unit,
            ..IntegrationParameters::default()
        };
        if let Some(solver) = materials.solver_settings() {
            integration_parameters.contact_natural_frequency = solver.stiffness;
            integration_parameters.contact_damping_ratio = solver.relaxation;
        }

        Self {
            gravity: to_vector(config.gravity),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            materials,
            impacts: ImpactCollector::new(),
        }
    }

    pub fn materials(&self) -> &ContactMaterialTable {
        &self.materials
    }

    pub fn fixed_dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Advance the simulation by one fixed `dt`.
    pub fn step_fixed(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &self.materials,
            &self.impacts,
        );
    }

    /// Insert a parentless (static) collider.
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.colliders.insert(collider)
    }

    /// Spawn a dynamic ball tagged as [`SurfaceMaterial::Marble`].
    pub fn add_ball(&mut self, position: Vec3, velocity: Vec3, params: &BallParams) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .linvel(to_vector(velocity))
            .linear_damping(params.linear_damping)
            .angular_damping(params.angular_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::ball(params.radius)
            .mass(params.mass)
            .user_data(SurfaceMaterial::Marble.to_user_data())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        self.bodies.get(handle).map(|body| BodyState {
            position: from_vector(body.translation()),
            linvel: from_vector(body.linvel()),
            angvel: from_vector(body.angvel()),
        })
    }

    /// Overwrite linear velocity without waking a sleeping body.
    pub fn set_linvel(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            if body.is_dynamic() {
                body.set_linvel(to_vector(velocity), false);
            }
        }
    }

    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(|b| b.is_sleeping())
    }

    pub fn dynamic_bodies(&self) -> Vec<RigidBodyHandle> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Impacts collected since the last drain.
    pub fn drain_impacts(&mut self) -> Vec<ImpactEvent> {
        self.impacts.drain()
    }

    /// Height where a vertical ray from `from_y` hits one collider.
    pub fn cast_down_on(&self, collider: ColliderHandle, x: f32, z: f32, from_y: f32) -> Option<f32> {
        let co = self.colliders.get(collider)?;
        let ray = Ray::new(to_point(Vec3::new(x, from_y, z)), vector![0.0, -1.0, 0.0]);
        co.shape()
            .cast_ray(co.position(), &ray, Real::MAX, true)
            .map(|toi| from_y - toi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default(), ContactMaterialTable::marble_defaults())
    }

    #[test]
    fn test_config_validation() {
        assert!(PhysicsConfig::default().validate().is_ok());
        let bad = PhysicsConfig {
            fixed_dt: 0.5,
            ..PhysicsConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_ball_falls_under_gravity() {
        let mut world = world();
        let ball = world.add_ball(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, &BallParams::default());
        for _ in 0..30 {
            world.step_fixed();
        }
        let state = world.body_state(ball).unwrap();
        assert!(state.position.y < 1.0);
        assert!(state.linvel.y < 0.0);
        assert!(state.is_finite());
    }

    #[test]
    fn test_ball_rests_on_ground_plane() {
        let mut world = world();
        world.add_static_collider(
            ColliderBuilder::halfspace(Vector::y_axis())
                .user_data(SurfaceMaterial::GroundPlane.to_user_data())
                .build(),
        );
        let params = BallParams::default();
        let ball = world.add_ball(Vec3::new(0.0, 0.2, 0.0), Vec3::ZERO, &params);
        for _ in 0..600 {
            world.step_fixed();
        }
        let state = world.body_state(ball).unwrap();
        assert!((state.position.y - params.radius).abs() < 0.01);
        assert!(state.speed() < 0.05);

        let impacts = world.drain_impacts();
        assert!(!impacts.is_empty());
        assert_eq!(impacts[0].surface, SurfaceMaterial::GroundPlane);
        assert!(impacts[0].normal_speed > 0.5);
    }

    #[test]
    fn test_remove_body() {
        let mut world = world();
        let ball = world.add_ball(Vec3::ZERO, Vec3::ZERO, &BallParams::default());
        assert_eq!(world.dynamic_bodies(), vec![ball]);
        assert!(world.remove_body(ball));
        assert!(world.body_state(ball).is_none());
        assert!(!world.remove_body(ball));
    }
}
