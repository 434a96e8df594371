//! Marble Toss Game
//!
//! Wires the pieces together: synthesized terrain and its mesh, the bridge
//! colliders, the rapier world, the post-processor, the launcher and the
//! per-marble rest tracking.
//!
//! One call to [`MarbleGame::tick`] per animation frame. The frame delta is
//! clamped, turned into fixed sub-steps, and every sub-step runs
//! physics -> impacts -> post-processing -> rest detection.

use glam::{Vec2, Vec3};
use rapier3d::prelude::RigidBodyHandle;

use super::launcher::Launcher;
use super::scoring::MarbleOutcome;
use crate::error::EngineError;
use crate::game::config::MarbleConfig;
use crate::game::controls::DemoControls;
use crate::physics::{
    BodyState, BodyStats, DynamicsPostProcessor, FixedStepper, FrameClock, PhysicsWorld,
    TerrainColliders, TerrainPhysicsBridge,
};
use crate::physics::types::horizontal;
use crate::telemetry::{LogTelemetry, Telemetry, TelemetryEvent};
use crate::terrain::{
    HeightField, HeightSynthesizer, PlacementReport, TargetZone, TerrainMesh, place_features_seeded,
};

/// Below the ground plane by this much a marble counts as lost.
const LOST_DEPTH: f32 = 1.0;

/// One thrown (or dropped) marble.
#[derive(Debug, Clone)]
pub struct Marble {
    pub id: u32,
    pub handle: RigidBodyHandle,
    /// Game time of the throw (seconds)
    pub spawned_at: f32,
    still_steps: u32,
    pub outcome: Option<MarbleOutcome>,
    /// Post-processor counters, kept once the marble settles
    pub stats: Option<BodyStats>,
}

impl Marble {
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }
}

pub struct MarbleGame<T: Telemetry = LogTelemetry> {
    config: MarbleConfig,
    zone: TargetZone,
    synth: HeightSynthesizer,
    /// Summed feature heights, drives the render mesh
    field: HeightField,
    /// Tallest feature wins, drives the colliders and post-processing
    collision_field: HeightField,
    mesh: TerrainMesh,
    placement: PlacementReport,
    world: PhysicsWorld,
    colliders: TerrainColliders,
    post: DynamicsPostProcessor,
    clock: FrameClock,
    stepper: FixedStepper,
    launcher: Launcher,
    marbles: Vec<Marble>,
    next_id: u32,
    elapsed: f32,
    total_score: u32,
    telemetry: T,
}

impl MarbleGame<LogTelemetry> {
    /// Build with log-backed telemetry.
    pub fn with_log(config: MarbleConfig) -> Result<Self, EngineError> {
        Self::new(config, LogTelemetry)
    }
}

impl<T: Telemetry> MarbleGame<T> {
    pub fn new(config: MarbleConfig, mut telemetry: T) -> Result<Self, EngineError> {
        config.validate()?;

        let placement = place_features_seeded(&config.placement);
        placement.report_to(&mut telemetry);

        let synth = HeightSynthesizer::new(config.terrain, placement.features.clone());
        let grid = config.grid.grid();
        let field = synth.build_heightfield(&grid);
        let mesh = TerrainMesh::from_heightfield(&field);
        let collision_field = synth.build_collision_heightfield(&grid);

        let mut world = PhysicsWorld::new(&config.physics, config.contacts.table());
        let colliders = TerrainPhysicsBridge::new(config.bridge).build(
            &mut world,
            &collision_field,
            synth.features(),
            &mut telemetry,
        );

        let mut launcher = Launcher::new(config.launcher);
        launcher.keep_clear(&synth);

        log::info!(
            "marble toss ready: {}x{} grid, {} features, {} feature colliders",
            grid.cols,
            grid.rows,
            placement.features.len(),
            colliders.features.len()
        );

        Ok(Self {
            zone: config.target_zone(),
            clock: FrameClock::new(config.physics.max_frame_dt),
            stepper: FixedStepper::from_config(&config.physics),
            post: DynamicsPostProcessor::new(config.post_process),
            config,
            synth,
            field,
            collision_field,
            mesh,
            placement,
            world,
            colliders,
            launcher,
            marbles: Vec::new(),
            next_id: 0,
            elapsed: 0.0,
            total_score: 0,
            telemetry,
        })
    }

    pub fn config(&self) -> &MarbleConfig {
        &self.config
    }

    pub fn synthesizer(&self) -> &HeightSynthesizer {
        &self.synth
    }

    pub fn heightfield(&self) -> &HeightField {
        &self.field
    }

    /// The field the colliders and the post-processor were built from.
    pub fn collision_field(&self) -> &HeightField {
        &self.collision_field
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn placement(&self) -> &PlacementReport {
        &self.placement
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn colliders(&self) -> &TerrainColliders {
        &self.colliders
    }

    pub fn post_processor(&self) -> &DynamicsPostProcessor {
        &self.post
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn marbles(&self) -> &[Marble] {
        &self.marbles
    }

    pub fn marble(&self, id: u32) -> Option<&Marble> {
        self.marbles.iter().find(|m| m.id == id)
    }

    pub fn marble_state(&self, id: u32) -> Option<BodyState> {
        self.marble(id).and_then(|m| self.world.body_state(m.handle))
    }

    /// Game time (seconds of simulated physics).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn all_settled(&self) -> bool {
        self.marbles.iter().all(Marble::is_settled)
    }

    /// Advance by a raw frame delta (seconds). Returns the sub-steps run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let dt = self.clock.clamp(dt);
        self.launcher.update(dt);
        let steps = self.stepper.advance(dt);
        for _ in 0..steps {
            self.step_fixed();
        }
        steps
    }

    /// Advance using an animation-frame timestamp (seconds).
    pub fn tick_at(&mut self, timestamp_seconds: f64) -> u32 {
        let dt = self.clock.tick(timestamp_seconds);
        self.tick(dt)
    }

    /// One fixed sub-step.
    pub fn step_fixed(&mut self) {
        let dt = self.world.fixed_dt();
        self.world.step_fixed();

        for impact in self.world.drain_impacts() {
            self.post.record_impact(&impact);
            self.telemetry.record(TelemetryEvent::Impact(impact));
        }

        self.post.apply(&mut self.world, &self.collision_field, dt);
        self.elapsed += dt;
        self.update_rest();
    }

    /// Spawn a marble at `position` with `velocity`; returns its id.
    pub fn spawn_marble(&mut self, position: Vec3, velocity: Vec3) -> u32 {
        let handle = self.world.add_ball(position, velocity, &self.config.ball);
        self.post.track(handle, self.config.ball.radius);

        let id = self.next_id;
        self.next_id += 1;
        self.marbles.push(Marble {
            id,
            handle,
            spawned_at: self.elapsed,
            still_steps: 0,
            outcome: None,
            stats: None,
        });
        log::debug!(
            "marble {id} at ({:.2}, {:.2}, {:.2}) speed {:.2}",
            position.x,
            position.y,
            position.z,
            velocity.length()
        );
        id
    }

    /// Drop a marble from rest.
    pub fn drop_marble(&mut self, position: Vec3) -> u32 {
        self.spawn_marble(position, Vec3::ZERO)
    }

    /// Release the launcher; `None` if it was not charging.
    pub fn throw(&mut self) -> Option<u32> {
        let launch = self.launcher.release()?;
        Some(self.spawn_marble(launch.position, launch.velocity))
    }

    /// Remove every marble and zero the score.
    pub fn clear_marbles(&mut self) {
        for marble in self.marbles.drain(..) {
            self.post.untrack(marble.handle);
            self.world.remove_body(marble.handle);
        }
        self.total_score = 0;
    }

    fn update_rest(&mut self) {
        let rest_speed = self.config.rest_speed;
        let rest_frames = self.config.rest_frames;
        let lost_below = self.colliders.ground_height - LOST_DEPTH;

        for marble in self.marbles.iter_mut().filter(|m| !m.is_settled()) {
            let Some(state) = self.world.body_state(marble.handle) else {
                continue;
            };
            if state.speed() < rest_speed || self.world.is_sleeping(marble.handle) {
                marble.still_steps += 1;
            } else {
                marble.still_steps = 0;
            }

            let age = self.elapsed - marble.spawned_at;
            let rested = marble.still_steps >= rest_frames;
            let timed_out = age >= self.config.max_roll_time;
            let lost = !state.is_finite() || state.position.y < lost_below;
            if !(rested || timed_out || lost) {
                continue;
            }

            let rest_point = if lost {
                Vec2::splat(f32::INFINITY)
            } else {
                horizontal(state.position)
            };
            let outcome = MarbleOutcome::evaluate(
                &self.zone,
                &self.config.scoring,
                rest_point,
                timed_out && !rested,
                age,
            );
            marble.outcome = Some(outcome);
            marble.stats = self.post.untrack(marble.handle);
            self.total_score += outcome.score;
            self.telemetry.record(TelemetryEvent::MarbleSettled {
                marble: marble.id,
                distance_to_target: outcome.distance,
                score: outcome.score,
            });
        }
    }
}

impl<T: Telemetry> DemoControls for MarbleGame<T> {
    fn move_left(&mut self) {
        self.launcher.move_left(&self.synth);
    }

    fn move_right(&mut self) {
        self.launcher.move_right(&self.synth);
    }

    fn increase_height(&mut self) {
        self.launcher.raise(&self.synth);
    }

    fn decrease_height(&mut self) {
        self.launcher.lower(&self.synth);
    }

    fn start_charging(&mut self) {
        self.launcher.start_charging();
    }

    fn throw_marble(&mut self) {
        self.throw();
    }

    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.synth.height_at(x, z)
    }

    fn reset(&mut self) {
        self.clear_marbles();
        self.launcher.reset();
        self.launcher.keep_clear(&self.synth);
    }
}
