//! Condor Sketch
//!
//! Terrain around a single peak plus one glider. Controls trim the glider:
//! left/right step the bank input, height steps the climb input, and the
//! charge key levels out.

use glam::{Vec2, Vec3};

use crate::error::EngineError;
use crate::game::config::CondorConfig;
use crate::game::controls::DemoControls;
use crate::physics::{FixedStepper, FrameClock, Glider, GliderControls, GliderState};
use crate::telemetry::Telemetry;
use crate::terrain::{HeightField, HeightSynthesizer, HeightmapSeed, TerrainMesh, TerrainQuery};

/// Input change per control press.
const TRIM_STEP: f32 = 0.25;

pub struct CondorSketch {
    config: CondorConfig,
    synth: HeightSynthesizer,
    field: HeightField,
    mesh: TerrainMesh,
    glider: Glider,
    controls: GliderControls,
    clock: FrameClock,
    stepper: FixedStepper,
    elapsed: f32,
    skim_steps: u32,
    min_clearance_seen: f32,
}

impl CondorSketch {
    /// Build the sketch, loading `config.heightmap` if set. A heightmap that
    /// fails to load is reported and the terrain stays procedural.
    pub fn new(config: CondorConfig, telemetry: &mut dyn Telemetry) -> Result<Self, EngineError> {
        config.validate()?;
        let extent = Vec2::splat(config.grid.size);
        let seed = config
            .heightmap
            .as_deref()
            .and_then(|path| HeightmapSeed::load_or_report(path, extent, telemetry));
        Self::with_seed(config, seed)
    }

    /// Build with an already decoded heightmap (or none).
    pub fn with_seed(config: CondorConfig, seed: Option<HeightmapSeed>) -> Result<Self, EngineError> {
        config.validate()?;

        let synth = HeightSynthesizer::new(config.terrain, Vec::new()).with_heightmap(seed);
        let field = synth.build_heightfield(&config.grid.grid());
        let mesh = TerrainMesh::from_heightfield(&field);
        let glider = Self::launch(&config, &field);

        log::info!(
            "condor sketch ready: peak {:.1} m, heightmap {}",
            field.max_height(),
            if synth.has_heightmap() { "on" } else { "off" }
        );

        Ok(Self {
            clock: FrameClock::new(config.max_frame_dt),
            stepper: FixedStepper::new(config.fixed_dt, config.max_substeps),
            config,
            synth,
            field,
            mesh,
            glider,
            controls: GliderControls::default(),
            elapsed: 0.0,
            skim_steps: 0,
            min_clearance_seen: f32::INFINITY,
        })
    }

    fn launch(config: &CondorConfig, field: &HeightField) -> Glider {
        let mut start = config.start_position;
        let floor = field.height_at(start.x, start.z) + config.glider.min_clearance;
        start.y = start.y.max(floor);
        Glider::launch(start, config.start_heading, config.start_speed)
    }

    pub fn config(&self) -> &CondorConfig {
        &self.config
    }

    pub fn synthesizer(&self) -> &HeightSynthesizer {
        &self.synth
    }

    pub fn heightfield(&self) -> &HeightField {
        &self.field
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn glider(&self) -> &Glider {
        &self.glider
    }

    pub fn controls(&self) -> GliderControls {
        self.controls
    }

    /// Replace the control inputs (e.g. from held keys).
    pub fn set_controls(&mut self, controls: GliderControls) {
        self.controls = controls.clamped();
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Sub-steps spent held up by the clearance floor.
    pub fn skim_steps(&self) -> u32 {
        self.skim_steps
    }

    /// Lowest height above terrain seen so far.
    pub fn min_clearance_seen(&self) -> f32 {
        self.min_clearance_seen
    }

    pub fn tick(&mut self, dt: f32) -> u32 {
        let dt = self.clock.clamp(dt);
        let steps = self.stepper.advance(dt);
        for _ in 0..steps {
            self.step_fixed();
        }
        steps
    }

    pub fn tick_at(&mut self, timestamp_seconds: f64) -> u32 {
        let dt = self.clock.tick(timestamp_seconds);
        self.tick(dt)
    }

    pub fn step_fixed(&mut self) {
        let dt = self.config.fixed_dt;
        let state = self
            .glider
            .integrate(&self.config.glider, self.controls, &self.field, dt);
        if let GliderState::Skimming { .. } = state {
            self.skim_steps += 1;
        }
        self.keep_in_bounds();
        self.elapsed += dt;
        self.min_clearance_seen = self.min_clearance_seen.min(self.glider.clearance(&self.field));
    }

    /// Turn the glider back at the edge of the terrain.
    fn keep_in_bounds(&mut self) {
        let grid = self.field.grid();
        let p = Vec2::new(self.glider.position.x, self.glider.position.z);
        if grid.contains(p.x, p.y) {
            return;
        }
        let clamped = grid.clamp_to_bounds(p);
        if clamped.x != p.x {
            self.glider.velocity.x = -self.glider.velocity.x;
        }
        if clamped.y != p.y {
            self.glider.velocity.z = -self.glider.velocity.z;
        }
        self.glider.position.x = clamped.x;
        self.glider.position.z = clamped.y;
        let floor = self.field.height_at(clamped.x, clamped.y) + self.config.glider.min_clearance;
        self.glider.position.y = self.glider.position.y.max(floor);
        log::debug!("condor turned back at ({:.1}, {:.1})", clamped.x, clamped.y);
    }

    /// Back to the launch point with centered controls.
    pub fn relaunch(&mut self) {
        self.glider = Self::launch(&self.config, &self.field);
        self.controls = GliderControls::default();
        self.skim_steps = 0;
        self.min_clearance_seen = f32::INFINITY;
    }

    fn trim(&mut self, bank: f32, climb: f32) {
        self.set_controls(GliderControls {
            bank: self.controls.bank + bank,
            climb: self.controls.climb + climb,
        });
    }

    pub fn position(&self) -> Vec3 {
        self.glider.position
    }
}

impl DemoControls for CondorSketch {
    fn move_left(&mut self) {
        self.trim(-TRIM_STEP, 0.0);
    }

    fn move_right(&mut self) {
        self.trim(TRIM_STEP, 0.0);
    }

    fn increase_height(&mut self) {
        self.trim(0.0, TRIM_STEP);
    }

    fn decrease_height(&mut self) {
        self.trim(0.0, -TRIM_STEP);
    }

    /// Level the wings and center the climb input.
    fn start_charging(&mut self) {
        self.controls = GliderControls::default();
    }

    fn throw_marble(&mut self) {}

    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.synth.height_at(x, z)
    }

    fn reset(&mut self) {
        self.relaunch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{RecordingTelemetry, TelemetryEvent};

    fn small_config() -> CondorConfig {
        let mut config = CondorConfig::default();
        config.grid.resolution = 65;
        config
    }

    #[test]
    fn test_peak_is_highest_near_center() {
        let sketch = CondorSketch::with_seed(small_config(), None).unwrap();
        let center = sketch.height_at(0.0, 0.0);
        assert!(center > 45.0, "center {center}");
        assert!(sketch.height_at(180.0, 180.0) < center - 30.0);
    }

    #[test]
    fn test_missing_heightmap_falls_back() {
        let mut config = small_config();
        config.heightmap = Some("does/not/exist.png".into());
        let mut telemetry = RecordingTelemetry::new();
        let sketch = CondorSketch::new(config, &mut telemetry).unwrap();
        assert!(!sketch.synthesizer().has_heightmap());
        assert!(matches!(telemetry.events[0], TelemetryEvent::HeightmapFallback(_)));
    }

    #[test]
    fn test_zero_grid_size_is_a_config_error() {
        let mut config = small_config();
        config.grid.size = 0.0;
        config.heightmap = Some("does/not/exist.png".into());
        let mut telemetry = RecordingTelemetry::new();
        let result = CondorSketch::new(config, &mut telemetry);
        assert!(matches!(result, Err(EngineError::Config(_))));
        assert!(telemetry.events.is_empty(), "nothing is loaded for an invalid config");
    }

    #[test]
    fn test_flight_stays_above_floor() {
        let mut sketch = CondorSketch::with_seed(small_config(), None).unwrap();
        for _ in 0..600 {
            sketch.tick(1.0 / 60.0);
            assert!(sketch.position().is_finite());
        }
        assert!(sketch.elapsed() > 9.0);
        let floor = sketch.config().glider.min_clearance;
        assert!(sketch.min_clearance_seen() >= floor - 1e-3);
        let half = sketch.config().grid.size / 2.0;
        assert!(sketch.position().x.abs() <= half + 1e-3);
        assert!(sketch.position().z.abs() <= half + 1e-3);
    }

    #[test]
    fn test_trim_controls() {
        let mut sketch = CondorSketch::with_seed(small_config(), None).unwrap();
        for _ in 0..10 {
            sketch.move_right();
        }
        sketch.increase_height();
        assert_eq!(sketch.controls().bank, 1.0);
        assert_eq!(sketch.controls().climb, 0.25);
        sketch.start_charging();
        assert_eq!(sketch.controls(), GliderControls::default());
    }

    #[test]
    fn test_relaunch() {
        let mut sketch = CondorSketch::with_seed(small_config(), None).unwrap();
        let start = sketch.position();
        sketch.tick(0.1);
        assert_ne!(sketch.position(), start);
        sketch.reset();
        assert_eq!(sketch.position(), start);
    }
}
