//! Browser Surface
//!
//! `wasm-bindgen` handles the page script drives: feed key events, call
//! `tick` from `requestAnimationFrame`, read back vertex heights and body
//! positions for the renderer. Construction failures end up in a static DOM
//! error panel via [`show_fatal_error`].

use wasm_bindgen::prelude::*;

use crate::error::EngineError;
use crate::game::{CondorConfig, CondorSketch, DemoControls, MarbleConfig, MarbleGame, apply_action};
use crate::input::{ControlAction, InputState};
use crate::physics::GliderControls;
use crate::telemetry::{LogTelemetry, Telemetry, TelemetryEvent};
use crate::terrain::TerrainMesh;

/// `log` backend writing to the browser console.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Panic hook plus console logging. Safe to call more than once.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Replace the page body with an error message and an optional reload button.
#[wasm_bindgen]
pub fn show_fatal_error(message: &str, retry: bool) {
    log::error!("{message}");
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };

    let build = || -> Result<web_sys::Element, JsValue> {
        let panel = document.create_element("div")?;
        panel.set_attribute("class", "fatal-error")?;
        panel.set_attribute("role", "alert")?;

        let text = document.create_element("p")?;
        text.set_text_content(Some(message));
        panel.append_child(&text)?;

        if retry {
            let button = document.create_element("button")?;
            button.set_text_content(Some("Retry"));
            button.set_attribute("onclick", "location.reload()")?;
            panel.append_child(&button)?;
        }
        Ok(panel)
    };

    match build() {
        Ok(panel) => {
            body.set_inner_html("");
            if body.append_child(&panel).is_err() {
                body.set_text_content(Some(message));
            }
        }
        Err(_) => body.set_text_content(Some(message)),
    }
}

fn fail(err: EngineError) -> JsValue {
    let message = format!("Could not start the demo: {err}");
    show_fatal_error(&message, true);
    JsValue::from_str(&message)
}

fn parse_config<T: serde::de::DeserializeOwned + Default>(json: Option<String>) -> Result<T, EngineError> {
    match json {
        Some(json) => Ok(crate::game::config::from_json_str(&json)?),
        None => Ok(T::default()),
    }
}

fn vertex_heights(mesh: &TerrainMesh) -> Vec<f32> {
    mesh.vertices.iter().map(|v| v.position[1]).collect()
}

/// The marble toss, driven from JavaScript.
#[wasm_bindgen]
pub struct MarbleTossHandle {
    game: MarbleGame<LogTelemetry>,
    input: InputState,
}

#[wasm_bindgen]
impl MarbleTossHandle {
    /// `config_json` overrides any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MarbleTossHandle, JsValue> {
        let config: MarbleConfig = parse_config(config_json).map_err(fail)?;
        let game = MarbleGame::with_log(config).map_err(fail)?;
        Ok(Self {
            game,
            input: InputState::new(),
        })
    }

    /// Forward a `KeyboardEvent.code`; returns whether it was handled.
    pub fn key_event(&mut self, code: &str, pressed: bool) -> bool {
        match self.input.handle_key(code, pressed) {
            Some(change) => {
                apply_action(&mut self.game, change);
                true
            }
            None => self.input.bindings.get_action(code).is_some(),
        }
    }

    pub fn move_left(&mut self) {
        self.game.move_left();
    }

    pub fn move_right(&mut self) {
        self.game.move_right();
    }

    pub fn increase_height(&mut self) {
        self.game.increase_height();
    }

    pub fn decrease_height(&mut self) {
        self.game.decrease_height();
    }

    pub fn start_charging(&mut self) {
        self.game.start_charging();
    }

    pub fn throw_marble(&mut self) {
        self.game.throw_marble();
    }

    pub fn reset(&mut self) {
        self.game.reset();
        self.input.reset();
    }

    /// Frame delta in seconds; returns the number of physics sub-steps run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.game.tick(dt)
    }

    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        DemoControls::height_at(&self.game, x, z)
    }

    pub fn grid_resolution(&self) -> u32 {
        self.game.mesh().grid().cols as u32
    }

    pub fn terrain_size(&self) -> f32 {
        self.game.config().grid.size
    }

    /// Row-major vertex heights of the terrain mesh.
    pub fn vertex_heights(&self) -> Vec<f32> {
        vertex_heights(self.game.mesh())
    }

    /// Flat `[x, y, z, x, y, z, ...]` of every marble.
    pub fn marble_positions(&self) -> Vec<f32> {
        self.game
            .marbles()
            .iter()
            .filter_map(|m| self.game.world().body_state(m.handle))
            .flat_map(|s| s.position.to_array())
            .collect()
    }

    pub fn launcher_position(&self) -> Vec<f32> {
        self.game.launcher().position.to_array().to_vec()
    }

    /// Charge meter in [0, 1].
    pub fn charge(&self) -> f32 {
        self.game.launcher().charge_fraction()
    }

    pub fn total_score(&self) -> u32 {
        self.game.total_score()
    }

    pub fn marbles_settled(&self) -> bool {
        self.game.all_settled()
    }
}

/// The condor sketch, driven from JavaScript.
#[wasm_bindgen]
pub struct CondorFlightHandle {
    sketch: CondorSketch,
    input: InputState,
}

#[wasm_bindgen]
impl CondorFlightHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<CondorFlightHandle, JsValue> {
        let mut config: CondorConfig = parse_config(config_json).map_err(fail)?;
        if config.heightmap.take().is_some() {
            log::warn!("heightmap paths are ignored in the browser; use with_heightmap");
        }
        let sketch = CondorSketch::with_seed(config, None).map_err(fail)?;
        Ok(Self {
            sketch,
            input: InputState::new(),
        })
    }

    /// Build with an encoded grayscale image (PNG/JPEG bytes) as heightmap.
    pub fn with_heightmap(config_json: Option<String>, image: &[u8]) -> Result<CondorFlightHandle, JsValue> {
        let config: CondorConfig = parse_config(config_json).map_err(fail)?;
        let extent = glam::Vec2::splat(config.grid.size);
        let seed = match crate::terrain::HeightmapSeed::from_bytes(image, extent) {
            Ok(seed) => Some(seed),
            Err(err) => {
                LogTelemetry.record(TelemetryEvent::HeightmapFallback(err.to_string()));
                None
            }
        };
        let sketch = CondorSketch::with_seed(config, seed).map_err(fail)?;
        Ok(Self {
            sketch,
            input: InputState::new(),
        })
    }

    /// Held keys steer continuously; presses also go through the trim controls.
    pub fn key_event(&mut self, code: &str, pressed: bool) -> bool {
        let Some(change) = self.input.handle_key(code, pressed) else {
            return self.input.bindings.get_action(code).is_some();
        };
        if change.action == ControlAction::Reset {
            apply_action(&mut self.sketch, change);
            return true;
        }
        self.sketch.set_controls(GliderControls {
            bank: self.input.axis(ControlAction::MoveLeft, ControlAction::MoveRight),
            climb: self.input.axis(ControlAction::DecreaseHeight, ControlAction::IncreaseHeight),
        });
        true
    }

    pub fn move_left(&mut self) {
        self.sketch.move_left();
    }

    pub fn move_right(&mut self) {
        self.sketch.move_right();
    }

    pub fn increase_height(&mut self) {
        self.sketch.increase_height();
    }

    pub fn decrease_height(&mut self) {
        self.sketch.decrease_height();
    }

    pub fn level_out(&mut self) {
        self.sketch.start_charging();
    }

    pub fn reset(&mut self) {
        self.sketch.reset();
        self.input.reset();
    }

    pub fn tick(&mut self, dt: f32) -> u32 {
        self.sketch.tick(dt)
    }

    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        DemoControls::height_at(&self.sketch, x, z)
    }

    pub fn grid_resolution(&self) -> u32 {
        self.sketch.mesh().grid().cols as u32
    }

    pub fn terrain_size(&self) -> f32 {
        self.sketch.config().grid.size
    }

    pub fn vertex_heights(&self) -> Vec<f32> {
        vertex_heights(self.sketch.mesh())
    }

    /// `[x, y, z]` of the condor.
    pub fn condor_position(&self) -> Vec<f32> {
        self.sketch.position().to_array().to_vec()
    }

    /// `[vx, vy, vz]` of the condor.
    pub fn condor_velocity(&self) -> Vec<f32> {
        self.sketch.glider().velocity.to_array().to_vec()
    }

    /// Bank angle in radians, for tilting the model.
    pub fn condor_bank(&self) -> f32 {
        self.sketch.glider().bank
    }
}
