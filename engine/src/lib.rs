//! Condor & Marble Engine Library
//!
//! Procedural terrain and its physics coupling for two small browser demos:
//! a condor flight sketch and a marble toss.
//!
//! # Modules
//!
//! - [`terrain`] - height synthesis, feature placement, height fields, mesh
//! - [`physics`] - rapier world, terrain-physics bridge, post-processing, glider
//! - [`world`] - shared grid transform (mesh and collider agree through it)
//! - [`input`] - DOM key codes to demo actions
//! - [`telemetry`] - observer interface for warnings and game events
//! - [`error`] - error types
//! - [`game`] - the two demos
//!
//! # Example
//!
//! ```ignore
//! use condor_marble_engine::game::{MarbleConfig, MarbleGame};
//! use glam::Vec3;
//!
//! let mut game = MarbleGame::with_log(MarbleConfig::default())?;
//! let marble = game.drop_marble(Vec3::new(0.0, 0.3, 0.0));
//! while !game.all_settled() {
//!     game.tick(1.0 / 60.0);
//! }
//! println!("{:?}", game.marble(marble).and_then(|m| m.outcome));
//! ```

pub mod error;
pub mod input;
pub mod physics;
pub mod telemetry;
pub mod terrain;
pub mod world;

// Demo code (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{EngineError, Result};
pub use telemetry::{LogTelemetry, RecordingTelemetry, Telemetry, TelemetryEvent};
pub use world::GridTransform;
