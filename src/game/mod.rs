//! Game Module
//!
//! The two demos built on top of the engine: configuration, the control
//! surface the input layer drives, the marble toss and the condor sketch.

pub mod condor;
pub mod config;
pub mod controls;
pub mod marble;

pub use condor::CondorSketch;
pub use config::{CondorConfig, MarbleConfig};
pub use controls::{DemoControls, apply_action};
pub use marble::{Marble, MarbleGame, MarbleOutcome, ScoreBand};
