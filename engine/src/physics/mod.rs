//! Physics Module
//!
//! Everything that touches rapier lives here.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! # Submodules
//!
//! - [`world`] - rapier pipeline wrapper, ball spawning, body state
//! - [`stepper`] - frame delta clamping and fixed sub-step accumulation
//! - [`materials`] - surface tags and the contact material table (physics hooks)
//! - [`events`] - impact events collected from rapier collision events
//! - [`bridge`] - height field to heightfield / sphere / plane colliders
//! - [`post_process`] - per-step velocity shaping for marbles
//! - [`glider`] - free-flight glider model for the condor
//! - [`types`] - glam <-> nalgebra conversions

pub mod bridge;
pub mod events;
pub mod glider;
pub mod materials;
pub mod post_process;
pub mod stepper;
pub mod types;
pub mod world;

pub use bridge::{
    BridgeConfig, FeatureCollider, HeightfieldLayout, TerrainColliders, TerrainPhysicsBridge,
    spherical_cap,
};
pub use events::{ImpactCollector, ImpactEvent};
pub use glider::{Glider, GliderConfig, GliderControls, GliderState};
pub use materials::{ContactMaterial, ContactMaterialTable, SurfaceMaterial};
pub use post_process::{
    BodySample, BodyStats, Correction, DynamicsPostProcessor, PostProcessConfig,
    compute_correction,
};
pub use stepper::{FixedStepper, FrameClock};
pub use world::{BallParams, BodyState, PhysicsConfig, PhysicsWorld};
