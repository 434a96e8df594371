//! Terrain Module
//!
//! Procedural height-field synthesis shared by both demos.
//!
//! ## Pipeline
//! - [`place_features`] scatters rocks and hills around the target zone
//! - [`HeightSynthesizer`] evaluates noise, shaping, features and micro-bumps
//! - [`HeightSynthesizer::build_heightfield`] samples it on a [`GridTransform`]
//! - [`TerrainMesh`] and the physics bridge both consume the [`HeightField`]
//!
//! [`GridTransform`]: crate::world::GridTransform

pub mod features;
pub mod heightfield;
pub mod heightmap;
pub mod mesh;
pub mod noise;
pub mod params;
pub mod synth;

pub use features::{
    ExhaustionPolicy, FeatureKind, FeatureRange, PlacementConfig, PlacementReport,
    PlacementWarning, TerrainFeature, place_features, place_features_seeded,
};
pub use heightfield::{HeightField, TerrainQuery};
pub use heightmap::HeightmapSeed;
pub use mesh::{TerrainMesh, TerrainPalette, TerrainVertex};
pub use noise::{NoiseKind, NoiseParams};
pub use params::{BaseShape, HeightEnvelope, MicroBumps, TargetZone, TerrainParams};
pub use synth::HeightSynthesizer;
