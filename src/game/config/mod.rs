//! Config Module
//!
//! Tuned defaults for both demos. Every struct is `#[serde(default)]`, so a
//! JSON file only needs the fields it overrides.

pub mod condor_config;
pub mod marble_config;

pub use condor_config::CondorConfig;
pub use marble_config::{ContactTuning, LauncherConfig, MarbleConfig, ScoringConfig, TerrainGridConfig};

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;

/// Parse a JSON config; missing fields keep their defaults.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text)
}
