//! Terrain Features
//!
//! Rocks and hills stamped onto the height field, and the rejection sampler
//! that scatters them around the target zone.
//!
//! ## Placement
//! Candidates are drawn uniformly inside a square centered on the origin. A
//! candidate is rejected when it lands within `target_clearance` of the
//! target center or within `min_clearance` of any feature already placed
//! (hills are placed first, then rocks). After `max_attempts` rejected draws
//! the [`ExhaustionPolicy`] decides what happens and a [`PlacementWarning`]
//! is recorded. Exhaustion never aborts placement.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::telemetry::{Telemetry, TelemetryEvent};

/// Kind of stamped obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Half-ellipsoid: `h * sqrt(1 - (d/s)^2)`
    Rock,
    /// Cosine dome: `h * cos((d/r) * pi/2)`
    Hill,
}

/// A placed rock or hill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub kind: FeatureKind,
    /// World-space (x, z) of the feature center
    pub position: Vec2,
    /// Footprint radius (rock size or hill radius)
    pub radius: f32,
    /// Height added at the center
    pub height: f32,
}

impl TerrainFeature {
    pub fn new(kind: FeatureKind, position: Vec2, radius: f32, height: f32) -> Self {
        Self {
            kind,
            position,
            radius,
            height,
        }
    }

    /// Height contribution at horizontal distance `d` from the center.
    pub fn profile(&self, d: f32) -> f32 {
        if self.radius <= 0.0 || d >= self.radius {
            return 0.0;
        }
        let t = d / self.radius;
        match self.kind {
            FeatureKind::Rock => self.height * (1.0 - t * t).max(0.0).sqrt(),
            FeatureKind::Hill => self.height * (t * FRAC_PI_2).cos(),
        }
    }

    /// Height contribution at world (x, z).
    #[inline]
    pub fn contribution_at(&self, x: f32, z: f32) -> f32 {
        self.profile(self.position.distance(Vec2::new(x, z)))
    }
}

/// Count and size ranges for one feature kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRange {
    pub count: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for FeatureRange {
    fn default() -> Self {
        Self {
            count: 0,
            min_radius: 0.05,
            max_radius: 0.1,
            min_height: 0.02,
            max_height: 0.04,
        }
    }
}

impl FeatureRange {
    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        if self.min_radius <= 0.0 || self.min_radius > self.max_radius {
            return Err(ConfigError::Invalid(format!(
                "{label} radius range [{}, {}] is invalid",
                self.min_radius, self.max_radius
            )));
        }
        if self.min_height < 0.0 || self.min_height > self.max_height {
            return Err(ConfigError::Invalid(format!(
                "{label} height range [{}, {}] is invalid",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }
}

/// What to do when a feature runs out of attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Keep the last rejected candidate anyway
    #[default]
    AcceptLast,
    /// Drop the feature
    Skip,
}

/// Rejection sampling configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub seed: u64,
    /// Candidates are drawn from `[-half_extent, half_extent]` on both axes
    pub half_extent: f32,
    pub target_center: Vec2,
    /// Minimum distance from the target center
    pub target_clearance: f32,
    /// Minimum distance between any two feature centers
    pub min_clearance: f32,
    pub max_attempts: u32,
    pub exhaustion: ExhaustionPolicy,
    pub hills: FeatureRange,
    pub rocks: FeatureRange,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            half_extent: 1.4,
            target_center: Vec2::ZERO,
            target_clearance: 0.75,
            min_clearance: 0.25,
            max_attempts: 100,
            exhaustion: ExhaustionPolicy::AcceptLast,
            hills: FeatureRange {
                count: 3,
                min_radius: 0.15,
                max_radius: 0.25,
                min_height: 0.03,
                max_height: 0.06,
            },
            rocks: FeatureRange {
                count: 6,
                min_radius: 0.04,
                max_radius: 0.08,
                min_height: 0.02,
                max_height: 0.05,
            },
        }
    }
}

impl PlacementConfig {
    /// No features at all.
    pub fn empty() -> Self {
        Self {
            hills: FeatureRange {
                count: 0,
                ..FeatureRange::default()
            },
            rocks: FeatureRange {
                count: 0,
                ..FeatureRange::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.half_extent <= 0.0 {
            return Err(ConfigError::Invalid("placement half_extent must be positive".into()));
        }
        if self.min_clearance < 0.0 || self.target_clearance < 0.0 {
            return Err(ConfigError::Invalid("clearances must be non-negative".into()));
        }
        self.hills.validate("hill")?;
        self.rocks.validate("rock")?;
        Ok(())
    }

    fn total_count(&self) -> usize {
        (self.hills.count + self.rocks.count) as usize
    }
}

/// One feature that ran out of placement attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementWarning {
    pub kind: FeatureKind,
    /// Index of the feature within its kind
    pub index: u32,
    pub attempts: u32,
    /// The last rejected candidate
    pub position: Vec2,
    pub policy: ExhaustionPolicy,
}

/// Result of a placement run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementReport {
    pub features: Vec<TerrainFeature>,
    pub warnings: Vec<PlacementWarning>,
}

impl PlacementReport {
    pub fn is_exhausted(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Forward every warning to a telemetry sink.
    pub fn report_to(&self, telemetry: &mut dyn Telemetry) {
        for warning in &self.warnings {
            telemetry.record(TelemetryEvent::PlacementExhausted(*warning));
        }
    }

    /// Smallest center-to-center distance between any two features.
    pub fn min_pairwise_distance(&self) -> Option<f32> {
        let mut best: Option<f32> = None;
        for (i, a) in self.features.iter().enumerate() {
            for b in &self.features[i + 1..] {
                let d = a.position.distance(b.position);
                best = Some(best.map_or(d, |m| m.min(d)));
            }
        }
        best
    }
}

/// Place hills then rocks by rejection sampling.
pub fn place_features<R: Rng + ?Sized>(rng: &mut R, config: &PlacementConfig) -> PlacementReport {
    let mut report = PlacementReport {
        features: Vec::with_capacity(config.total_count()),
        warnings: Vec::new(),
    };

    for (kind, range) in [
        (FeatureKind::Hill, &config.hills),
        (FeatureKind::Rock, &config.rocks),
    ] {
        for index in 0..range.count {
            let radius = rng.gen_range(range.min_radius..=range.max_radius);
            let height = rng.gen_range(range.min_height..=range.max_height);

            let mut candidate = Vec2::ZERO;
            let mut accepted = false;
            for _ in 0..config.max_attempts {
                candidate = Vec2::new(
                    rng.gen_range(-config.half_extent..=config.half_extent),
                    rng.gen_range(-config.half_extent..=config.half_extent),
                );
                if is_clear(candidate, config, &report.features) {
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                report.warnings.push(PlacementWarning {
                    kind,
                    index,
                    attempts: config.max_attempts,
                    position: candidate,
                    policy: config.exhaustion,
                });
                if config.exhaustion == ExhaustionPolicy::Skip {
                    continue;
                }
            }

            report
                .features
                .push(TerrainFeature::new(kind, candidate, radius, height));
        }
    }

    log::debug!(
        "placed {} terrain features ({} exhausted)",
        report.features.len(),
        report.warnings.len()
    );
    report
}

/// [`place_features`] with a ChaCha8 generator seeded from the config.
pub fn place_features_seeded(config: &PlacementConfig) -> PlacementReport {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    place_features(&mut rng, config)
}

fn is_clear(candidate: Vec2, config: &PlacementConfig, placed: &[TerrainFeature]) -> bool {
    if candidate.distance(config.target_center) < config.target_clearance {
        return false;
    }
    placed
        .iter()
        .all(|f| f.position.distance(candidate) >= config.min_clearance)
}
