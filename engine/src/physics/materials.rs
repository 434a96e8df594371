//! Contact Materials
//!
//! Friction and restitution per pair of surface materials. Every collider
//! carries its [`SurfaceMaterial`] in `user_data`; the table is installed as
//! rapier's [`PhysicsHooks`] and overwrites the solver coefficients of each
//! contact with the tuned pair values.
//!
//! A pair that can touch but has no entry would silently fall back to
//! rapier's defaults, so [`ContactMaterialTable::validate`] checks the pairs a
//! scene needs before the first step.

use std::collections::HashMap;

use rapier3d::prelude::{ContactModificationContext, PhysicsHooks};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain::FeatureKind;

/// Material tag stored in collider `user_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMaterial {
    Terrain = 1,
    Rock = 2,
    Hill = 3,
    GroundPlane = 4,
    Marble = 5,
}

impl SurfaceMaterial {
    pub const ALL: [SurfaceMaterial; 5] = [
        SurfaceMaterial::Terrain,
        SurfaceMaterial::Rock,
        SurfaceMaterial::Hill,
        SurfaceMaterial::GroundPlane,
        SurfaceMaterial::Marble,
    ];

    pub fn to_user_data(self) -> u128 {
        self as u128
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.to_user_data() == data)
    }

    pub fn from_feature(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Rock => SurfaceMaterial::Rock,
            FeatureKind::Hill => SurfaceMaterial::Hill,
        }
    }
}

/// Solver settings for one material pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
    /// Contact spring natural frequency (Hz)
    pub stiffness: f32,
    /// Contact spring damping ratio
    pub relaxation: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self::TERRAIN_MARBLE
    }
}

impl ContactMaterial {
    pub const DEFAULT_STIFFNESS: f32 = 30.0;
    pub const DEFAULT_RELAXATION: f32 = 5.0;

    /// Marble pair defaults, one per surface.
    pub const TERRAIN_MARBLE: Self = Self::new(0.6, 0.2);
    pub const ROCK_MARBLE: Self = Self::new(0.92, 0.35);
    pub const HILL_MARBLE: Self = Self::new(0.9, 0.25);
    pub const GROUND_PLANE_MARBLE: Self = Self::new(0.5, 0.1);
    pub const MARBLE_MARBLE: Self = Self::new(0.3, 0.5);

    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            stiffness: Self::DEFAULT_STIFFNESS,
            relaxation: Self::DEFAULT_RELAXATION,
        }
    }

    fn validate(&self, a: SurfaceMaterial, b: SurfaceMaterial) -> Result<(), ConfigError> {
        if self.friction < 0.0 || !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "contact {a:?}/{b:?}: friction {} restitution {} out of range",
                self.friction, self.restitution
            )));
        }
        if self.stiffness <= 0.0 || self.relaxation <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "contact {a:?}/{b:?}: stiffness and relaxation must be positive"
            )));
        }
        Ok(())
    }
}

/// Per-pair contact tuning, order independent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactMaterialTable {
    pairs: HashMap<(SurfaceMaterial, SurfaceMaterial), ContactMaterial>,
}

impl ContactMaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs every surface with the marble, plus marble on marble.
    pub fn marble_defaults() -> Self {
        let marble = SurfaceMaterial::Marble;
        let mut table = Self::new();
        table.insert(SurfaceMaterial::Terrain, marble, ContactMaterial::TERRAIN_MARBLE);
        table.insert(SurfaceMaterial::Rock, marble, ContactMaterial::ROCK_MARBLE);
        table.insert(SurfaceMaterial::Hill, marble, ContactMaterial::HILL_MARBLE);
        table.insert(SurfaceMaterial::GroundPlane, marble, ContactMaterial::GROUND_PLANE_MARBLE);
        table.insert(marble, marble, ContactMaterial::MARBLE_MARBLE);
        table
    }

    fn key(a: SurfaceMaterial, b: SurfaceMaterial) -> (SurfaceMaterial, SurfaceMaterial) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn insert(&mut self, a: SurfaceMaterial, b: SurfaceMaterial, material: ContactMaterial) {
        self.pairs.insert(Self::key(a, b), material);
    }

    pub fn get(&self, a: SurfaceMaterial, b: SurfaceMaterial) -> Option<&ContactMaterial> {
        self.pairs.get(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every surface against `dynamic`.
    pub fn required_pairs(dynamic: SurfaceMaterial) -> Vec<(SurfaceMaterial, SurfaceMaterial)> {
        SurfaceMaterial::ALL
            .into_iter()
            .map(|surface| Self::key(surface, dynamic))
            .collect()
    }

    pub fn missing_pairs(
        &self,
        required: &[(SurfaceMaterial, SurfaceMaterial)],
    ) -> Vec<(SurfaceMaterial, SurfaceMaterial)> {
        required
            .iter()
            .copied()
            .filter(|&(a, b)| self.get(a, b).is_none())
            .collect()
    }

    /// All required pairs present and every entry in range.
    pub fn validate(&self, required: &[(SurfaceMaterial, SurfaceMaterial)]) -> Result<(), ConfigError> {
        let missing = self.missing_pairs(required);
        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "missing contact materials for {missing:?}"
            )));
        }
        for (&(a, b), material) in &self.pairs {
            material.validate(a, b)?;
        }
        Ok(())
    }

    /// Stiffest pair; drives the world's contact spring settings.
    pub fn solver_settings(&self) -> Option<ContactMaterial> {
        self.pairs
            .values()
            .copied()
            .max_by(|a, b| a.stiffness.total_cmp(&b.stiffness))
    }
}

impl PhysicsHooks for ContactMaterialTable {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let material = |handle| {
            context
                .colliders
                .get(handle)
                .and_then(|c| SurfaceMaterial::from_user_data(c.user_data))
        };
        let (Some(a), Some(b)) = (material(context.collider1), material(context.collider2)) else {
            return;
        };
        let Some(pair) = self.get(a, b) else {
            return;
        };
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = pair.friction;
            contact.restitution = pair.restitution;
        }
    }
}
