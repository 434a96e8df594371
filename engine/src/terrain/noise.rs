//! Procedural Noise Functions
//!
//! Cheap deterministic noise for terrain synthesis. Not statistically uniform;
//! only reproducible for a given seed and rough enough to read as ground.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Which base noise the synthesizer layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Products of sines, one per octave
    Sine,
    /// Smoothed lattice value noise (fBm)
    Value,
}

/// Octave stack description for the base noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    pub seed: u32,
    pub octaves: u32,
    /// Spatial frequency of the first octave (radians per world unit for sine)
    pub base_frequency: f32,
    /// Amplitude of the first octave (world units)
    pub amplitude: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
    /// Amplitude multiplier per octave
    pub persistence: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Sine,
            seed: 1,
            octaves: 3,
            base_frequency: 4.0,
            amplitude: 0.008,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl NoiseParams {
    /// Upper bound on `|layered_noise(..)|`.
    pub fn max_amplitude(&self) -> f32 {
        let mut total = 0.0;
        let mut amp = self.amplitude.abs();
        for _ in 0..self.octaves {
            total += amp;
            amp *= self.persistence.abs();
        }
        total
    }
}

/// Hash of an integer lattice point mixed with a seed, in [0, 1)
pub fn lattice_hash(i: i32, j: i32, seed: u32) -> f32 {
    let mut h = (i as u32).wrapping_mul(0x8da6_b343)
        ^ (j as u32).wrapping_mul(0xd816_3841)
        ^ seed.wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

/// Smoothstep interpolation
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Phase offset in [0, 2π) for one octave of one axis.
pub fn octave_phase(seed: u32, octave: u32, axis: u32) -> f32 {
    lattice_hash(octave as i32, axis as i32, seed) * TAU
}

/// 2D value noise, in [0, 1)
pub fn noise_2d(x: f32, y: f32, seed: u32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = x - ix;
    let fy = y - iy;
    let (i, j) = (ix as i32, iy as i32);

    let v00 = lattice_hash(i, j, seed);
    let v10 = lattice_hash(i + 1, j, seed);
    let v01 = lattice_hash(i, j + 1, seed);
    let v11 = lattice_hash(i + 1, j + 1, seed);

    let sx = smoothstep(fx);
    let sy = smoothstep(fy);

    let v0 = v00 + sx * (v10 - v00);
    let v1 = v01 + sx * (v11 - v01);

    v0 + sy * (v1 - v0)
}

/// Layered `sin(f·x)·sin(f·z)` octaves.
pub fn layered_sine(x: f32, z: f32, params: &NoiseParams) -> f32 {
    let mut value = 0.0;
    let mut amplitude = params.amplitude;
    let mut frequency = params.base_frequency;

    for octave in 0..params.octaves {
        let px = octave_phase(params.seed, octave, 0);
        let pz = octave_phase(params.seed, octave, 1);
        value += amplitude * (frequency * x + px).sin() * (frequency * z + pz).sin();
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    value
}

/// Fractal Brownian Motion over [`noise_2d`], centered on zero.
pub fn fbm_noise(x: f32, z: f32, params: &NoiseParams) -> f32 {
    let mut value = 0.0;
    let mut amplitude = params.amplitude;
    let mut frequency = params.base_frequency;

    for octave in 0..params.octaves {
        let n = noise_2d(x * frequency, z * frequency, params.seed.wrapping_add(octave));
        value += amplitude * (n * 2.0 - 1.0);
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    value
}

/// Base noise of the configured kind.
pub fn layered_noise(x: f32, z: f32, params: &NoiseParams) -> f32 {
    match params.kind {
        NoiseKind::Sine => layered_sine(x, z, params),
        NoiseKind::Value => fbm_noise(x, z, params),
    }
}
