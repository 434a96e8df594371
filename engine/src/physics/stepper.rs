//! Frame Stepping
//!
//! The host calls `tick` once per animation frame with a timestamp or a raw
//! delta. [`FrameClock`] clamps the delta, [`FixedStepper`] turns it into a
//! whole number of fixed sub-steps and drops time it cannot catch up on.

use super::world::PhysicsConfig;

/// Turns frame timestamps into clamped deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    max_frame_dt: f32,
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new(max_frame_dt: f32) -> Self {
        Self {
            max_frame_dt,
            last_timestamp: None,
        }
    }

    /// Clamp a raw delta (seconds) into `[0, max_frame_dt]`.
    pub fn clamp(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        }
    }

    /// Delta since the previous timestamp (seconds). First call returns 0.
    pub fn tick(&mut self, timestamp_seconds: f64) -> f32 {
        let dt = match self.last_timestamp {
            Some(last) => (timestamp_seconds - last) as f32,
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_seconds);
        self.clamp(dt)
    }
}

/// Fixed-step accumulator with a sub-step cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedStepper {
    fixed_dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedStepper {
    pub fn new(fixed_dt: f32, max_substeps: u32) -> Self {
        Self {
            fixed_dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.fixed_dt, config.max_substeps)
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Add `dt` and return how many sub-steps to run now.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !(dt.is_finite() && dt > 0.0) {
            return 0;
        }
        self.accumulator += dt;
        let wanted = (self.accumulator / self.fixed_dt).floor() as u32;
        let steps = wanted.min(self.max_substeps);
        self.accumulator -= steps as f32 * self.fixed_dt;

        if wanted > self.max_substeps {
            // Cannot catch up; keep only the fractional part
            let excess = self.accumulator - self.accumulator % self.fixed_dt;
            log::debug!("sub-step cap hit, dropping {:.4} s of backlog", excess);
            self.accumulator -= excess;
        }
        steps
    }
}
