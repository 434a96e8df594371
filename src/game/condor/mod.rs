//! Condor Flight Sketch
//!
//! Glide a condor around a mountain. No rapier here: the glider reads the
//! height field directly.

pub mod sketch;

pub use sketch::CondorSketch;
