//! Marble Toss
//!
//! Throw marbles at a target carved into procedurally generated terrain.

pub mod game;
pub mod launcher;
pub mod scoring;

pub use game::{Marble, MarbleGame};
pub use launcher::{Launch, Launcher};
pub use scoring::{MarbleOutcome, ScoreBand};
