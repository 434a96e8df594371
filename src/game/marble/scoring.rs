//! Scoring
//!
//! A settled marble scores by which band of the target zone it stopped in.

use glam::Vec2;

use crate::game::config::ScoringConfig;
use crate::terrain::TargetZone;

/// Landing band, from the center outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Hole,
    Circle,
    Rim,
    Miss,
}

impl ScoreBand {
    pub fn classify(zone: &TargetZone, distance: f32) -> Self {
        if distance < zone.center_hole_radius {
            ScoreBand::Hole
        } else if distance < zone.circle_radius {
            ScoreBand::Circle
        } else if distance < zone.outer_radius() {
            ScoreBand::Rim
        } else {
            ScoreBand::Miss
        }
    }

    pub fn points(self, scoring: &ScoringConfig) -> u32 {
        match self {
            ScoreBand::Hole => scoring.hole,
            ScoreBand::Circle => scoring.circle,
            ScoreBand::Rim => scoring.rim,
            ScoreBand::Miss => scoring.miss,
        }
    }
}

/// Final result for one marble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarbleOutcome {
    /// Horizontal distance from the target center (meters)
    pub distance: f32,
    pub band: ScoreBand,
    pub score: u32,
    /// Settled by the roll timeout rather than by coming to rest
    pub timed_out: bool,
    /// Seconds from throw to settle
    pub roll_time: f32,
}

impl MarbleOutcome {
    pub fn evaluate(
        zone: &TargetZone,
        scoring: &ScoringConfig,
        rest_point: Vec2,
        timed_out: bool,
        roll_time: f32,
    ) -> Self {
        // The zone is carved around the world origin
        let distance = rest_point.length();
        let band = ScoreBand::classify(zone, distance);
        Self {
            distance,
            band,
            score: band.points(scoring),
            timed_out,
            roll_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let zone = TargetZone::default();
        assert_eq!(ScoreBand::classify(&zone, 0.0), ScoreBand::Hole);
        assert_eq!(ScoreBand::classify(&zone, 0.049), ScoreBand::Hole);
        assert_eq!(ScoreBand::classify(&zone, 0.3), ScoreBand::Circle);
        assert_eq!(ScoreBand::classify(&zone, 0.55), ScoreBand::Rim);
        assert_eq!(ScoreBand::classify(&zone, 0.7), ScoreBand::Miss);
    }

    #[test]
    fn test_outcome_scores_band() {
        let zone = TargetZone::default();
        let scoring = ScoringConfig::default();
        let outcome = MarbleOutcome::evaluate(&zone, &scoring, Vec2::new(0.0, -0.3), false, 2.0);
        assert!((outcome.distance - 0.3).abs() < 1e-6);
        assert_eq!(outcome.band, ScoreBand::Circle);
        assert_eq!(outcome.score, scoring.circle);

        let outcome = MarbleOutcome::evaluate(&zone, &scoring, Vec2::new(0.01, 0.0), true, 15.0);
        assert_eq!(outcome.score, scoring.hole);
        assert!(outcome.timed_out);
    }
}
