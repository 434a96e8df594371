//! Telemetry
//!
//! Observer interface the terrain and physics core report through. The core
//! never touches UI state directly; a host (native binary, browser page,
//! test) decides what to do with each event.

use crate::error::BridgeError;
use crate::physics::ImpactEvent;
use crate::terrain::PlacementWarning;

/// Something the core wants an observer to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// Rejection sampling ran out of attempts for one feature.
    PlacementExhausted(PlacementWarning),
    /// Heightfield construction failed; only the flat plane collides.
    BridgeFallback(BridgeError),
    /// Heightmap seed could not be loaded; synthesis is purely procedural.
    HeightmapFallback(String),
    /// A tracked body started touching terrain or an obstacle.
    Impact(ImpactEvent),
    /// A thrown marble came to rest (or timed out).
    MarbleSettled {
        marble: u32,
        distance_to_target: f32,
        score: u32,
    },
}

/// Sink for [`TelemetryEvent`]s.
pub trait Telemetry {
    fn record(&mut self, event: TelemetryEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn record(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::PlacementExhausted(warning) => log::warn!(
                "{:?} placement exhausted after {} attempts, using ({:.2}, {:.2})",
                warning.kind,
                warning.attempts,
                warning.position.x,
                warning.position.y
            ),
            TelemetryEvent::BridgeFallback(err) => {
                log::warn!("terrain collision degraded to ground plane: {err}")
            }
            TelemetryEvent::HeightmapFallback(reason) => {
                log::warn!("heightmap unavailable, using procedural terrain: {reason}")
            }
            TelemetryEvent::Impact(impact) => log::debug!(
                "impact {:?} at {:.2} m/s",
                impact.surface,
                impact.normal_speed
            ),
            TelemetryEvent::MarbleSettled {
                marble,
                distance_to_target,
                score,
            } => log::info!(
                "marble {marble} settled {distance_to_target:.3} from target, score {score}"
            ),
        }
    }
}

/// Keeps every event in memory. Used by tests and debug overlays.
#[derive(Debug, Default, Clone)]
pub struct RecordingTelemetry {
    pub events: Vec<TelemetryEvent>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placement_warnings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TelemetryEvent::PlacementExhausted(_)))
            .count()
    }

    pub fn bridge_fallbacks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TelemetryEvent::BridgeFallback(_)))
            .count()
    }
}

impl Telemetry for RecordingTelemetry {
    fn record(&mut self, event: TelemetryEvent) {
        self.events.push(event);
    }
}
