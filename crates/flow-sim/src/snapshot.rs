//! Per-tick output records handed to renderers, panels, and writers.

use flow_core::{Coordinate, EdgeId, VehicleClass, VehicleId};
use flow_metrics::{JamLevel, MetricsFrame, VehicleMetrics};
use flow_mobility::VehicleState;
use flow_network::RoadClass;

// ── VehicleSnapshot ───────────────────────────────────────────────────────────

/// One vehicle as seen at the end of a step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSnapshot {
    pub id:         VehicleId,
    pub pos:        Coordinate,
    pub edge:       EdgeId,
    pub progress:   f64,
    pub speed_mps:  f64,
    pub state:      VehicleState,
    pub odometer_m: f64,
    pub metrics:    VehicleMetrics,
    /// Recent positions, oldest first.
    pub trail:      Vec<Coordinate>,
}

impl VehicleSnapshot {
    #[inline]
    pub fn density(&self) -> u32 {
        self.metrics.density
    }

    #[inline]
    pub fn jam(&self) -> JamLevel {
        self.metrics.jam
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Full simulation state after one step.
///
/// `vehicles[i]` and `metrics.vehicles[i]` describe the same vehicle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub frame:         u64,
    pub elapsed_secs:  f64,
    pub playing:       bool,
    pub vehicles:      Vec<VehicleSnapshot>,
    /// Heat layers and summary.
    pub metrics:       MetricsFrame,
    pub blocked_edges: Vec<EdgeId>,
}

// ── StreetInfo ────────────────────────────────────────────────────────────────

/// Result of a hover/click street lookup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreetInfo {
    pub edge:         EdgeId,
    /// Street name, or "Unnamed road".
    pub name:         String,
    pub class:        RoadClass,
    pub speed_kmh:    f64,
    pub length_m:     f64,
    pub lane_width_m: Option<f64>,
    pub priority:     Option<i32>,
    /// Empty means every class is allowed.
    pub allowed:      Vec<VehicleClass>,
    pub blocked:      bool,
    /// Perpendicular distance from the query to the edge.
    pub distance_m:   f64,
    /// Closest point on the edge.
    pub point:        Coordinate,
}

// ── PathPreview ───────────────────────────────────────────────────────────────

/// A decorative random walk and its polyline.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPreview {
    pub edges:  Vec<EdgeId>,
    /// Concatenated edge geometries; a joint shared by consecutive edges
    /// appears once.
    pub coords: Vec<Coordinate>,
}
