//! Plain data row types written by output backends.

use flow_metrics::JamLevel;
use flow_mobility::VehicleState;
use flow_sim::{Snapshot, VehicleSnapshot};

/// One vehicle at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshotRow {
    pub vehicle_id:   u32,
    pub frame:        u64,
    pub elapsed_secs: f64,
    pub lon:          f64,
    pub lat:          f64,
    pub edge:         u32,
    pub progress:     f64,
    pub speed_mps:    f64,
    pub odometer_m:   f64,
    pub state:        VehicleState,
    pub density:      u32,
    pub jam:          JamLevel,
    pub co2:          f64,
    pub noise:        f64,
}

impl VehicleSnapshotRow {
    pub fn from_vehicle(snapshot: &Snapshot, v: &VehicleSnapshot) -> Self {
        Self {
            vehicle_id:   v.id.0,
            frame:        snapshot.frame,
            elapsed_secs: snapshot.elapsed_secs,
            lon:          v.pos.lon,
            lat:          v.pos.lat,
            edge:         v.edge.0,
            progress:     v.progress,
            speed_mps:    v.speed_mps,
            odometer_m:   v.odometer_m,
            state:        v.state,
            density:      v.metrics.density,
            jam:          v.metrics.jam,
            co2:          v.metrics.co2,
            noise:        v.metrics.noise,
        }
    }
}

/// Aggregates for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub frame:         u64,
    pub elapsed_secs:  f64,
    pub vehicle_count: usize,
    pub mean_density:  f64,
    pub heavy_jams:    usize,
    pub mean_co2:      f64,
    pub mean_noise:    f64,
    pub blocked_edges: usize,
}

impl From<&Snapshot> for TickSummaryRow {
    fn from(s: &Snapshot) -> Self {
        let m = &s.metrics.summary;
        Self {
            frame:         s.frame,
            elapsed_secs:  s.elapsed_secs,
            vehicle_count: m.vehicle_count,
            mean_density:  m.mean_density,
            heavy_jams:    m.heavy_jams,
            mean_co2:      m.mean_co2,
            mean_noise:    m.mean_noise,
            blocked_edges: s.blocked_edges.len(),
        }
    }
}
