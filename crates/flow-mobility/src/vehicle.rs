//! Per-vehicle state.

use std::collections::VecDeque;

use flow_core::{Coordinate, EdgeId, VehicleId};

/// Maximum number of trail points kept per vehicle.
pub const TRAIL_CAPACITY: usize = 5;

// ── VehicleState ──────────────────────────────────────────────────────────────

/// How the vehicle's most recent tick was resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleState {
    /// Normal motion along the current edge, or onto the next scheduled edge.
    #[default]
    Traveling,
    /// The current edge was blocked or missing, so the vehicle was moved to
    /// the start of another edge.
    NeedsRelocation,
    /// The scheduled route was exhausted or its next edge unusable, so a new
    /// route was resolved at the junction.
    NeedsRoute,
}

impl VehicleState {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleState::Traveling       => "traveling",
            VehicleState::NeedsRelocation => "needs_relocation",
            VehicleState::NeedsRoute      => "needs_route",
        }
    }
}

// ── Trail ─────────────────────────────────────────────────────────────────────

/// Recent positions, oldest first, capped at [`TRAIL_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trail(VecDeque<Coordinate>);

impl Trail {
    pub fn new() -> Self {
        Self(VecDeque::with_capacity(TRAIL_CAPACITY))
    }

    /// Append `pos`, evicting the oldest point when full.
    pub fn push(&mut self, pos: Coordinate) {
        if self.0.len() == TRAIL_CAPACITY {
            self.0.pop_front();
        }
        self.0.push_back(pos);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> + '_ {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<Coordinate> {
        self.0.iter().copied().collect()
    }
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// One simulated vehicle.
///
/// `route[cursor]` is always the edge the vehicle is on.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id:         VehicleId,
    /// Displayed position, derived from `edge` and `progress` each tick.
    pub pos:        Coordinate,
    pub edge:       EdgeId,
    /// Fraction of the current edge already covered, in `[0, 1)`.
    pub progress:   f64,
    /// Cruising speed, m/s.  Fixed at creation.
    pub speed_mps:  f64,
    pub route:      Vec<EdgeId>,
    pub cursor:     usize,
    pub trail:      Trail,
    /// Other vehicles within the proximity radius at the last metrics pass.
    pub density:    u32,
    /// Total distance driven, metres.  Relocations do not count.
    pub odometer_m: f64,
    pub state:      VehicleState,
}

impl Vehicle {
    pub(crate) fn new(id: VehicleId, edge: EdgeId, progress: f64, speed_mps: f64, pos: Coordinate) -> Self {
        Self {
            id,
            pos,
            edge,
            progress,
            speed_mps,
            route:      vec![edge],
            cursor:     0,
            trail:      Trail::new(),
            density:    0,
            odometer_m: 0.0,
            state:      VehicleState::Traveling,
        }
    }

    /// Edges still ahead on the current route, excluding the current edge.
    pub fn remaining_route(&self) -> &[EdgeId] {
        self.route.get(self.cursor + 1..).unwrap_or(&[])
    }

    /// Speed actually driven on an edge with the given limit.
    #[inline]
    pub fn effective_speed(&self, limit_mps: f64) -> f64 {
        if limit_mps > 0.0 { self.speed_mps.min(limit_mps) } else { self.speed_mps }
    }
}
