//! The per-tick vehicle motion integrator.
//!
//! # Tick algorithm
//!
//! For each vehicle, in id order:
//!
//! 1. If its edge is blocked or missing, relocate it to the start of a random
//!    usable edge and skip the rest of its tick.
//! 2. Convert `Δt · multiplier` into distance at the vehicle's effective
//!    speed and advance `progress`.
//! 3. At an edge end, push the pre-transition position onto the trail and
//!    resolve the next edge (see [`VehicleSimulator::tick`]); leftover time
//!    carries onto the new edge, up to [`MAX_TRANSITIONS_PER_TICK`] edges.
//! 4. Interpolate the displayed position along the edge polyline.
//! 5. Sample a trail point with probability `trail_sample_prob`.

use log::{debug, info, warn};

use flow_core::{Coordinate, EdgeId, NodeId, SimConfig, SimRng, VehicleId};
use flow_network::{DijkstraRouter, NetworkGraph, Router, random_route, random_route_from};

use crate::vehicle::{Vehicle, VehicleState};
use crate::{MobilityError, MobilityResult};

/// Random draws made when looking for an unblocked edge to relocate to.
pub const MAX_RELOCATION_ATTEMPTS: usize = 50;

/// Edge transitions a single vehicle may make in one tick.  A vehicle that
/// reaches the end of the last edge it may enter waits there until the next
/// tick; the rest of its travel time is dropped.
pub const MAX_TRANSITIONS_PER_TICK: usize = 8;

/// Largest representable progress below 1.
const MAX_PROGRESS: f64 = 1.0 - f64::EPSILON;

// ── MobilityParams ────────────────────────────────────────────────────────────

/// Simulator settings taken from [`SimConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MobilityParams {
    pub min_speed_mps:     f64,
    pub max_speed_mps:     f64,
    pub trail_sample_prob: f64,
}

impl Default for MobilityParams {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

impl From<&SimConfig> for MobilityParams {
    fn from(cfg: &SimConfig) -> Self {
        Self {
            min_speed_mps:     cfg.min_speed_mps,
            max_speed_mps:     cfg.max_speed_mps,
            trail_sample_prob: cfg.trail_sample_prob,
        }
    }
}

impl MobilityParams {
    fn sample_speed(&self, rng: &mut SimRng) -> f64 {
        if self.min_speed_mps.is_finite()
            && self.max_speed_mps.is_finite()
            && self.min_speed_mps < self.max_speed_mps
        {
            rng.gen_range(self.min_speed_mps..self.max_speed_mps)
        } else {
            self.min_speed_mps
        }
    }
}

// ── VehicleSimulator ──────────────────────────────────────────────────────────

/// Owns the vehicle set and advances it over a [`NetworkGraph`].
///
/// # Type parameter
///
/// `R` is the [`Router`] used for initial routes and rerouting; defaults to
/// [`DijkstraRouter`].
pub struct VehicleSimulator<R: Router = DijkstraRouter> {
    pub router:   R,
    pub params:   MobilityParams,
    vehicles:     Vec<Vehicle>,
    next_id:      u32,
}

impl VehicleSimulator<DijkstraRouter> {
    pub fn with_dijkstra(params: MobilityParams) -> Self {
        Self::new(DijkstraRouter, params)
    }
}

impl<R: Router> VehicleSimulator<R> {
    pub fn new(router: R, params: MobilityParams) -> Self {
        Self { router, params, vehicles: Vec::new(), next_id: 0 }
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Drop every vehicle and restart id numbering.
    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.next_id = 0;
    }

    /// Store the per-vehicle density counts from a metrics pass, in vehicle
    /// order.  Extra values are ignored; missing ones leave the old count.
    pub fn apply_densities(&mut self, densities: &[u32]) {
        for (v, &d) in self.vehicles.iter_mut().zip(densities) {
            v.density = d;
        }
    }

    fn alloc_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Creation ──────────────────────────────────────────────────────────

    /// Replace the vehicle set with up to `count` vehicles on random routes.
    ///
    /// Each vehicle starts at a random point in the first half of its route's
    /// first edge.  Draws that produce no route are skipped, so fewer than
    /// `count` vehicles may exist afterwards.  Returns the number created.
    pub fn init_vehicles(&mut self, graph: &NetworkGraph, count: usize, rng: &mut SimRng) -> usize {
        self.clear();
        if graph.is_empty() {
            info!("no edges in network; 0 of {count} vehicles created");
            return 0;
        }

        let mut skipped = 0usize;
        for _ in 0..count {
            let route = random_route(&self.router, graph, rng);
            let Some(edge) = route.first().and_then(|&e| graph.edge(e)) else {
                skipped += 1;
                continue;
            };
            let progress = rng.gen_range(0.0..0.5);
            let speed    = self.params.sample_speed(rng);
            let pos      = edge.point_at(progress);
            let id       = self.alloc_id();

            let mut v = Vehicle::new(id, edge.id, progress, speed, pos);
            v.route = route;
            self.vehicles.push(v);
        }

        if skipped > 0 {
            warn!("{skipped} of {count} vehicles could not be given a route");
        }
        info!("initialised {} vehicles", self.vehicles.len());
        self.vehicles.len()
    }

    /// Place one vehicle explicitly on `edge` at `progress` with `speed_mps`.
    ///
    /// Its route holds just that edge; a fresh route is resolved when it
    /// reaches the end.
    pub fn add_vehicle(
        &mut self,
        graph: &NetworkGraph,
        edge: EdgeId,
        progress: f64,
        speed_mps: f64,
    ) -> MobilityResult<VehicleId> {
        let e = graph.edge(edge).ok_or(MobilityError::UnknownEdge(edge))?;
        if e.is_blocked() {
            return Err(MobilityError::EdgeBlocked(edge));
        }
        if !(0.0..1.0).contains(&progress) {
            return Err(MobilityError::InvalidProgress(progress));
        }
        if !(speed_mps.is_finite() && speed_mps > 0.0) {
            return Err(MobilityError::InvalidSpeed(speed_mps));
        }
        let id = self.alloc_id();
        self.vehicles.push(Vehicle::new(id, edge, progress, speed_mps, e.point_at(progress)));
        Ok(id)
    }

    /// Replace the route of vehicle `id`.  The route must start with the
    /// vehicle's current edge.
    pub fn assign_route(&mut self, id: VehicleId, route: Vec<EdgeId>) -> MobilityResult<()> {
        let v = self
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(MobilityError::UnknownVehicle(id))?;
        match route.first() {
            Some(&first) if first == v.edge => {
                v.route  = route;
                v.cursor = 0;
                Ok(())
            }
            Some(&first) => Err(MobilityError::UnknownEdge(first)),
            None => Err(MobilityError::UnknownEdge(EdgeId::INVALID)),
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance every vehicle by `dt_secs` (already clamped by the caller)
    /// scaled by `speed_multiplier`.
    ///
    /// At an edge end the next edge is the first of:
    ///
    /// 1. the next scheduled edge, if usable;
    /// 2. a fresh shortest path from the junction to the route's destination;
    /// 3. the next usable edge further along the route;
    /// 4. a random route starting at the junction;
    /// 5. a random route anywhere in the network;
    ///
    /// and failing all of those the vehicle is relocated.
    ///
    /// Rerouting (2) is tried before skipping past blocked route entries (3):
    /// a later route edge rarely starts at the current junction, so skipping
    /// to it would make the vehicle jump.
    pub fn tick(&mut self, graph: &NetworkGraph, dt_secs: f64, speed_multiplier: f64, rng: &mut SimRng) {
        if graph.is_empty() || !(dt_secs > 0.0) {
            return;
        }
        let budget_secs = dt_secs * speed_multiplier;
        let trail_prob  = self.params.trail_sample_prob;

        for v in self.vehicles.iter_mut() {
            if !graph.is_usable(v.edge) {
                debug!("{} on unusable {}; relocating", v.id, v.edge);
                relocate(v, graph, rng);
                v.state = VehicleState::NeedsRelocation;
                continue;
            }

            v.state = VehicleState::Traveling;
            advance(v, &self.router, graph, budget_secs, rng);

            if let Some(edge) = graph.edge(v.edge) {
                v.pos = edge.point_at(v.progress);
            }
            if rng.gen_bool(trail_prob) {
                v.trail.push(v.pos);
            }
        }
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

/// Move `v` for `budget_secs` of simulated time, crossing edge ends as needed.
fn advance<R: Router>(v: &mut Vehicle, router: &R, graph: &NetworkGraph, budget_secs: f64, rng: &mut SimRng) {
    let mut remaining_secs = budget_secs;

    for transitions in 0..=MAX_TRANSITIONS_PER_TICK {
        let Some(edge) = graph.edge(v.edge) else { return };
        let speed = v.effective_speed(edge.speed_limit_mps());
        if !(speed > 0.0) || !(remaining_secs > 0.0) {
            return;
        }

        let travel_m = speed * remaining_secs;
        let left_m   = (1.0 - v.progress) * edge.length_m;
        if travel_m < left_m {
            v.progress = (v.progress + travel_m / edge.length_m).min(MAX_PROGRESS);
            v.odometer_m += travel_m;
            return;
        }

        // Edge end reached.
        v.odometer_m += left_m;
        if transitions == MAX_TRANSITIONS_PER_TICK {
            v.progress = MAX_PROGRESS;
            return;
        }
        remaining_secs -= left_m / speed;
        v.trail.push(v.pos);
        v.pos = edge.end();

        let junction = edge.to;
        match resolve_next(v, router, graph, junction, rng) {
            Some(next) => {
                v.edge     = next;
                v.progress = 0.0;
            }
            None => {
                debug!("{} found no way on from {}; relocating", v.id, junction);
                relocate(v, graph, rng);
                v.state = VehicleState::NeedsRelocation;
                return;
            }
        }
    }
}

/// Pick the edge to continue on from `junction`, updating route and cursor.
fn resolve_next<R: Router>(
    v: &mut Vehicle,
    router: &R,
    graph: &NetworkGraph,
    junction: NodeId,
    rng: &mut SimRng,
) -> Option<EdgeId> {
    let next_idx = v.cursor + 1;

    if let Some(&next) = v.route.get(next_idx) {
        if graph.is_usable(next) {
            v.cursor = next_idx;
            return Some(next);
        }
    }

    v.state = VehicleState::NeedsRoute;

    let destination = v.route.last().and_then(|&e| graph.edge(e)).map(|e| e.to);
    if let Some(dest) = destination.filter(|&d| d != junction) {
        if let Ok(route) = router.route(graph, junction, dest) {
            if let Some(&first) = route.edges.first() {
                debug!("{} rerouted at {} to {}", v.id, junction, dest);
                return Some(set_route(v, route.edges, first));
            }
        }
    }

    if let Some(i) = (next_idx..v.route.len()).find(|&i| graph.is_usable(v.route[i])) {
        debug!("{} skipped {} blocked route edges", v.id, i - next_idx);
        v.cursor = i;
        return Some(v.route[i]);
    }

    let route = random_route_from(router, graph, junction, rng);
    if let Some(&first) = route.first() {
        return Some(set_route(v, route, first));
    }

    let route = random_route(router, graph, rng);
    if let Some(&first) = route.first() {
        debug!("{} jumped to a random route starting at {}", v.id, first);
        return Some(set_route(v, route, first));
    }

    None
}

fn set_route(v: &mut Vehicle, route: Vec<EdgeId>, first: EdgeId) -> EdgeId {
    v.route  = route;
    v.cursor = 0;
    first
}

/// Move `v` to the start of a random usable edge.
///
/// Tries [`MAX_RELOCATION_ATTEMPTS`] uniform draws, then the first usable
/// edge in id order, then any edge at all; always terminates.
fn relocate(v: &mut Vehicle, graph: &NetworkGraph, rng: &mut SimRng) {
    let n = graph.edge_count();
    let drawn = (0..MAX_RELOCATION_ATTEMPTS)
        .filter_map(|_| rng.index(n).map(|i| EdgeId(i as u32)))
        .find(|&e| graph.is_usable(e));
    let target = drawn
        .or_else(|| graph.edges().iter().find(|e| !e.is_blocked()).map(|e| e.id))
        .or_else(|| rng.index(n).map(|i| EdgeId(i as u32)));

    let Some(edge) = target.and_then(|id| graph.edge(id)) else { return };
    let start: Coordinate = edge.start();
    v.edge     = edge.id;
    v.progress = 0.0;
    v.pos      = start;
    v.route    = vec![edge.id];
    v.cursor   = 0;
}
