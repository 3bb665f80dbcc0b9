//! The simulation controller.

use log::{debug, info, warn};

use flow_core::{BarrierId, Coordinate, EdgeId, SimClock, SimConfig, SimRng};
use flow_metrics::{MetricsDeriver, MetricsFrame, VehicleSample};
use flow_mobility::VehicleSimulator;
use flow_network::feature::DEFAULT_SPEED_KMH;
use flow_network::{DijkstraRouter, NetworkGraph, RoadFeature, Router, build_network, random_walk};

use crate::barrier::Barrier;
use crate::observer::SimObserver;
use crate::snapshot::{PathPreview, Snapshot, StreetInfo, VehicleSnapshot};
use crate::{SimError, SimResult};

/// Shortest and longest decorative preview walk, in edges.
const PREVIEW_MIN_STEPS:  usize = 5;
const PREVIEW_STEP_RANGE: usize = 5;

/// Owns the network, the vehicles, the barriers, and the RNG streams.
///
/// Construct with [`SimBuilder`][crate::SimBuilder].  All mutation happens
/// between calls to [`step`][Self::step]; nothing is shared across threads.
pub struct Sim<R: Router = DijkstraRouter> {
    pub(crate) config:            SimConfig,
    pub(crate) clock:             SimClock,
    pub(crate) graph:             NetworkGraph,
    pub(crate) vehicles:          VehicleSimulator<R>,
    pub(crate) metrics_deriver:   MetricsDeriver,
    /// Metrics from the last vehicle mutation, aligned with `vehicles`.
    pub(crate) metrics:           MetricsFrame,
    pub(crate) rng:               SimRng,
    /// Separate stream for path previews so they never perturb motion.
    pub(crate) preview_rng:       SimRng,
    pub(crate) barriers:          Vec<Barrier>,
    pub(crate) next_barrier_id:   u32,
    /// Bumped on every barrier mutation.
    pub(crate) barrier_revision:  u64,
    /// Revision last reported through `on_barrier_change`.
    pub(crate) notified_revision: u64,
}

impl<R: Router> Sim<R> {
    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance by one animation frame of `dt_secs` and return the new state.
    ///
    /// `dt_secs` is clamped to `config.max_step_secs`.  While paused or on an
    /// empty network this only returns the current snapshot.
    pub fn step(&mut self, dt_secs: f64) -> Snapshot {
        self.advance(dt_secs);
        self.snapshot()
    }

    /// [`step`][Self::step] with observer hooks: a pending barrier change is
    /// reported first, then `on_tick_end` if the step was applied.
    pub fn step_observed<O: SimObserver>(&mut self, dt_secs: f64, observer: &mut O) -> Snapshot {
        if self.barrier_revision != self.notified_revision {
            observer.on_barrier_change(&self.barriers);
            self.notified_revision = self.barrier_revision;
        }
        let applied  = self.advance(dt_secs);
        let snapshot = self.snapshot();
        if applied {
            observer.on_tick_end(&snapshot);
        }
        snapshot
    }

    /// Run ⌈`seconds` / `dt_secs`⌉ steps, then call `on_sim_end`.
    ///
    /// Returns the number of steps issued (paused steps included).
    pub fn run_for<O: SimObserver>(
        &mut self,
        seconds:  f64,
        dt_secs:  f64,
        observer: &mut O,
    ) -> SimResult<u64> {
        if !(dt_secs.is_finite() && dt_secs > 0.0) {
            return Err(SimError::InvalidStep(dt_secs));
        }
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(SimError::InvalidDuration(seconds));
        }

        // The epsilon keeps 40.0 / 0.1 from rounding up to 401 steps.
        let steps = (seconds / dt_secs - 1e-9).ceil().max(0.0) as u64;
        for _ in 0..steps {
            self.step_observed(dt_secs, observer);
        }
        observer.on_sim_end(&self.clock);
        Ok(steps)
    }

    /// Apply one tick.  Returns `false` when nothing moved.
    fn advance(&mut self, dt_secs: f64) -> bool {
        if !self.config.playing || self.graph.is_empty() {
            return false;
        }
        let dt = if dt_secs.is_nan() { 0.0 } else { self.config.clamp_step(dt_secs) };
        let multiplier = self.config.speed_multiplier;

        self.vehicles.tick(&self.graph, dt, multiplier, &mut self.rng);
        self.clock.advance(dt * multiplier);
        self.refresh_metrics();
        true
    }

    fn refresh_metrics(&mut self) {
        let samples: Vec<VehicleSample> = self
            .vehicles
            .vehicles()
            .iter()
            .map(|v| VehicleSample {
                pos:             v.pos,
                speed_limit_kmh: self
                    .graph
                    .edge(v.edge)
                    .map_or(DEFAULT_SPEED_KMH, |e| e.speed_limit_kmh()),
            })
            .collect();
        self.metrics = self.metrics_deriver.derive(&samples);

        let densities: Vec<u32> = self.metrics.vehicles.iter().map(|m| m.density).collect();
        self.vehicles.apply_densities(&densities);
    }

    /// Current state without advancing.
    pub fn snapshot(&self) -> Snapshot {
        let vehicles = self
            .vehicles
            .vehicles()
            .iter()
            .zip(&self.metrics.vehicles)
            .map(|(v, m)| VehicleSnapshot {
                id:         v.id,
                pos:        v.pos,
                edge:       v.edge,
                progress:   v.progress,
                speed_mps:  v.speed_mps,
                state:      v.state,
                odometer_m: v.odometer_m,
                metrics:    *m,
                trail:      v.trail.to_vec(),
            })
            .collect();

        Snapshot {
            frame:         self.clock.frame,
            elapsed_secs:  self.clock.elapsed_secs,
            playing:       self.config.playing,
            vehicles,
            metrics:       self.metrics.clone(),
            blocked_edges: self.blocked_edges(),
        }
    }

    fn blocked_edges(&self) -> Vec<EdgeId> {
        self.graph
            .edges()
            .iter()
            .filter(|e| e.is_blocked())
            .map(|e| e.id)
            .collect()
    }

    // ── Playback ──────────────────────────────────────────────────────────

    pub fn play(&mut self) {
        self.config.playing = true;
    }

    pub fn pause(&mut self) {
        self.config.playing = false;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.config.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.config.playing
    }

    /// Change the global speed multiplier.  Must be positive and finite.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> SimResult<()> {
        let mut next = self.config.clone();
        next.speed_multiplier = multiplier;
        next.validate()?;
        self.config = next;
        Ok(())
    }

    // ── Vehicles & network ────────────────────────────────────────────────

    /// Replace the fleet with `count` freshly routed vehicles.
    pub fn set_vehicle_count(&mut self, count: usize) -> usize {
        self.config.vehicle_count = count;
        self.reinit_vehicles()
    }

    /// Discard every vehicle and spawn `config.vehicle_count` new ones.
    ///
    /// Returns how many were actually spawned.
    pub fn reinit_vehicles(&mut self) -> usize {
        let spawned = self
            .vehicles
            .init_vehicles(&self.graph, self.config.vehicle_count, &mut self.rng);
        self.refresh_metrics();
        spawned
    }

    /// Swap in a new network: barriers are dropped and the fleet respawned.
    pub fn load_network(&mut self, graph: NetworkGraph) -> usize {
        info!(
            "loading network: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = graph;
        if !self.barriers.is_empty() {
            self.barriers.clear();
            self.barrier_revision += 1;
        }
        self.reinit_vehicles()
    }

    pub fn load_features(&mut self, features: &[RoadFeature]) -> usize {
        self.load_network(build_network(features))
    }

    /// Parse GeoJSON text and load it as the new network.
    #[cfg(feature = "geojson")]
    pub fn load_geojson(&mut self, text: &str) -> SimResult<usize> {
        let features = flow_network::geojson::features_from_str(text)?;
        Ok(self.load_features(&features))
    }

    // ── Barriers ──────────────────────────────────────────────────────────

    /// Place a barrier at `click`.
    ///
    /// The nearest edge within `config.barrier_snap_m` is blocked; vehicles
    /// on it are relocated on the next step.  With no edge in range the
    /// barrier is recorded free-floating.
    pub fn place_barrier(&mut self, click: Coordinate) -> BarrierId {
        let id = BarrierId(self.next_barrier_id);
        self.next_barrier_id += 1;

        let mut barrier = Barrier { id, click, snapped: None, edge: None };
        match self.graph.nearest_edge(click, self.config.barrier_snap_m) {
            Some(hit) if self.graph.set_blocked(hit.edge, true).is_ok() => {
                info!("{id} blocks {} ({:.1} m from click)", hit.edge, hit.distance_m);
                barrier.snapped = Some(hit.point);
                barrier.edge    = Some(hit.edge);
            }
            _ => warn!("{id} matched no edge within {} m", self.config.barrier_snap_m),
        }

        self.barriers.push(barrier);
        self.barrier_revision += 1;
        id
    }

    /// Remove one barrier.  Its edge is unblocked unless another barrier
    /// still holds it.
    pub fn remove_barrier(&mut self, id: BarrierId) -> SimResult<Barrier> {
        let idx = self
            .barriers
            .iter()
            .position(|b| b.id == id)
            .ok_or(SimError::UnknownBarrier(id))?;
        let barrier = self.barriers.remove(idx);

        if let Some(edge) = barrier.edge {
            if self.barriers.iter().all(|b| b.edge != Some(edge)) {
                self.graph.set_blocked(edge, false)?;
                debug!("{id} removed, {edge} reopened");
            }
        }
        self.barrier_revision += 1;
        Ok(barrier)
    }

    /// Drop every barrier and reset every edge's blocked flag.
    pub fn clear_barriers(&mut self) -> usize {
        let removed   = self.barriers.len();
        let unblocked = self.graph.clear_blocked();
        self.barriers.clear();
        if removed > 0 || unblocked > 0 {
            self.barrier_revision += 1;
        }
        info!("cleared {removed} barriers, reopened {unblocked} edges");
        removed
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    /// Toggle an edge directly, bypassing barrier bookkeeping.
    pub fn set_edge_blocked(&mut self, edge: EdgeId, blocked: bool) -> SimResult<()> {
        self.graph.set_blocked(edge, blocked)?;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Describe the street nearest to `query`, within `config.barrier_snap_m`.
    pub fn street_info(&self, query: Coordinate) -> Option<StreetInfo> {
        self.street_info_within(query, self.config.barrier_snap_m)
    }

    pub fn street_info_within(&self, query: Coordinate, max_distance_m: f64) -> Option<StreetInfo> {
        let hit  = self.graph.nearest_edge(query, max_distance_m)?;
        let edge = self.graph.edge(hit.edge)?;
        let attr = &edge.attributes;
        Some(StreetInfo {
            edge:         edge.id,
            name:         attr.display_name().to_owned(),
            class:        attr.class,
            speed_kmh:    edge.speed_limit_kmh(),
            length_m:     edge.length_m,
            lane_width_m: attr.lane_width_m,
            priority:     attr.priority,
            allowed:      attr.allowed.clone(),
            blocked:      edge.is_blocked(),
            distance_m:   hit.distance_m,
            point:        hit.point,
        })
    }

    /// `count` decorative random walks of 5–9 edges.
    ///
    /// Uses a dedicated RNG stream; vehicle motion is unaffected.
    pub fn path_previews(&mut self, count: usize) -> Vec<PathPreview> {
        let mut previews = Vec::with_capacity(count);
        for _ in 0..count {
            let steps = PREVIEW_MIN_STEPS + self.preview_rng.index(PREVIEW_STEP_RANGE).unwrap_or(0);
            let edges = random_walk(&self.graph, steps, &mut self.preview_rng);
            if edges.is_empty() {
                continue;
            }

            let mut coords: Vec<Coordinate> = Vec::new();
            for edge in edges.iter().filter_map(|&e| self.graph.edge(e)) {
                for &c in edge.geometry() {
                    if coords.last() != Some(&c) {
                        coords.push(c);
                    }
                }
            }
            previews.push(PathPreview { edges, coords });
        }
        previews
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn vehicles(&self) -> &VehicleSimulator<R> {
        &self.vehicles
    }

    pub fn metrics(&self) -> &MetricsFrame {
        &self.metrics
    }
}
