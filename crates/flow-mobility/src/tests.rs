//! Unit tests for flow-mobility.

use flow_core::geo::METRES_PER_DEG_LAT;
use flow_core::{Coordinate, EdgeId, SimRng};
use flow_network::{NetworkGraph, RoadAttributes, RoadClass, RoadFeature, build_network};

use crate::{MobilityParams, VehicleSimulator};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn at(x: f64, y: f64) -> Coordinate {
    let k = 47.0f64.to_radians().cos();
    Coordinate::new(10.0 + x / (METRES_PER_DEG_LAT * k), 47.0 + y / METRES_PER_DEG_LAT)
}

fn road_with(points: &[(f64, f64)], speed_kmh: f64) -> RoadFeature {
    let coords: Vec<Coordinate> = points.iter().map(|&(x, y)| at(x, y)).collect();
    RoadFeature::line(
        coords,
        RoadAttributes { speed_kmh, ..RoadAttributes::with_class(RoadClass::Residential) },
    )
}

fn road(points: &[(f64, f64)]) -> RoadFeature {
    road_with(points, 50.0)
}

/// Closed loop A→B→C→D→A, 100 m sides.
fn square_loop() -> NetworkGraph {
    build_network(&[
        road(&[(0.0, 0.0), (100.0, 0.0)]),
        road(&[(100.0, 0.0), (100.0, 100.0)]),
        road(&[(100.0, 100.0), (0.0, 100.0)]),
        road(&[(0.0, 100.0), (0.0, 0.0)]),
    ])
}

/// 3×3 grid, 100 m spacing, every street two-way.
fn grid() -> NetworkGraph {
    let mut features = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            let (x, y) = (i as f64 * 100.0, j as f64 * 100.0);
            if i < 2 {
                features.push(road(&[(x, y), (x + 100.0, y)]));
                features.push(road(&[(x + 100.0, y), (x, y)]));
            }
            if j < 2 {
                features.push(road(&[(x, y), (x, y + 100.0)]));
                features.push(road(&[(x, y + 100.0), (x, y)]));
            }
        }
    }
    build_network(&features)
}

/// ```text
///                 E
///           e2 ↗    ↘ e3
///   A ──e0──→ B ──e1──→ C ──e4──→ D
/// ```
fn fork() -> NetworkGraph {
    build_network(&[
        road(&[(0.0, 0.0), (100.0, 0.0)]),
        road(&[(100.0, 0.0), (200.0, 0.0)]),
        road(&[(100.0, 0.0), (150.0, 50.0)]),
        road(&[(150.0, 50.0), (200.0, 0.0)]),
        road(&[(200.0, 0.0), (300.0, 0.0)]),
    ])
}

fn quiet_params() -> MobilityParams {
    MobilityParams { trail_sample_prob: 0.0, ..MobilityParams::default() }
}

// ── Initialisation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod init {
    use super::*;
    use flow_core::VehicleId;

    #[test]
    fn spawns_requested_count() {
        let graph = grid();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        assert_eq!(sim.init_vehicles(&graph, 20, &mut rng), 20);

        for (i, v) in sim.vehicles().iter().enumerate() {
            assert_eq!(v.id, VehicleId(i as u32));
            assert!((0.0..0.5).contains(&v.progress));
            assert!((10.0..20.0).contains(&v.speed_mps));
            assert_eq!(v.route[0], v.edge);
            assert_eq!(v.cursor, 0);
            assert!(v.trail.is_empty());
        }
    }

    #[test]
    fn reinit_replaces_vehicles() {
        let graph = grid();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        sim.init_vehicles(&graph, 20, &mut rng);
        sim.init_vehicles(&graph, 5, &mut rng);
        assert_eq!(sim.len(), 5);
        assert_eq!(sim.vehicles()[0].id, VehicleId(0));
    }

    #[test]
    fn empty_network_yields_no_vehicles() {
        let graph = build_network(&[]);
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        assert_eq!(sim.init_vehicles(&graph, 10, &mut rng), 0);
        sim.tick(&graph, 0.1, 1.0, &mut rng);
        assert!(sim.is_empty());
    }

    #[test]
    fn fixed_speed_band() {
        let graph = square_loop();
        let mut rng = SimRng::new(42);
        let params = MobilityParams { min_speed_mps: 12.0, max_speed_mps: 12.0, trail_sample_prob: 0.0 };
        let mut sim = VehicleSimulator::with_dijkstra(params);
        sim.init_vehicles(&graph, 3, &mut rng);
        assert!(sim.vehicles().iter().all(|v| v.speed_mps == 12.0));
    }

    #[test]
    fn unbounded_speed_band_does_not_panic() {
        let params = MobilityParams { max_speed_mps: f64::INFINITY, ..quiet_params() };
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(params);
        assert_eq!(sim.init_vehicles(&grid(), 5, &mut rng), 5);
        assert!(sim.vehicles().iter().all(|v| v.speed_mps == params.min_speed_mps));
    }

    #[test]
    fn add_vehicle_validates() {
        let mut graph = square_loop();
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        assert!(sim.add_vehicle(&graph, EdgeId(9), 0.0, 10.0).is_err());
        assert!(sim.add_vehicle(&graph, EdgeId(0), 1.0, 10.0).is_err());
        assert!(sim.add_vehicle(&graph, EdgeId(0), 0.2, 0.0).is_err());
        graph.set_blocked(EdgeId(1), true).unwrap();
        assert!(sim.add_vehicle(&graph, EdgeId(1), 0.2, 10.0).is_err());

        let id = sim.add_vehicle(&graph, EdgeId(0), 0.5, 10.0).unwrap();
        let v = sim.vehicle(id).unwrap();
        assert!(v.pos.distance_m(at(50.0, 0.0)) < 0.1);
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod motion {
    use super::*;
    use crate::simulator::MAX_TRANSITIONS_PER_TICK;
    use crate::{TRAIL_CAPACITY, VehicleState};

    #[test]
    fn simple_loop_returns_to_start() {
        let graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();

        for _ in 0..400 {
            sim.tick(&graph, 0.1, 1.0, &mut rng);
        }

        let v = &sim.vehicles()[0];
        assert!((v.odometer_m - 400.0).abs() < 0.5, "odometer {}", v.odometer_m);
        let near_start = (v.edge == EdgeId(0) && v.progress < 0.01)
            || (v.edge == EdgeId(3) && v.progress > 0.99);
        assert!(near_start, "ended on {} at {}", v.edge, v.progress);
        assert!(v.pos.distance_m(at(0.0, 0.0)) < 1.0);
    }

    #[test]
    fn multiplier_scales_distance() {
        let graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        for _ in 0..10 {
            sim.tick(&graph, 0.1, 2.0, &mut rng);
        }
        let v = &sim.vehicles()[0];
        assert!((v.odometer_m - 20.0).abs() < 1e-6);
        assert!((v.progress - 0.2).abs() < 1e-3);
    }

    #[test]
    fn long_tick_carries_overflow() {
        let graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        sim.tick(&graph, 25.0, 1.0, &mut rng);

        let v = &sim.vehicles()[0];
        assert!((v.odometer_m - 250.0).abs() < 1e-6);
        assert_eq!(v.edge, EdgeId(2));
        assert!((v.progress - 0.5).abs() < 1e-3);
        // One trail point per junction crossed.
        assert_eq!(v.trail.len(), 2);
    }

    #[test]
    fn transitions_per_tick_are_capped() {
        // Twenty 10 m edges in a row; one 15 s tick at 10 m/s would cover 15.
        let features: Vec<RoadFeature> = (0..20)
            .map(|i| road(&[(i as f64 * 10.0, 0.0), ((i + 1) as f64 * 10.0, 0.0)]))
            .collect();
        let graph = build_network(&features);
        let route: Vec<EdgeId> = (0..20).map(EdgeId).collect();

        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        let id = sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        sim.assign_route(id, route).unwrap();
        sim.tick(&graph, 15.0, 1.0, &mut rng);

        let v = &sim.vehicles()[0];
        assert_eq!(v.edge, EdgeId(MAX_TRANSITIONS_PER_TICK as u32));
        assert!(v.progress < 1.0 && v.progress > 0.99);
        assert!((v.odometer_m - 10.0 * (MAX_TRANSITIONS_PER_TICK + 1) as f64).abs() < 0.1);
        assert_eq!(v.trail.len(), TRAIL_CAPACITY);

        // Next tick it moves on.
        sim.tick(&graph, 0.5, 1.0, &mut rng);
        assert_eq!(sim.vehicles()[0].edge, EdgeId(MAX_TRANSITIONS_PER_TICK as u32 + 1));
    }

    #[test]
    fn speed_clamped_to_limit() {
        // 18 km/h = 5 m/s.
        let graph = build_network(&[road_with(&[(0.0, 0.0), (500.0, 0.0)], 18.0)]);
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        for _ in 0..10 {
            sim.tick(&graph, 0.1, 1.0, &mut rng);
        }
        assert!((sim.vehicles()[0].odometer_m - 5.0).abs() < 1e-6);
    }

    #[test]
    fn transition_pushes_pre_transition_position() {
        let graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.95, 10.0).unwrap();
        let before = sim.vehicles()[0].pos;

        sim.tick(&graph, 1.0, 1.0, &mut rng);
        let v = &sim.vehicles()[0];
        assert_eq!(v.edge, EdgeId(1));
        assert_eq!(v.trail.to_vec(), vec![before]);
        assert_eq!(v.state, VehicleState::NeedsRoute);
    }

    #[test]
    fn trail_is_bounded() {
        let graph = grid();
        let mut rng = SimRng::new(42);
        let params = MobilityParams { trail_sample_prob: 1.0, ..MobilityParams::default() };
        let mut sim = VehicleSimulator::with_dijkstra(params);
        sim.init_vehicles(&graph, 10, &mut rng);
        for _ in 0..200 {
            sim.tick(&graph, 0.1, 1.0, &mut rng);
            assert!(sim.vehicles().iter().all(|v| v.trail.len() <= crate::TRAIL_CAPACITY));
        }
        assert!(sim.vehicles().iter().all(|v| v.trail.len() == crate::TRAIL_CAPACITY));
    }

    #[test]
    fn progress_and_edge_stay_valid() {
        let mut graph = grid();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(MobilityParams::default());
        sim.init_vehicles(&graph, 30, &mut rng);

        for step in 0..600 {
            if step % 50 == 0 {
                graph.clear_blocked();
                for e in [3u32, 7, 12, 18] {
                    let e = (e + step as u32 / 50) % graph.edge_count() as u32;
                    graph.set_blocked(EdgeId(e), true).unwrap();
                }
            }
            sim.tick(&graph, 0.1, 3.0, &mut rng);
            for v in sim.vehicles() {
                assert!((0.0..1.0).contains(&v.progress), "progress {}", v.progress);
                assert!(graph.is_usable(v.edge), "{} left on {}", v.id, v.edge);
                assert!(v.cursor < v.route.len());
                assert_eq!(v.route[v.cursor], v.edge);
            }
        }
    }

    #[test]
    fn densities_applied_in_order() {
        let graph = square_loop();
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        sim.add_vehicle(&graph, EdgeId(1), 0.0, 10.0).unwrap();
        sim.apply_densities(&[3, 1]);
        assert_eq!(sim.vehicles()[0].density, 3);
        assert_eq!(sim.vehicles()[1].density, 1);
    }
}

// ── Blocking & route resolution ───────────────────────────────────────────────

#[cfg(test)]
mod blocking {
    use super::*;
    use crate::VehicleState;

    #[test]
    fn blocked_edge_relocates_next_tick() {
        let mut graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(0), 0.5, 10.0).unwrap();
        graph.set_blocked(EdgeId(0), true).unwrap();

        sim.tick(&graph, 0.1, 1.0, &mut rng);
        let v = &sim.vehicles()[0];
        assert_ne!(v.edge, EdgeId(0));
        assert_eq!(v.progress, 0.0);
        assert_eq!(v.pos, graph.edge(v.edge).unwrap().start());
        assert_eq!(v.state, VehicleState::NeedsRelocation);
        assert_eq!(v.odometer_m, 0.0);

        sim.tick(&graph, 0.1, 1.0, &mut rng);
        assert_eq!(sim.vehicles()[0].state, VehicleState::Traveling);
        assert!(sim.vehicles()[0].odometer_m > 0.0);
    }

    #[test]
    fn all_blocked_still_terminates() {
        let mut graph = square_loop();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        sim.add_vehicle(&graph, EdgeId(2), 0.5, 10.0).unwrap();
        for i in 0..4 {
            graph.set_blocked(EdgeId(i), true).unwrap();
        }
        for _ in 0..5 {
            sim.tick(&graph, 0.1, 1.0, &mut rng);
            let v = &sim.vehicles()[0];
            assert!(v.edge.index() < graph.edge_count());
            assert_eq!(v.state, VehicleState::NeedsRelocation);
        }
    }

    #[test]
    fn reroutes_around_blocked_next_edge() {
        let mut graph = fork();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        let id = sim.add_vehicle(&graph, EdgeId(0), 0.9, 10.0).unwrap();
        sim.assign_route(id, vec![EdgeId(0), EdgeId(1), EdgeId(4)]).unwrap();
        graph.set_blocked(EdgeId(1), true).unwrap();

        sim.tick(&graph, 2.0, 1.0, &mut rng);
        let v = &sim.vehicles()[0];
        assert_eq!(v.route, vec![EdgeId(2), EdgeId(3), EdgeId(4)]);
        assert_eq!(v.edge, EdgeId(2));
        assert_eq!(v.cursor, 0);
        assert_eq!(v.state, VehicleState::NeedsRoute);
        assert!((v.odometer_m - 20.0).abs() < 1e-3);
    }

    #[test]
    fn skips_forward_when_no_detour() {
        let mut graph = fork();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        let id = sim.add_vehicle(&graph, EdgeId(0), 0.9, 10.0).unwrap();
        sim.assign_route(id, vec![EdgeId(0), EdgeId(1), EdgeId(4)]).unwrap();
        graph.set_blocked(EdgeId(1), true).unwrap();
        graph.set_blocked(EdgeId(2), true).unwrap();

        sim.tick(&graph, 2.0, 1.0, &mut rng);
        let v = &sim.vehicles()[0];
        assert_eq!(v.edge, EdgeId(4));
        assert_eq!(v.cursor, 2);
        assert!((v.progress - 0.1).abs() < 1e-3);
    }

    #[test]
    fn follows_schedule_when_clear() {
        let graph = fork();
        let mut rng = SimRng::new(42);
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        let id = sim.add_vehicle(&graph, EdgeId(0), 0.9, 10.0).unwrap();
        sim.assign_route(id, vec![EdgeId(0), EdgeId(1), EdgeId(4)]).unwrap();

        sim.tick(&graph, 2.0, 1.0, &mut rng);
        let v = &sim.vehicles()[0];
        assert_eq!(v.edge, EdgeId(1));
        assert_eq!(v.cursor, 1);
        assert_eq!(v.state, VehicleState::Traveling);
    }

    #[test]
    fn assign_route_must_start_on_current_edge() {
        let graph = fork();
        let mut sim = VehicleSimulator::with_dijkstra(quiet_params());
        let id = sim.add_vehicle(&graph, EdgeId(0), 0.0, 10.0).unwrap();
        assert!(sim.assign_route(id, vec![EdgeId(1)]).is_err());
        assert!(sim.assign_route(id, vec![]).is_err());
    }
}
