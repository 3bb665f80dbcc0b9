//! loop_city — runnable demo of the flow traffic engine.
//!
//! Builds a synthetic street grid (or loads the GeoJSON file given as the
//! first argument), drives the simulation for a minute of simulated time,
//! drops a barrier halfway through, and writes CSV output.
//!
//! ```text
//! cargo run -p loop_city                      # synthetic 4×4 grid
//! cargo run -p loop_city -- roads.geojson     # your own network
//! RUST_LOG=debug cargo run -p loop_city       # verbose engine logging
//! ```

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;

use flow_core::{SimConfig, SimRng};
use flow_metrics::Layer;
use flow_network::NetworkGraph;
use flow_output::{CsvWriter, SnapshotOutputObserver};
use flow_sim::SimBuilder;

use network::{grid_city, offset};

// ── Constants ─────────────────────────────────────────────────────────────────

const VEHICLE_COUNT:   usize = 150;
const SEED:            u64   = 42;
const FRAME_SECS:      f64   = 1.0 / 60.0;
const HALF_RUN_SECS:   f64   = 30.0;
const OUTPUT_INTERVAL: u64   = 60; // vehicle rows once per simulated second
const GRID_SIZE:       usize = 4;
const BLOCK_M:         f64   = 150.0;
const OUTPUT_DIR:      &str  = "output/loop_city";

fn load_graph() -> Result<NetworkGraph> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            let graph = flow_network::geojson::load_network_from_str(&text)
                .with_context(|| format!("parsing {path}"))?;
            Ok(graph)
        }
        None => Ok(grid_city(GRID_SIZE, BLOCK_M)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Network.
    let graph = load_graph()?;
    if graph.is_empty() {
        bail!("the network has no usable road segments");
    }
    println!("Road network: {} nodes, {} edges", graph.node_count(), graph.edge_count());

    // 2. Simulation.
    let config = SimConfig {
        vehicle_count: VEHICLE_COUNT,
        seed:          Some(SEED),
        ..SimConfig::default()
    };
    let mut sim = SimBuilder::new(config).network(graph).rng(SimRng::new(SEED)).build()?;
    println!("Vehicles: {}", sim.vehicles().len());

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer  = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = SnapshotOutputObserver::new(writer, OUTPUT_INTERVAL);

    // 4. First half, then a barrier on the middle of the grid.
    let t0 = Instant::now();
    sim.run_for(HALF_RUN_SECS, FRAME_SECS, &mut obs)?;

    let half   = GRID_SIZE as f64 * BLOCK_M / 2.0;
    let centre = offset(half + BLOCK_M / 4.0, half + 4.0);
    let barrier = sim.place_barrier(centre);
    match sim.street_info(centre) {
        Some(street) => info!(
            "{barrier} placed on {} ({} {}, {:.0} km/h, {:.0} m)",
            street.name, street.class, street.class.color(), street.speed_kmh, street.length_m
        ),
        None => info!("{barrier} placed off-network"),
    }

    // 5. Second half.
    sim.run_for(HALF_RUN_SECS, FRAME_SECS, &mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    let snapshot = sim.snapshot();
    let summary  = snapshot.metrics.summary;
    println!();
    println!("Simulated {} in {:.3} s wall time", sim.clock(), elapsed.as_secs_f64());
    println!("  vehicles      : {}", summary.vehicle_count);
    println!("  mean density  : {:.2}", summary.mean_density);
    println!("  heavy jams    : {}", summary.heavy_jams);
    println!("  blocked edges : {}", snapshot.blocked_edges.len());
    for layer in Layer::HEAT {
        let samples = snapshot.metrics.heat(layer);
        let peak = samples.iter().map(|s| s.intensity).fold(0.0, f64::max);
        let stops: Vec<String> =
            layer.gradient().iter().map(|(w, c)| format!("{w}:{c}")).collect();
        println!("  {:<13} : peak {:.2}  [{}]", layer.label(), peak, stops.join(" "));
    }
    println!();
    println!("{:<8} {:<8} {:>10} {:>8}", "Vehicle", "Edge", "Odometer", "Jam");
    println!("{}", "-".repeat(38));
    for v in snapshot.vehicles.iter().take(10) {
        println!("{:<8} {:<8} {:>9.0}m {:>8}", v.id.0, v.edge.0, v.odometer_m, v.jam().as_str());
    }

    let previews = sim.path_previews(3);
    println!();
    for (i, p) in previews.iter().enumerate() {
        println!("preview {i}: {} edges, {} points", p.edges.len(), p.coords.len());
    }
    println!("CSV written to {OUTPUT_DIR}/");
    Ok(())
}
