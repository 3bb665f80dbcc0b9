//! `flow-sim` — the simulation controller.
//!
//! # Frame loop
//!
//! ```text
//! every animation frame (Δt from the external clock):
//!   ① Clamp:    Δt is clamped to config.max_step_secs; paused → no-op.
//!   ② Move:     VehicleSimulator::tick relocates vehicles on blocked
//!               edges, advances the rest, resolves edge transitions.
//!   ③ Measure:  MetricsDeriver computes density, jam, CO2 and noise.
//!   ④ Snapshot: per-vehicle records + heat layers returned to the caller.
//! ```
//!
//! Between frames the caller may place or remove barriers, change the
//! vehicle count or speed multiplier, pause, or load a different network.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `geojson` | Adds `Sim::load_geojson`.                                |
//! | `serde`   | Derives `Serialize`/`Deserialize` on snapshots.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use flow_core::{SimConfig, SimRng};
//! use flow_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .network(graph)
//!     .rng(SimRng::new(42))
//!     .build()?;
//! sim.run_for(60.0, 1.0 / 60.0, &mut NoopObserver)?;
//! ```

pub mod barrier;
pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;


pub use barrier::Barrier;
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use snapshot::{PathPreview, Snapshot, StreetInfo, VehicleSnapshot};
