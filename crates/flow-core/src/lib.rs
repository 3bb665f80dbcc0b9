//! `flow-core` — foundational types for the `flow` traffic simulation engine.
//!
//! This crate is a dependency of every other `flow-*` crate.  It has no
//! `flow-*` dependencies and only `rand` and `thiserror` as external ones
//! (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `VehicleId`, `BarrierId`            |
//! | [`geo`]         | `Coordinate`, haversine distance, path length, projection |
//! | [`config`]      | `SimConfig`, `SimClock`                                 |
//! | [`rng`]         | `SimRng` (seedable simulation RNG)                      |
//! | [`vehicle_class`] | `VehicleClass` enum for allowed-vehicle lists         |
//! | [`error`]       | `FlowError`, `FlowResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod vehicle_class;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimClock, SimConfig};
pub use error::{FlowError, FlowResult};
pub use geo::{Coordinate, Projection, distance, path_length};
pub use ids::{BarrierId, EdgeId, NodeId, VehicleId};
pub use rng::SimRng;
pub use vehicle_class::VehicleClass;
