//! `flow-mobility` — simulated vehicles and the per-tick motion integrator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle`, `VehicleState`, bounded `Trail`                    |
//! | [`simulator`] | `VehicleSimulator<R>`: initialisation, ticking, relocation   |
//! | [`error`]     | `MobilityError`, `MobilityResult<T>`                          |
//!
//! # Movement model (continuous edge progress)
//!
//! Each vehicle sits on one edge at a fractional `progress ∈ [0, 1)`.  A tick
//! of `Δt` seconds moves it `speed · multiplier · Δt` metres, where `speed` is
//! the vehicle's own speed clamped to the edge's speed limit.  Reaching the
//! end of an edge resolves the next edge from the vehicle's route (rerouting
//! around blocked edges when needed) and carries the leftover distance onto
//! it.  Vehicles caught on a blocked edge are relocated on their next tick.

pub mod error;
pub mod simulator;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{MobilityError, MobilityResult};
pub use simulator::{MobilityParams, VehicleSimulator};
pub use vehicle::{TRAIL_CAPACITY, Trail, Vehicle, VehicleState};
