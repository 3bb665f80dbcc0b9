//! `flow-metrics` — per-tick density and heat-map values.
//!
//! Consumes a read-only snapshot of vehicle positions and produces values
//! only; rendering is left to the caller.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`density`] | Pairwise proximity counts                                  |
//! | [`levels`]  | `JamLevel`, CO2 and noise intensity proxies                |
//! | [`layer`]   | `Layer` names and `HeatSample` points                      |
//! | [`frame`]   | `MetricsDeriver`, `MetricsFrame`, `MetricsSummary`         |

pub mod density;
pub mod frame;
pub mod layer;
pub mod levels;


pub use density::densities;
pub use frame::{MetricsDeriver, MetricsFrame, MetricsSummary, VehicleMetrics, VehicleSample};
pub use layer::{HeatSample, Layer};
pub use levels::{JamLevel, co2_intensity, noise_intensity};
