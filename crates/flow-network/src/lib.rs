//! `flow-network` — road network graph, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`feature`] | `RoadFeature`, `RoadAttributes`, `RoadClass` input records  |
//! | [`network`] | `NetworkGraph`, `Node`, `Edge`, `NetworkBuilder`            |
//! | [`spatial`] | R-tree indexes behind nearest-node / nearest-edge queries   |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, random routes    |
//! | [`geojson`] | FeatureCollection adapter (feature = `"geojson"` only)      |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                       |
//! |-----------|--------------------------------------------------------------|
//! | `geojson` | Enables GeoJSON loading via the `geojson` crate.             |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public record types.    |

pub mod error;
pub mod feature;
pub mod network;
pub mod router;
pub mod spatial;

#[cfg(feature = "geojson")]
pub mod geojson;


pub use error::{NetworkError, NetworkResult};
pub use feature::{FeatureGeometry, RoadAttributes, RoadClass, RoadFeature};
pub use network::{Adjacent, Edge, NetworkBuilder, NetworkGraph, Node, build_network};
pub use router::{
    DijkstraRouter, Route, Router, random_route, random_route_from, random_walk, shortest_path,
};
pub use spatial::EdgeHit;
