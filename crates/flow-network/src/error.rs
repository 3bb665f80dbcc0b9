//! Network-subsystem error type.

use thiserror::Error;

use flow_core::{EdgeId, FlowError, NodeId};

/// Errors produced by `flow-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[cfg(feature = "geojson")]
    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error(transparent)]
    Core(#[from] FlowError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
