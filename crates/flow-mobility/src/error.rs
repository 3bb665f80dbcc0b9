use flow_core::{EdgeId, VehicleId};
use flow_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("edge {0} does not exist")]
    UnknownEdge(EdgeId),

    #[error("edge {0} is blocked")]
    EdgeBlocked(EdgeId),

    #[error("vehicle {0} does not exist")]
    UnknownVehicle(VehicleId),

    #[error("progress {0} is outside [0, 1)")]
    InvalidProgress(f64),

    #[error("speed {0} m/s must be positive and finite")]
    InvalidSpeed(f64),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
