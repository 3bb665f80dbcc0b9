use flow_core::{BarrierId, FlowError};
use flow_mobility::MobilityError;
use flow_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] FlowError),

    #[error("step length {0} s must be positive and finite")]
    InvalidStep(f64),

    #[error("run duration {0} s must be finite and non-negative")]
    InvalidDuration(f64),

    #[error("barrier {0} does not exist")]
    UnknownBarrier(BarrierId),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),
}

pub type SimResult<T> = Result<T, SimError>;
