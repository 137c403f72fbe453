use mc_core::CoreError;
use mc_network::NetworkError;
use mc_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("road network error: {0}")]
    Network(#[from] NetworkError),

    #[error("traffic error: {0}")]
    Traffic(#[from] TrafficError),
}

pub type SimResult<T> = Result<T, SimError>;
