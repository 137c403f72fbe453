//! Network-subsystem error type.

use thiserror::Error;

use mc_core::SegmentId;

/// Errors produced by geometry edits in `mc-network`.
///
/// Routing never errors: an unreachable goal is `None`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("road needs at least two distinct points, got {points}")]
    Degenerate { points: usize },

    #[error("road crosses water; build it as a bridge")]
    CrossesWater,

    #[error("segment {0} not found in network")]
    SegmentNotFound(SegmentId),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
