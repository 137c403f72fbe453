use mc_core::{SegmentId, VehicleId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("route references unknown segment {0}")]
    UnknownSegment(SegmentId),

    #[error("vehicle {0} is not in the fleet")]
    UnknownVehicle(VehicleId),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
