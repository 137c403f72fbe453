//! `mc-core`: foundational types for the Motor City traffic simulation.
//!
//! This crate is a dependency of every other `mc-*` crate.  It intentionally
//! has no `mc-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `SegmentId`, `VehicleId`, `VisitorId`, `BuildingId` |
//! | [`geo`]         | `Point`, cross/dot products, proper line intersection |
//! | [`time`]        | `SimTime`, `SimClock`                                 |
//! | [`config`]      | `SimConfig`, `WorldBounds`                            |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types and     |
//! |         | enables `SimConfig::from_json_str`.                        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimConfig, WorldBounds};
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{BuildingId, NodeId, SegmentId, VehicleId, VisitorId};
pub use rng::SimRng;
pub use time::{SimClock, SimTime};
