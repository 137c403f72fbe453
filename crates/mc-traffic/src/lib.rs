//! `mc-traffic`: vehicles, congestion, and junction right-of-way.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`vehicle`]      | `Vehicle`, `LegRange`, `VehicleOptions`, congestion model |
//! | [`arbitration`]  | `can_proceed`: right-hand rule with a cycle fallback     |
//! | [`fleet`]        | `Fleet`: vehicle ownership, per-tick update, removal     |
//! | [`error`]        | `TrafficError`, `TrafficResult<T>`                       |
//!
//! # Movement model
//!
//! Vehicles move linearly between consecutive route points at
//! `speed × congestion_factor`.  At the end of each leg the vehicle asks
//! for the junction node:
//!
//! 1. Granted: it locks the node, moves its occupancy count onto the next
//!    segment, and releases the lock once it reaches the first point past
//!    the junction.
//! 2. Denied: it queues a claim on the node and waits in place, retrying
//!    every tick.
//!
//! Node state lives in `mc_network::RoadNetwork`; vehicles hold only ids
//! and positions, so the fleet can be updated with one `&mut RoadNetwork`.

pub mod arbitration;
pub mod error;
pub mod fleet;
pub mod vehicle;


pub use arbitration::can_proceed;
pub use error::{TrafficError, TrafficResult};
pub use fleet::{Fleet, FleetTick};
pub use vehicle::{congestion_factor, Advance, LegRange, Vehicle, VehicleOptions, VehicleState};
