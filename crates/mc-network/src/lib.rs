//! `mc-network`: road geometry, graph rebuild, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`segment`] | `RoadSegment`, `RoadMeta`                                   |
//! | [`builder`] | intersection splitting and node/edge unification            |
//! | [`network`] | `RoadNetwork` (segments, nodes, R-tree), `Node`, `Claim`    |
//! | [`edit`]    | drawing, roundabouts, driveways, bulldozing, water          |
//! | [`router`]  | `Router` trait, `AStarRouter`, `RouteLeg`                   |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Rebuild model
//!
//! Segments are the source of truth.  Nodes and edges are derived and are
//! recomputed wholesale by [`RoadNetwork::rebuild_graph`] after every
//! geometry mutation; `NodeId`s from a previous rebuild must not be reused.
//! `SegmentId`s are stable across rebuilds.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `RoadMeta`, `WaterRect`. |

pub mod builder;
pub mod edit;
pub mod error;
pub mod network;
pub mod router;
pub mod segment;


pub use edit::WaterRect;
pub use error::{NetworkError, NetworkResult};
pub use network::{Claim, Edge, Node, RoadNetwork};
pub use router::{AStarRouter, RouteLeg, Router};
pub use segment::{RoadMeta, RoadSegment};
