//! `mc-sim`: the game loop around the road network and the fleet.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`sim`]         | `Sim`, `SimStats`: per-step loop, trips, edits           |
//! | [`builder`]     | `SimBuilder`: config validation, world assembly          |
//! | [`events`]      | `EventQueue`, `SimEvent`: scheduled timers               |
//! | [`calendar`]    | `Calendar`: days, weeks, the mid-week trigger            |
//! | [`spawner`]     | `Spawner`, `Building`, `Category`: houses and cities     |
//! | [`visitor`]     | `Visitor`, `Visitors`: deadlines and arrival checks      |
//! | [`pollution`]   | `Pollution`: exhaust puffs from occupied segments        |
//! | [`map`]         | `MapKind`: starting water layouts                        |
//! | [`snapshot`]    | `WorldSnapshot`: persisted layout (serde JSON)           |
//! | [`observer`]    | `SimObserver`, `NoopObserver`                            |
//! | [`error`]       | `SimError`, `SimResult<T>`                               |
//!
//! # Step order
//!
//! ```text
//! step(delta_ms):
//!   ① Events   :  pop every event due by `now`: random traffic, visitor
//!                 wave, day change, pollution sample, blocked-flag reset.
//!                 Recurring events re-schedule themselves.
//!   ② Vehicles :  Fleet::update; segments with a vehicle held or waiting
//!                 at their end stay `blocked` for `config.blocked_flag_ms`.
//!   ③ Visitors :  expired deadlines fail, vehicles near their city arrive;
//!                 score, failures and game over follow.
//!   ④ Pollution:  puffs decay.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mc_core::SimConfig;
//! use mc_network::AStarRouter;
//! use mc_sim::{MapKind, NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), AStarRouter)
//!     .map(MapKind::Coasts)
//!     .build()?;
//! sim.run_for(30_000, &mut NoopObserver);
//! println!("score {}", sim.stats.score);
//! ```

pub mod builder;
pub mod calendar;
pub mod error;
pub mod events;
pub mod map;
pub mod observer;
pub mod pollution;
pub mod sim;
pub mod snapshot;
pub mod spawner;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use calendar::{Calendar, DayChange};
pub use error::{SimError, SimResult};
pub use events::{EventQueue, SimEvent};
pub use map::MapKind;
pub use observer::{NoopObserver, SimObserver};
pub use pollution::{Pollution, Puff};
pub use sim::{Sim, SimStats};
pub use snapshot::{SegmentRecord, WorldSnapshot};
pub use spawner::{Building, Category, Spawner};
pub use visitor::{VisitOutcome, Visitor, Visitors};
