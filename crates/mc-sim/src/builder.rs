//! Fluent builder for constructing a [`Sim`].

use mc_core::SimConfig;
use mc_network::{RoadNetwork, Router};

use crate::calendar::Calendar;
use crate::map::MapKind;
use crate::sim::SimStats;
use crate::snapshot::WorldSnapshot;
use crate::spawner::Spawner;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed, timer periods, world bounds, …
/// - `R: Router`: the routing algorithm (e.g. [`mc_network::AStarRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                                        |
/// |--------------------|------------------------------------------------|
/// | `.network(n)`      | Empty network on `config.grid`                 |
/// | `.map(kind)`       | `MapKind::Plains` (no water)                   |
/// | `.snapshot(s)`     | Fresh world                                    |
/// | `.auto_start(b)`   | `true`: `build` calls [`Sim::start`]           |
///
/// A snapshot replaces the network's segments and water; `.map(..)` is
/// ignored when one is given.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default(), AStarRouter)
///     .map(MapKind::Rivers)
///     .build()?;
/// sim.run_for(60_000, &mut NoopObserver);
/// ```
pub struct SimBuilder<R: Router> {
    config: SimConfig,
    router: R,
    network: Option<RoadNetwork>,
    map: MapKind,
    snapshot: Option<WorldSnapshot>,
    auto_start: bool,
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: SimConfig, router: R) -> Self {
        Self { config, router, network: None, map: MapKind::Plains, snapshot: None, auto_start: true }
    }

    /// Start from an existing network instead of an empty one.
    pub fn network(mut self, network: RoadNetwork) -> Self {
        self.network = Some(network);
        self
    }

    /// Seed the water areas of a fresh world.
    pub fn map(mut self, map: MapKind) -> Self {
        self.map = map;
        self
    }

    /// Restore a saved world.
    pub fn snapshot(mut self, snapshot: WorldSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Whether `build` calls [`Sim::start`].  Disable to script the world
    /// before any city or timer exists.
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Shorthand for `SimBuilder::new(config, router).snapshot(snapshot)`.
    pub fn from_snapshot(config: SimConfig, router: R, snapshot: WorldSnapshot) -> Self {
        Self::new(config, router).snapshot(snapshot)
    }

    /// Validate the config, assemble the world, and rebuild the graph.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;

        let mut network = self
            .network
            .unwrap_or_else(|| RoadNetwork::new(self.config.grid, self.config.node_snap_tolerance));

        // ── World contents ────────────────────────────────────────────────
        let (spawner, calendar, stats) = match self.snapshot {
            Some(snap) => {
                network.segments.clear();
                for record in snap.segments {
                    network.insert_segment(record.points, record.meta);
                }
                network.water = snap.water;
                let stats = SimStats { score: snap.score, ..SimStats::default() };
                (
                    Spawner::restore(self.config.world, snap.cities, snap.houses),
                    Calendar::at(snap.week, snap.day_index),
                    stats,
                )
            }
            None => {
                network.water.extend(self.map.water_rects(&self.config.world));
                (Spawner::new(self.config.world), Calendar::new(), SimStats::default())
            }
        };
        network.rebuild_graph();

        let mut sim = Sim::assemble(self.config, network, spawner, calendar, stats, self.router);
        if self.auto_start {
            sim.start();
        }
        Ok(sim)
    }
}
