//! headless: runs the Motor City traffic core without a renderer.
//!
//! Lays out a small river town, starts the game clock, and simulates a
//! number of in-game seconds, logging visitor outcomes and each completed
//! week.  The final layout is written as a JSON snapshot.
//!
//! ```text
//! headless [CONFIG.json] [SECONDS]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod town;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mc_core::{BuildingId, SimConfig, SimTime};
use mc_network::AStarRouter;
use mc_sim::{Category, MapKind, SimBuilder, SimObserver, Visitor};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_SECONDS: u64 = 180;
const OUTPUT_DIR:      &str = "output/headless";

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    arrived:   u32,
    failed:    u32,
    cities:    u32,
    game_over: Option<SimTime>,
}

impl SimObserver for Tally {
    fn on_visitor_arrived(&mut self, _now: SimTime, _visitor: &Visitor, _score: u32) {
        self.arrived += 1;
    }

    fn on_visitor_failed(&mut self, _now: SimTime, _visitor: &Visitor, _failures: u32) {
        self.failed += 1;
    }

    fn on_city_founded(&mut self, _now: SimTime, _city: BuildingId, _category: Category) {
        self.cities += 1;
    }

    fn on_week_end(&mut self, now: SimTime, week: u32) {
        info!(%now, week, arrived = self.arrived, failed = self.failed, "week summary");
    }

    fn on_game_over(&mut self, now: SimTime) {
        self.game_over = Some(now);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);

    // 1. Config: JSON file or defaults.
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            SimConfig::from_json_str(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => SimConfig::default(),
    };
    let seconds: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid duration {s:?}"))?,
        None => DEFAULT_SECONDS,
    };
    info!(seed = config.seed, seconds, tick_ms = config.tick_ms, "configuration loaded");

    // 2. World.
    let mut sim = SimBuilder::new(config, AStarRouter)
        .map(MapKind::Rivers)
        .auto_start(false)
        .build()?;
    town::build(&mut sim)?;
    sim.start();

    // 3. Run.
    let mut tally = Tally::default();
    let t0 = Instant::now();
    sim.run_for(seconds * 1_000, &mut tally);
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!(
        "Simulated {:.1} s in {:.3} s ({} ticks)",
        sim.now().as_secs_f32(),
        elapsed.as_secs_f64(),
        sim.clock.ticks
    );
    println!("  week {} day {}", sim.calendar.week, sim.calendar.day_index + 1);
    println!(
        "  score {}  visits {}  failures {}/{}",
        sim.stats.score, sim.stats.visits_completed, sim.stats.failures, sim.config.failure_limit
    );
    println!(
        "  random trips {}  skipped {}  vehicles on road {}  visitors pending {}",
        sim.stats.random_trips,
        sim.stats.trips_skipped,
        sim.fleet.len(),
        sim.visitors.len()
    );
    println!(
        "  cities {} (+{} founded)  houses {}  segments {}  nodes {}",
        sim.spawner.cities.len(),
        tally.cities,
        sim.spawner.houses.len(),
        sim.network.segment_count(),
        sim.network.node_count()
    );
    println!("  pollution {:.1} over {} puffs", sim.pollution.total(), sim.pollution.puffs.len());
    if let Some(at) = tally.game_over {
        println!("  game over at {at}");
    }

    // 5. Snapshot.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let path = Path::new(OUTPUT_DIR).join("world.json");
    std::fs::write(&path, sim.snapshot().to_json()?)?;
    println!("  layout saved to {}", path.display());

    Ok(())
}
