//! Scripted starting town: two streets on each side of the river, three
//! bridges, a highway along the bottom and a roundabout at the east end.
//!
//! ```text
//!   y=128   ────────┬────────[≈≈≈≈]───────┬──────────
//!                   │                     │
//!   y=320   ────────┼────────[≈≈≈≈]───────┼─────( )
//!                   │                     │ one-way
//!   y=576   ════════╧════════[≈≈≈≈]═══════╧══════════  highway
//!         x=96    x=320      river      x=960   x=1184
//! ```

use anyhow::{Context, Result};

use mc_core::Point;
use mc_network::{AStarRouter, RoadMeta};
use mc_sim::Sim;

fn pt(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Lay the town out on a sim that has not been started.
pub fn build(sim: &mut Sim<AStarRouter>) -> Result<()> {
    let west = 96.0;
    let east = 1184.0;
    let bank_w = 512.0;
    let bank_e = 704.0;

    // West bank.
    for y in [128.0, 320.0] {
        sim.add_road(&[pt(west, y), pt(bank_w, y)], RoadMeta::street())
            .with_context(|| format!("west street at y={y}"))?;
    }
    sim.add_road(&[pt(320.0, 128.0), pt(320.0, 576.0)], RoadMeta::street())?;

    // East bank.
    for (y, end) in [(128.0, east), (320.0, 1088.0)] {
        sim.add_road(&[pt(bank_e, y), pt(end, y)], RoadMeta::street())
            .with_context(|| format!("east street at y={y}"))?;
    }
    sim.add_road(&[pt(960.0, 128.0), pt(960.0, 576.0)], RoadMeta::street().one_way(true))?;

    // Crossings.
    sim.add_road(&[pt(bank_w, 128.0), pt(bank_e, 128.0)], RoadMeta::bridge())?;
    sim.add_road(&[pt(bank_w, 320.0), pt(bank_e, 320.0)], RoadMeta::bridge().lanes(2))?;
    sim.add_road(&[pt(west, 576.0), pt(bank_w, 576.0)], RoadMeta::highway())?;
    sim.add_road(&[pt(bank_w, 576.0), pt(bank_e, 576.0)], RoadMeta::bridge().lanes(3).priority(3))?;
    sim.add_road(&[pt(bank_e, 576.0), pt(east, 576.0)], RoadMeta::highway())?;

    let ring = sim.place_roundabout(pt(1184.0, 320.0));
    tracing::info!(
        segments = sim.network.segment_count(),
        nodes = sim.network.node_count(),
        edges = sim.network.edge_count(),
        roundabout = ring.len(),
        "town laid out"
    );
    Ok(())
}
