//! Exhaust puffs emitted by occupied segments.

use mc_core::{Point, SimRng};
use mc_network::RoadNetwork;

/// Value of a freshly emitted puff.
const PUFF_VALUE: f32 = 1.5;

/// Puffs at or below this value are discarded.
const PUFF_FLOOR: f32 = 0.15;

/// Decay factor applied per [`DECAY_STEP_MS`] of simulated time.
const DECAY_PER_STEP: f32 = 0.985;
const DECAY_STEP_MS: f32 = 16.0;

/// Most puffs one segment emits per sample.
const MAX_PUFFS_PER_SEGMENT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Puff {
    pub pos: Point,
    pub value: f32,
}

#[derive(Debug, Default)]
pub struct Pollution {
    pub puffs: Vec<Puff>,
}

impl Pollution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `clamp(occupancy / 3, 1, 3)` puffs from each occupied segment at
    /// random points along it.
    pub fn sample(&mut self, network: &RoadNetwork, rng: &mut SimRng) {
        for seg in network.segments.values() {
            if seg.occupancy == 0 || seg.points.len() < 2 {
                continue;
            }
            let count = (seg.occupancy / 3).clamp(1, MAX_PUFFS_PER_SEGMENT);
            for _ in 0..count {
                let i = rng.gen_range(0..seg.points.len() - 1);
                let (a, b) = (seg.points[i], seg.points[i + 1]);
                let t: f32 = rng.random();
                let pos = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                self.puffs.push(Puff { pos, value: PUFF_VALUE });
            }
        }
    }

    pub fn decay(&mut self, delta_ms: u64) {
        if self.puffs.is_empty() {
            return;
        }
        let factor = DECAY_PER_STEP.powf(delta_ms as f32 / DECAY_STEP_MS);
        for p in &mut self.puffs {
            p.value *= factor;
        }
        self.puffs.retain(|p| p.value > PUFF_FLOOR);
    }

    /// Sum of all puff values.
    pub fn total(&self) -> f32 {
        self.puffs.iter().map(|p| p.value).sum()
    }

    pub fn clear(&mut self) {
        self.puffs.clear();
    }
}
