//! Top-level simulation configuration.
//!
//! Typically loaded from a JSON file by the application crate (see
//! [`SimConfig::from_json_str`], feature `serde`) and passed to the
//! simulation builder.  Every field has a default matching the shipped game
//! balance, so a config file only needs to name the values it overrides.

use crate::{CoreError, CoreResult, Point};

/// Rectangle inside which the spawner may found new cities.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldBounds {
    pub min: Point,
    pub max: Point,
}

impl WorldBounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    /// Clamp `p` into the rectangle.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(1280.0, 720.0))
    }
}

/// Simulation tuning knobs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Fixed tick length used by `Sim::run_for`.  Default: 16 ms (~60 Hz).
    pub tick_ms: u64,

    /// Period of the random-traffic timer.  Default: 2 500 ms.
    pub random_traffic_every_ms: u64,

    /// Period of the visitor-wave timer.  Default: 5 000 ms.
    pub visitor_wave_every_ms: u64,

    /// Per-house probability of emitting a visitor on each wave.
    pub visitor_probability: f64,

    /// Visitor deadline in simulated seconds.  Default: 120.
    pub visitor_time_limit_secs: f32,

    /// Distance from the city at which a visitor counts as arrived.
    pub arrival_radius: f32,

    /// Points awarded per completed visit.
    pub score_per_visit: u32,

    /// Failed visits that end the game.  Default: 8.
    pub failure_limit: u32,

    /// Length of one in-game day.  Default: 15 000 ms.
    pub day_ms: u64,

    /// Area in which mid-week cities are founded.
    pub world: WorldBounds,

    /// Build grid side used when snapping drawn geometry.  Default: 32.
    pub grid: f32,

    /// Radius within which a drawn endpoint snaps onto an existing node.
    pub node_snap_tolerance: f32,

    /// How long a segment stays flagged `blocked` after a vehicle is held
    /// at its end.  Default: 800 ms.
    pub blocked_flag_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                    42,
            tick_ms:                 16,
            random_traffic_every_ms: 2_500,
            visitor_wave_every_ms:   5_000,
            visitor_probability:     0.05,
            visitor_time_limit_secs: 120.0,
            arrival_radius:          22.0,
            score_per_visit:         10,
            failure_limit:           8,
            day_ms:                  15_000,
            world:                   WorldBounds::default(),
            grid:                    32.0,
            node_snap_tolerance:     20.0,
            blocked_flag_ms:         800,
        }
    }
}

impl SimConfig {
    /// Reject values that would stall timers or break geometry snapping.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_ms == 0 {
            return Err(CoreError::Config("tick_ms must be > 0".into()));
        }
        if self.random_traffic_every_ms == 0 || self.visitor_wave_every_ms == 0 || self.day_ms == 0 {
            return Err(CoreError::Config("timer periods must be > 0".into()));
        }
        if self.grid.is_nan() || self.grid <= 0.0 {
            return Err(CoreError::Config(format!("grid must be positive, got {}", self.grid)));
        }
        if !(0.0..=1.0).contains(&self.visitor_probability) {
            return Err(CoreError::Config(format!(
                "visitor_probability must be in [0, 1], got {}",
                self.visitor_probability
            )));
        }
        if self.world.width() <= 0.0 || self.world.height() <= 0.0 {
            return Err(CoreError::Config("world bounds are empty".into()));
        }
        Ok(())
    }

    /// Visitor deadline in milliseconds.
    #[inline]
    pub fn visitor_time_limit_ms(&self) -> u64 {
        (self.visitor_time_limit_secs.max(0.0) * 1000.0) as u64
    }

    /// Parse a JSON config; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
