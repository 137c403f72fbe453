//! Persisted world layout.
//!
//! A snapshot holds authored state only.  The graph, vehicles, visitors, and
//! pollution are not saved; loading rebuilds the graph from the segments.

use serde::{Deserialize, Serialize};

use mc_core::Point;
use mc_network::{RoadMeta, WaterRect};

use crate::spawner::Building;
use crate::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub points: Vec<Point>,
    pub meta: RoadMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub week: u32,
    pub day_index: u8,
    pub score: u32,
    pub segments: Vec<SegmentRecord>,
    pub cities: Vec<Building>,
    pub houses: Vec<Building>,
    pub water: Vec<WaterRect>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            week: 1,
            day_index: 0,
            score: 0,
            segments: Vec::new(),
            cities: Vec::new(),
            houses: Vec::new(),
            water: Vec::new(),
        }
    }
}

impl WorldSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string(self).map_err(|e| SimError::Snapshot(e.to_string()))
    }

    /// Parse a snapshot; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|e| SimError::Snapshot(e.to_string()))
    }
}
