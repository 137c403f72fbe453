//! Starting map layouts and the water they place.

use serde::{Deserialize, Serialize};

use mc_core::WorldBounds;
use mc_network::WaterRect;

/// Height of the coastal strip along the bottom edge.
const COAST_DEPTH: f32 = 110.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    #[default]
    Plains,
    /// One full-height river.
    Rivers,
    /// A coast along the bottom plus a narrow channel.
    Coasts,
}

impl MapKind {
    /// Water areas for this layout inside `bounds`.
    pub fn water_rects(self, bounds: &WorldBounds) -> Vec<WaterRect> {
        let (x0, y0) = (bounds.min.x, bounds.min.y);
        let (w, h) = (bounds.width(), bounds.height());
        match self {
            MapKind::Plains => Vec::new(),
            MapKind::Rivers => vec![WaterRect::from_origin(x0 + w * 0.42, y0, w * 0.12, h)],
            MapKind::Coasts => vec![
                WaterRect::from_origin(x0, y0 + h - COAST_DEPTH, w, COAST_DEPTH),
                WaterRect::from_origin(x0 + w * 0.46, y0, w * 0.08, h),
            ],
        }
    }
}
