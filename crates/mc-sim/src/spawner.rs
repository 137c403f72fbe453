//! Houses, cities, and the rules that place them.
//!
//! Every building is connected to the nearest road with a driveway when it
//! is placed.  Driveways change the geometry, so callers holding a fleet
//! must re-attach waiting vehicles afterwards (`Sim` does this).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mc_core::{BuildingId, Point, SimRng, WorldBounds};
use mc_network::RoadNetwork;

/// Half-extents of the box around a new city in which its houses appear.
const CITY_HOUSE_SPREAD: (i32, i32) = (160, 120);

/// Houses placed per category when a city is founded.
const HOUSES_PER_CITY: usize = 2;

// ── Category ──────────────────────────────────────────────────────────────────

/// Colour category linking houses to the cities they visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Yellow,
    Red,
    Blue,
    Green,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Yellow, Category::Red, Category::Blue, Category::Green];

    /// RGB colour used by hosts to draw buildings and visitor vehicles.
    pub fn color(self) -> u32 {
        match self {
            Category::Yellow => 0xfff176,
            Category::Red => 0xef5350,
            Category::Blue => 0x64b5f6,
            Category::Green => 0x81c784,
        }
    }

    pub fn random(rng: &mut SimRng) -> Category {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ── Building ──────────────────────────────────────────────────────────────────

/// A house or a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub pos: Point,
    pub category: Category,
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Spawner {
    pub cities: Vec<Building>,
    pub houses: Vec<Building>,
    bounds: WorldBounds,
    last_city: Option<Category>,
    next_id: BuildingId,
}

impl Spawner {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            cities: Vec::new(),
            houses: Vec::new(),
            bounds,
            last_city: None,
            next_id: BuildingId(0),
        }
    }

    /// Restore saved buildings without placing extra houses or driveways.
    pub fn restore(bounds: WorldBounds, cities: Vec<Building>, houses: Vec<Building>) -> Self {
        let next_id = cities
            .iter()
            .chain(&houses)
            .map(|b| b.id.next())
            .max()
            .unwrap_or(BuildingId(0));
        let last_city = cities.last().map(|c| c.category);
        Self { cities, houses, bounds, last_city, next_id }
    }

    fn allocate(&mut self) -> BuildingId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    pub fn city(&self, id: BuildingId) -> Option<&Building> {
        self.cities.iter().find(|c| c.id == id)
    }

    pub fn house(&self, id: BuildingId) -> Option<&Building> {
        self.houses.iter().find(|h| h.id == id)
    }

    /// Cities sharing `category`, in founding order.
    pub fn cities_of(&self, category: Category) -> impl Iterator<Item = &Building> + '_ {
        self.cities.iter().filter(move |c| c.category == category)
    }

    /// Category of the most recently founded city.
    pub fn last_city_category(&self) -> Option<Category> {
        self.last_city
    }

    /// Place a house at `pos` (clamped to the world) and connect it.
    ///
    /// A missing `category` is drawn at random.
    pub fn make_house(
        &mut self,
        network: &mut RoadNetwork,
        rng: &mut SimRng,
        pos: Point,
        category: Option<Category>,
    ) -> BuildingId {
        let category = category.unwrap_or_else(|| Category::random(rng));
        let pos = self.bounds.clamp(pos);
        let id = self.allocate();
        self.houses.push(Building { id, pos, category });
        let driveway = network.connect_building(pos);
        debug!(%id, ?category, x = pos.x, y = pos.y, connected = driveway.is_some(), "house placed");
        id
    }

    /// Found a city at `pos` with its surrounding houses.
    ///
    /// Two houses of the city's category appear in a ±160 × ±120 box; if the
    /// previous city had another category, two of that category follow.
    pub fn make_city(
        &mut self,
        network: &mut RoadNetwork,
        rng: &mut SimRng,
        pos: Point,
        category: Option<Category>,
    ) -> BuildingId {
        let category = category.unwrap_or_else(|| Category::random(rng));
        let pos = self.bounds.clamp(pos);
        let id = self.allocate();
        self.cities.push(Building { id, pos, category });
        network.connect_building(pos);
        info!(%id, ?category, x = pos.x, y = pos.y, "city founded");

        self.spawn_around(network, rng, pos, category);
        if let Some(prev) = self.last_city.filter(|&prev| prev != category) {
            self.spawn_around(network, rng, pos, prev);
        }
        self.last_city = Some(category);
        id
    }

    fn spawn_around(&mut self, network: &mut RoadNetwork, rng: &mut SimRng, center: Point, category: Category) {
        let (sx, sy) = CITY_HOUSE_SPREAD;
        for _ in 0..HOUSES_PER_CITY {
            let dx = rng.gen_range(-sx..=sx) as f32;
            let dy = rng.gen_range(-sy..=sy) as f32;
            self.make_house(network, rng, center.offset(dx, dy), Some(category));
        }
    }
}
