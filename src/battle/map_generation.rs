//! Procedural battle map generators
//!
//! Three layouts: open field, walled city (siege) and naval. Each tile is
//! rolled independently; the siege layout overlays a hex-ring wall on top.

use rand::Rng;

use crate::battle::battle_map::{BattleMap, MapKind};
use crate::battle::constants::*;
use crate::battle::hex::HexCoord;
use crate::battle::terrain::Terrain;
use crate::core::types::CityId;

/// Any battle over a real city is a siege; the zero sentinel is a field battle.
pub fn is_siege_battle(city: CityId) -> bool {
    !city.is_none()
}

/// Generated map plus the gate positions the generator placed
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub kind: MapKind,
    pub map: BattleMap,
    pub gates: Vec<HexCoord>,
}

/// Generate a map of the requested kind
pub fn generate(kind: MapKind, width: u32, height: u32, rng: &mut impl Rng) -> GeneratedMap {
    match kind {
        MapKind::Field => GeneratedMap {
            kind,
            map: generate_field_map(width, height, rng),
            gates: Vec::new(),
        },
        MapKind::Siege => {
            let (map, gates) = generate_siege_map(width, height, rng);
            GeneratedMap { kind, map, gates }
        }
        MapKind::Naval => GeneratedMap {
            kind,
            map: generate_naval_map(width, height, rng),
            gates: Vec::new(),
        },
    }
}

fn roll_field_terrain(rng: &mut impl Rng) -> Terrain {
    let roll = rng.gen_range(0..100);
    if roll < FIELD_MOUNTAIN_PERCENT {
        Terrain::Mountain
    } else if roll < FIELD_MOUNTAIN_PERCENT + FIELD_FOREST_PERCENT {
        Terrain::Forest
    } else if roll < FIELD_MOUNTAIN_PERCENT + FIELD_FOREST_PERCENT + FIELD_RIVER_PERCENT {
        Terrain::River
    } else {
        Terrain::Plain
    }
}

/// Open field: 10% mountain, 10% forest, 5% river, rest plain
pub fn generate_field_map(width: u32, height: u32, rng: &mut impl Rng) -> BattleMap {
    let mut map = BattleMap::new(width, height);
    for coord in map.coords().collect::<Vec<_>>() {
        map.set_terrain(coord, roll_field_terrain(rng));
    }
    map
}

/// Wall radius for a siege canvas
pub fn wall_radius(width: u32, height: u32) -> u32 {
    width.min(height) / 4
}

/// Walled city centered on the map.
///
/// The ring at the wall radius is wall (mountain terrain), the four ring
/// cells on the q and r axes through the center are gates, the inside is
/// city and the outside is rolled like an open field.
pub fn generate_siege_map(width: u32, height: u32, rng: &mut impl Rng) -> (BattleMap, Vec<HexCoord>) {
    let mut map = BattleMap::new(width, height);
    let center = map.center();
    let radius = wall_radius(width, height);

    for coord in map.coords().collect::<Vec<_>>() {
        let dist = coord.distance(&center);
        let terrain = if dist == radius {
            Terrain::Mountain
        } else if dist < radius {
            Terrain::City
        } else {
            roll_field_terrain(rng)
        };
        map.set_terrain(coord, terrain);
    }

    let r = radius as i32;
    let gates: Vec<HexCoord> = [(r, 0), (-r, 0), (0, r), (0, -r)]
        .into_iter()
        .map(|(dq, dr)| HexCoord::new(center.q + dq, center.r + dr))
        .filter(|coord| map.in_bounds(*coord))
        .collect();
    for gate in &gates {
        map.set_terrain(*gate, Terrain::Gate);
    }

    (map, gates)
}

/// Naval: 80% river, 10% islands (plain), 10% reefs (mountain)
pub fn generate_naval_map(width: u32, height: u32, rng: &mut impl Rng) -> BattleMap {
    let mut map = BattleMap::new(width, height);
    for coord in map.coords().collect::<Vec<_>>() {
        let roll = rng.gen_range(0..100);
        let terrain = if roll < NAVAL_RIVER_PERCENT {
            Terrain::River
        } else if roll < NAVAL_RIVER_PERCENT + NAVAL_ISLAND_PERCENT {
            Terrain::Plain
        } else {
            Terrain::Mountain
        };
        map.set_terrain(coord, terrain);
    }
    map
}

/// Hardcoded defender start hex for roster slot `index` in a siege
pub fn siege_defender_position(map: &BattleMap, index: usize) -> HexCoord {
    let center = map.center();
    let (dq, dr) = SIEGE_DEFENDER_OFFSETS[index % SIEGE_DEFENDER_OFFSETS.len()];
    HexCoord::new(center.q + dq, center.r + dr)
}

/// Start hex for roster slot `index` deployed along the given edge column.
///
/// Units fill the column centered on the middle row; rosters taller than
/// the map spill into the next column inward.
pub fn edge_position(map: &BattleMap, index: usize, count: usize, west_edge: bool) -> HexCoord {
    let height = map.height as usize;
    let column = (index / height) as i32;
    let in_column = count.saturating_sub(index - index % height).min(height);
    let first_row = (height - in_column) / 2;
    let row = (first_row + index % height) as i32;

    let q = if west_edge {
        column
    } else {
        map.width as i32 - 1 - column
    };
    HexCoord::new(q, row)
}
