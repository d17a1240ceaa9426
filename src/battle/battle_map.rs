//! Battle map: terrain grid plus the destructible and transient objects on it
//!
//! The grid is `width x height`, indexed by axial (q, r) with
//! 0 <= q < width and 0 <= r < height.

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::terrain::Terrain;

/// Which generator produced a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapKind {
    Field,
    Siege,
    /// Available to callers; the initializer never selects it.
    Naval,
}

/// City gate. Exists only while hp > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub position: HexCoord,
    pub hp: u32,
    pub max_hp: u32,
}

impl Gate {
    pub fn new(position: HexCoord, max_hp: u32) -> Self {
        Self {
            position,
            hp: max_hp,
            max_hp,
        }
    }
}

/// Burning hex. Removed when `turns_left` reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireHazard {
    pub position: HexCoord,
    pub turns_left: u32,
}

/// The full battle terrain grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleMap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Terrain>,
}

impl BattleMap {
    /// Create a new battle map with plain terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Terrain::Plain; (width * height) as usize],
        }
    }

    fn index(&self, coord: HexCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| (coord.r as u32 * self.width + coord.q as u32) as usize)
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.q >= 0
            && coord.r >= 0
            && coord.q < self.width as i32
            && coord.r < self.height as i32
    }

    /// Is this hex on the outermost ring of the grid?
    pub fn on_boundary(&self, coord: HexCoord) -> bool {
        self.in_bounds(coord)
            && (coord.q == 0
                || coord.r == 0
                || coord.q == self.width as i32 - 1
                || coord.r == self.height as i32 - 1)
    }

    pub fn get_terrain(&self, coord: HexCoord) -> Option<Terrain> {
        self.index(coord).map(|i| self.tiles[i])
    }

    /// Terrain at a coordinate, plain when out of bounds
    pub fn terrain_at(&self, coord: HexCoord) -> Terrain {
        self.get_terrain(coord).unwrap_or_default()
    }

    /// Set terrain at a coordinate. Out-of-bounds writes are ignored.
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(i) = self.index(coord) {
            self.tiles[i] = terrain;
        }
    }

    /// Center hex of the grid
    pub fn center(&self) -> HexCoord {
        HexCoord::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    /// All in-bounds coordinates, row by row
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |r| (0..self.width as i32).map(move |q| HexCoord::new(q, r)))
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| **t == terrain).count()
    }

    /// Text dump, one row per line
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for row in self.tiles.chunks(self.width as usize) {
            out.extend(row.iter().map(Terrain::glyph));
            out.push('\n');
        }
        out
    }
}
