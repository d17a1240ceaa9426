//! Hex coordinate system for battle maps (axial coordinates)
//!
//! Axial (q, r) is the storage form. Cube (x, y, z) is derived with
//! x = q, y = r, z = -q - r, so x + y + z == 0 always holds.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate for battle map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Cube form of a hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub fn to_axial(self) -> HexCoord {
        HexCoord::new(self.x, self.y)
    }
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube component (derived from q and r)
    pub fn z(&self) -> i32 {
        -self.q - self.r
    }

    pub fn to_cube(&self) -> CubeCoord {
        CubeCoord {
            x: self.q,
            y: self.r,
            z: self.z(),
        }
    }

    /// Hex distance: half the cube-space Manhattan distance
    pub fn distance(&self, other: &Self) -> u32 {
        let a = self.to_cube();
        let b = other.to_cube();
        (((a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates, in `HexDirection::all()` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::all().map(|dir| self.step(dir))
    }

    /// Neighbor one step away in the given direction
    pub fn step(&self, dir: HexDirection) -> HexCoord {
        let offset = dir.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Center of this hex in a flat-topped pixel layout.
    ///
    /// Presentation only; no battle rule reads pixel positions.
    pub fn to_pixel(&self, size: f32) -> (f32, f32) {
        let x = size * 1.5 * self.q as f32;
        let y = size * 3.0_f32.sqrt() * (self.r as f32 + self.q as f32 / 2.0);
        (x, y)
    }
}

/// Direction enum for hex facing and wind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// Get the hex offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// 0..6 index, counter-clockwise from east
    pub fn index(&self) -> usize {
        match self {
            HexDirection::East => 0,
            HexDirection::NorthEast => 1,
            HexDirection::NorthWest => 2,
            HexDirection::West => 3,
            HexDirection::SouthWest => 4,
            HexDirection::SouthEast => 5,
        }
    }

    /// Direction for an index, wrapping modulo 6
    pub fn from_index(index: usize) -> Self {
        Self::all()[index % 6]
    }

    /// All directions
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }

    /// Direction of the neighbor of `from` that lies closest to `to`.
    ///
    /// Ties resolve in `all()` order. Returns None when the hexes coincide.
    pub fn toward(from: HexCoord, to: HexCoord) -> Option<Self> {
        if from == to {
            return None;
        }
        Self::all()
            .into_iter()
            .min_by_key(|dir| from.step(*dir).distance(&to))
    }
}
