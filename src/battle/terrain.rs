//! Battle terrain kinds and their movement costs
//!
//! Combat multipliers per terrain live with the unit-type table, since they
//! differ by unit type.

use serde::{Deserialize, Serialize};

/// Terrain kind of a battle hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Plain,
    Forest,
    Mountain, // Also used for siege walls and naval reefs
    River,
    City,
    Gate,
    Bridge,
}

impl Terrain {
    /// Movement cost for advisory pathfinding. None means impassable.
    pub fn movement_cost(&self) -> Option<u32> {
        match self {
            Terrain::Plain => Some(1),
            Terrain::Forest => Some(2),
            Terrain::Bridge => Some(1),
            Terrain::River => Some(4),
            Terrain::Mountain | Terrain::City | Terrain::Gate => None,
        }
    }

    /// Single-character glyph for text dumps
    pub fn glyph(&self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Forest => 'f',
            Terrain::Mountain => '^',
            Terrain::River => '~',
            Terrain::City => 'c',
            Terrain::Gate => 'G',
            Terrain::Bridge => '=',
        }
    }
}
