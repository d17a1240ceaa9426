//! Unit types and their static properties
//!
//! Terrain multipliers not listed for a type default to 1.0.

use serde::{Deserialize, Serialize};

use crate::battle::constants::NAVAL_RIVER_BONUS;
use crate::battle::terrain::Terrain;

/// Type of military unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitType {
    #[default]
    Infantry,
    Cavalry,
    Archer,
}

/// Static properties for a unit type
#[derive(Debug, Clone, Copy)]
pub struct UnitProperties {
    pub movement_range: u32, // In hexes of straight distance
    pub attack_range: u32,
    pub attack_modifiers: &'static [(Terrain, f32)],
    pub defense_modifiers: &'static [(Terrain, f32)],
}

const INFANTRY: UnitProperties = UnitProperties {
    movement_range: 3,
    attack_range: 1,
    attack_modifiers: &[(Terrain::Forest, 1.1), (Terrain::City, 1.1)],
    defense_modifiers: &[
        (Terrain::Forest, 1.2),
        (Terrain::Mountain, 1.3),
        (Terrain::City, 1.3),
        (Terrain::River, 0.8),
    ],
};

const CAVALRY: UnitProperties = UnitProperties {
    movement_range: 5,
    attack_range: 1,
    attack_modifiers: &[
        (Terrain::Plain, 1.3),
        (Terrain::Forest, 0.7),
        (Terrain::Mountain, 0.6),
        (Terrain::River, 0.6),
        (Terrain::City, 0.8),
    ],
    defense_modifiers: &[
        (Terrain::Forest, 0.8),
        (Terrain::Mountain, 0.9),
        (Terrain::River, 0.7),
    ],
};

const ARCHER: UnitProperties = UnitProperties {
    movement_range: 2,
    attack_range: 3,
    attack_modifiers: &[(Terrain::Mountain, 1.2), (Terrain::Forest, 0.8)],
    defense_modifiers: &[
        (Terrain::Plain, 0.9),
        (Terrain::Forest, 1.2),
        (Terrain::Mountain, 1.2),
        (Terrain::City, 1.3),
    ],
};

fn lookup(table: &[(Terrain, f32)], terrain: Terrain) -> f32 {
    table
        .iter()
        .find(|(t, _)| *t == terrain)
        .map_or(1.0, |(_, m)| *m)
}

fn with_naval(modifier: f32, terrain: Terrain, naval: bool) -> f32 {
    if naval && terrain == Terrain::River {
        modifier * NAVAL_RIVER_BONUS
    } else {
        modifier
    }
}

impl UnitType {
    pub fn properties(&self) -> &'static UnitProperties {
        match self {
            UnitType::Infantry => &INFANTRY,
            UnitType::Cavalry => &CAVALRY,
            UnitType::Archer => &ARCHER,
        }
    }

    pub fn movement_range(&self) -> u32 {
        self.properties().movement_range
    }

    pub fn attack_range(&self) -> u32 {
        self.properties().attack_range
    }

    /// Attack multiplier on a terrain; `naval` applies the river bonus
    pub fn attack_modifier(&self, terrain: Terrain, naval: bool) -> f32 {
        with_naval(lookup(self.properties().attack_modifiers, terrain), terrain, naval)
    }

    /// Defense multiplier on a terrain; `naval` applies the river bonus
    pub fn defense_modifier(&self, terrain: Terrain, naval: bool) -> f32 {
        with_naval(lookup(self.properties().defense_modifiers, terrain), terrain, naval)
    }

    pub fn is_ranged(&self) -> bool {
        self.attack_range() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infantry_neutral_on_plain() {
        assert_eq!(UnitType::Infantry.attack_modifier(Terrain::Plain, false), 1.0);
        assert_eq!(UnitType::Infantry.defense_modifier(Terrain::Plain, false), 1.0);
    }

    #[test]
    fn test_unlisted_terrain_defaults_to_one() {
        assert_eq!(UnitType::Archer.attack_modifier(Terrain::Bridge, false), 1.0);
        assert_eq!(UnitType::Cavalry.defense_modifier(Terrain::Gate, false), 1.0);
    }

    #[test]
    fn test_cavalry_fast_and_strong_on_plain() {
        assert!(UnitType::Cavalry.movement_range() > UnitType::Infantry.movement_range());
        assert!(UnitType::Cavalry.attack_modifier(Terrain::Plain, false) > 1.0);
        assert!(UnitType::Cavalry.attack_modifier(Terrain::Forest, false) < 1.0);
    }

    #[test]
    fn test_archers_are_ranged() {
        assert!(UnitType::Archer.is_ranged());
        assert!(!UnitType::Infantry.is_ranged());
        assert!(!UnitType::Cavalry.is_ranged());
    }

    #[test]
    fn test_naval_bonus_only_on_river() {
        let base = UnitType::Cavalry.attack_modifier(Terrain::River, false);
        let naval = UnitType::Cavalry.attack_modifier(Terrain::River, true);
        assert!((naval - base * 1.2).abs() < 1e-6);

        assert_eq!(
            UnitType::Cavalry.attack_modifier(Terrain::Plain, true),
            UnitType::Cavalry.attack_modifier(Terrain::Plain, false)
        );
        let river_def = UnitType::Archer.defense_modifier(Terrain::River, true);
        assert!((river_def - 1.2).abs() < 1e-6);
    }
}
