//! Tactic table: skill-gated special actions
//!
//! One enum is the vocabulary for both the success-chance table and the
//! effect dispatch in `BattleState::execute_tactic`, so a success always
//! reaches its effect.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{TACTIC_MAX_CHANCE, TACTIC_MIN_CHANCE};
use crate::battle::units::Aptitude;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tactic {
    Fire,
    Confusion,
    Taunt,
    Inspire,
    Ambush,
    JointStrike,
    WeatherChange,
    WindChange,
    Repair,
    Rockfall,
    Chain,
    Lightning,
    FalseReport,
}

/// What a tactic needs to be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticTarget {
    /// Self or battlefield-wide
    None,
    /// An enemy unit
    Unit,
    /// A hex; an enemy unit's hex also works
    Hex,
}

impl Tactic {
    pub fn all() -> [Tactic; 13] {
        [
            Tactic::Fire,
            Tactic::Confusion,
            Tactic::Taunt,
            Tactic::Inspire,
            Tactic::Ambush,
            Tactic::JointStrike,
            Tactic::WeatherChange,
            Tactic::WindChange,
            Tactic::Repair,
            Tactic::Rockfall,
            Tactic::Chain,
            Tactic::Lightning,
            Tactic::FalseReport,
        ]
    }

    /// Base success percentage before intelligence adjustments
    pub fn base_chance(&self) -> i32 {
        match self {
            Tactic::Fire => 60,
            Tactic::Confusion => 50,
            Tactic::Taunt => 60,
            Tactic::Inspire => 70,
            Tactic::Ambush => 40,
            Tactic::JointStrike => 50,
            Tactic::WeatherChange => 40,
            Tactic::WindChange => 50,
            Tactic::Repair => 70,
            Tactic::Rockfall => 50,
            Tactic::Chain => 40,
            Tactic::Lightning => 20,
            Tactic::FalseReport => 45,
        }
    }

    /// Officer aptitude required to attempt this tactic
    pub fn aptitude(&self) -> Aptitude {
        match self {
            Tactic::Fire => Aptitude::Fire,
            Tactic::Confusion => Aptitude::Confusion,
            Tactic::Taunt => Aptitude::Taunt,
            Tactic::Inspire => Aptitude::Inspire,
            Tactic::Ambush => Aptitude::Ambush,
            Tactic::JointStrike => Aptitude::JointStrike,
            Tactic::WeatherChange => Aptitude::WeatherChange,
            Tactic::WindChange => Aptitude::WindChange,
            Tactic::Repair => Aptitude::Repair,
            Tactic::Rockfall => Aptitude::Rockfall,
            Tactic::Chain => Aptitude::Chain,
            Tactic::Lightning => Aptitude::Lightning,
            Tactic::FalseReport => Aptitude::FalseReport,
        }
    }

    pub fn target(&self) -> TacticTarget {
        match self {
            Tactic::Inspire | Tactic::WeatherChange | Tactic::WindChange | Tactic::Repair => {
                TacticTarget::None
            }
            Tactic::Fire | Tactic::Lightning => TacticTarget::Hex,
            Tactic::Confusion
            | Tactic::Taunt
            | Tactic::Ambush
            | Tactic::JointStrike
            | Tactic::Rockfall
            | Tactic::Chain
            | Tactic::FalseReport => TacticTarget::Unit,
        }
    }

    /// Effective success chance in percent, clamped to [5, 95]
    pub fn success_chance(&self, acting_intelligence: i32, target_intelligence: Option<i32>) -> i32 {
        let mut chance = self.base_chance() + acting_intelligence / 2;
        if let Some(target_int) = target_intelligence {
            chance -= target_int / 4;
        }
        chance.clamp(TACTIC_MIN_CHANCE, TACTIC_MAX_CHANCE)
    }
}

/// Uniform 0..100 draw below `chance` succeeds
pub fn roll_success(rng: &mut impl Rng, chance: i32) -> bool {
    rng.gen_range(0..100) < chance
}
