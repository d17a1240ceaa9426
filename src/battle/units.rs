//! Officers and the battle units they lead
//!
//! Officers are campaign records: the engine reads their stats and never
//! mutates them. A battle unit is one officer's troops on the field.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{MAX_MORALE, ROUT_THRESHOLD};
use crate::battle::hex::{HexCoord, HexDirection};
use crate::battle::unit_type::UnitType;
use crate::core::types::{FactionId, OfficerId, UnitId};

/// Which side of the battle a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Officer skill that unlocks a special action or a terrain bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aptitude {
    /// River terrain multipliers get an extra 1.2x
    Naval,
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

/// Officer record as handed over by the campaign layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub id: OfficerId,
    pub name: String,
    pub leadership: i32,
    pub war: i32,
    pub intelligence: i32,
    pub charisma: i32,
    /// Troops this officer brings when no explicit allocation is given
    pub troops: u32,
    #[serde(default)]
    pub aptitudes: Vec<Aptitude>,
}

impl Officer {
    pub fn new(id: OfficerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            leadership: 50,
            war: 50,
            intelligence: 50,
            charisma: 50,
            troops: 1000,
            aptitudes: Vec::new(),
        }
    }

    pub fn with_stats(mut self, leadership: i32, war: i32, intelligence: i32, charisma: i32) -> Self {
        self.leadership = leadership;
        self.war = war;
        self.intelligence = intelligence;
        self.charisma = charisma;
        self
    }

    pub fn with_troops(mut self, troops: u32) -> Self {
        self.troops = troops;
        self
    }

    pub fn with_aptitude(mut self, aptitude: Aptitude) -> Self {
        if !self.aptitudes.contains(&aptitude) {
            self.aptitudes.push(aptitude);
        }
        self
    }

    pub fn has_aptitude(&self, aptitude: Aptitude) -> bool {
        self.aptitudes.contains(&aptitude)
    }
}

/// Turn status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Active, // May act this day
    Done,      // Acted, or defeated
    Routed,    // Morale collapsed, flees each day
    Confused,  // Loses its next turn
    Arriving,  // Reinforcement not yet on the field
}

/// A unit on the battle map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleUnit {
    pub id: UnitId,
    pub officer: Officer,
    pub faction: FactionId,
    pub side: Side,
    pub unit_type: UnitType,

    // Strength
    pub troops: u32,
    pub max_troops: u32,
    pub morale: i32,   // 0-100
    pub training: i32, // 0-100

    // Position
    pub position: HexCoord,
    pub facing: HexDirection,

    // Turn state
    pub status: UnitStatus,
    pub confusion_turns: u32,
    pub chained: bool,
    pub moved: bool,
}

impl BattleUnit {
    pub fn new(officer: Officer, faction: FactionId, side: Side, unit_type: UnitType, troops: u32) -> Self {
        Self {
            id: UnitId::new(),
            officer,
            faction,
            side,
            unit_type,
            troops,
            max_troops: troops,
            morale: MAX_MORALE,
            training: 0,
            position: HexCoord::default(),
            facing: HexDirection::default(),
            status: UnitStatus::Active,
            confusion_turns: 0,
            chained: false,
            moved: false,
        }
    }

    /// Cube z of the current position
    pub fn z(&self) -> i32 {
        self.position.z()
    }

    pub fn is_alive(&self) -> bool {
        self.troops > 0
    }

    pub fn is_routed(&self) -> bool {
        matches!(self.status, UnitStatus::Routed)
    }

    /// Alive and not routed: counts toward its side still fighting
    pub fn is_fighting(&self) -> bool {
        self.is_alive() && !self.is_routed()
    }

    pub fn can_act(&self) -> bool {
        self.status == UnitStatus::Active && self.is_alive()
    }

    /// Remove a number of troops, flooring at zero
    pub fn take_losses(&mut self, losses: u32) {
        self.troops = self.troops.saturating_sub(losses);
    }

    /// Remove a percentage of current troops (floored)
    pub fn take_percent_losses(&mut self, percent: u32) {
        let losses = (self.troops as u64 * percent as u64 / 100) as u32;
        self.take_losses(losses);
    }

    /// Shift morale by delta, clamped to 0..=100
    pub fn adjust_morale(&mut self, delta: i32) {
        self.morale = (self.morale + delta).clamp(0, MAX_MORALE);
    }

    /// Enforce the defeat and rout rules after any change to troops or morale.
    ///
    /// Returns true if this call newly routed the unit.
    pub fn settle(&mut self) -> bool {
        if !self.is_alive() {
            self.status = UnitStatus::Done;
            return false;
        }
        if self.morale < ROUT_THRESHOLD && !self.is_routed() {
            self.status = UnitStatus::Routed;
            return true;
        }
        false
    }

    /// Confuse this unit for a number of its own turns
    pub fn confuse(&mut self, turns: u32) {
        if !self.is_alive() {
            return;
        }
        self.confusion_turns = self.confusion_turns.max(turns);
        if self.status == UnitStatus::Active {
            self.status = UnitStatus::Confused;
        }
    }
}
