//! Combat math: unit strikes, gate strikes and capture rolls
//!
//! Pure functions over unit snapshots. `BattleState` applies the results.

use crate::battle::constants::*;
use crate::battle::terrain::Terrain;
use crate::battle::units::{Aptitude, BattleUnit, Officer};

/// Outcome of one unit attacking another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    pub damage: u32,
    pub counter_damage: u32,
    pub morale_loss: i32,
}

/// Compute an attack against `target` standing on `terrain`.
///
/// The attacker takes a counter of 30% of the damage dealt when it stands
/// inside the target's own attack range.
pub fn resolve_attack(attacker: &BattleUnit, target: &BattleUnit, terrain: Terrain) -> AttackResult {
    let attack_mod = attacker
        .unit_type
        .attack_modifier(terrain, attacker.officer.has_aptitude(Aptitude::Naval)) as f64;
    let defense_mod = target
        .unit_type
        .defense_modifier(terrain, target.officer.has_aptitude(Aptitude::Naval)) as f64;

    let training_bonus = 1.0 + attacker.training as f64 / TRAINING_DIVISOR;
    let base_damage = attacker.officer.war as f64 * attacker.troops as f64 / 1000.0;
    let target_defense = target.officer.leadership as f64 * target.troops as f64 / 1000.0;

    let raw = base_damage / target_defense.max(1.0) * DAMAGE_SCALE * training_bonus * attack_mod
        / defense_mod;
    let damage = raw.max(MIN_ATTACK_DAMAGE).floor() as u32;

    let in_counter_range =
        attacker.position.distance(&target.position) <= target.unit_type.attack_range();
    let counter_damage = if in_counter_range {
        (damage as u64 * COUNTER_PERCENT / 100) as u32
    } else {
        0
    };

    AttackResult {
        damage,
        counter_damage,
        morale_loss: (damage / 100) as i32 + 2,
    }
}

/// Damage dealt to a gate: war * troops / 500, floored
pub fn gate_damage(attacker: &BattleUnit) -> u32 {
    let damage = attacker.officer.war as i64 * attacker.troops as i64 / GATE_DAMAGE_DIVISOR;
    damage.clamp(0, u32::MAX as i64) as u32
}

/// Capture chance in percent for a defeated officer.
///
/// Not clamped: results above 100 always capture and results
/// below 0 never do.
pub fn capture_chance(captor: &Officer, captive: &Officer) -> i32 {
    CAPTURE_BASE_CHANCE + (captor.war - captive.war) + captor.charisma / 2
}
