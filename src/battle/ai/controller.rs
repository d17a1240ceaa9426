//! Stock AI controller: strike what is in reach, otherwise close the distance

use crate::battle::execution::BattleState;
use crate::battle::hex::{HexCoord, HexDirection};
use crate::battle::tactics::{Tactic, TacticTarget};
use crate::battle::units::{BattleUnit, Side};
use crate::core::types::UnitId;

use super::BattleAI;

/// Tactics are only tried on enemies this close
const TACTIC_REACH: u32 = 4;

/// Deterministic controller used for AI-vs-AI resolution and by the
/// headless runner. Holds no state between turns.
#[derive(Debug, Clone, Default)]
pub struct AutoController {
    /// Skip tactic attempts entirely
    pub melee_only: bool,
}

impl AutoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enemy in attack range with the fewest troops, earliest in roster on ties
    fn weakest_in_range(state: &BattleState, unit: &BattleUnit) -> Option<UnitId> {
        let range = unit.unit_type.attack_range();
        state
            .units
            .iter()
            .filter(|e| e.side == unit.side.opponent() && e.is_alive())
            .filter(|e| unit.position.distance(&e.position) <= range)
            .min_by_key(|e| e.troops)
            .map(|e| e.id)
    }

    fn nearest_enemy(state: &BattleState, unit: &BattleUnit) -> Option<(UnitId, HexCoord)> {
        state
            .units
            .iter()
            .filter(|e| e.side == unit.side.opponent() && e.is_fighting())
            .min_by_key(|e| unit.position.distance(&e.position))
            .map(|e| (e.id, e.position))
    }

    fn gate_in_range(state: &BattleState, unit: &BattleUnit) -> Option<HexCoord> {
        if !state.is_siege || unit.side != Side::Attacker {
            return None;
        }
        let range = unit.unit_type.attack_range();
        state
            .gates
            .iter()
            .map(|g| g.position)
            .find(|pos| unit.position.distance(pos) <= range)
    }

    /// Siege attackers head for the nearest gate while any stand
    fn objective(state: &BattleState, unit: &BattleUnit) -> Option<HexCoord> {
        if state.is_siege && unit.side == Side::Attacker {
            let gate = state
                .gates
                .iter()
                .map(|g| g.position)
                .min_by_key(|pos| unit.position.distance(pos));
            if gate.is_some() {
                return gate;
            }
        }
        Self::nearest_enemy(state, unit).map(|(_, pos)| pos)
    }

    /// Strike a unit or gate if one is in reach. Returns true if an action
    /// was taken.
    fn strike(state: &mut BattleState, unit_id: UnitId) -> bool {
        let Some(unit) = state.get_unit(unit_id) else {
            return false;
        };
        if let Some(target) = Self::weakest_in_range(state, unit) {
            return state.attack(unit_id, target);
        }
        if let Some(gate) = Self::gate_in_range(state, unit) {
            return state.attack_gate(unit_id, gate.q, gate.r);
        }
        false
    }

    fn try_tactic(&self, state: &mut BattleState, unit_id: UnitId) -> bool {
        if self.melee_only {
            return false;
        }
        let Some(unit) = state.get_unit(unit_id) else {
            return false;
        };
        let Some((target, pos)) = Self::nearest_enemy(state, unit) else {
            return false;
        };
        if unit.position.distance(&pos) > TACTIC_REACH {
            return false;
        }
        let tactic = Tactic::all()
            .into_iter()
            .find(|t| t.target() == TacticTarget::Unit && unit.officer.has_aptitude(t.aptitude()));
        match tactic {
            Some(tactic) => state.execute_tactic(unit_id, tactic, Some(target), None),
            None => false,
        }
    }

    /// Move toward the objective: best hex in the reachable set, then the A*
    /// route, then a straight step.
    fn advance(state: &mut BattleState, unit_id: UnitId) -> bool {
        let Some(unit) = state.get_unit(unit_id) else {
            return false;
        };
        if unit.moved {
            return false;
        }
        let Some(goal) = Self::objective(state, unit) else {
            return false;
        };
        let start = unit.position;
        let current = start.distance(&goal);
        let range = unit.unit_type.movement_range();

        let best = state
            .reachable_for(unit_id)
            .into_iter()
            .min_by_key(|h| (h.distance(&goal), h.q, h.r))
            .filter(|h| h.distance(&goal) < current);

        let dest = best.or_else(|| {
            let path = state.path_for(unit_id, goal)?;
            // Stop short of the goal hex itself
            let steps = (range as usize).min(path.len().saturating_sub(2));
            (steps > 0).then(|| path[steps])
        });

        let dest = dest.or_else(|| {
            let dir = HexDirection::toward(start, goal)?;
            let next = start.step(dir);
            (next != goal && state.unit_at(next).is_none()).then_some(next)
        });

        match dest {
            Some(hex) => state.move_unit(unit_id, hex.q, hex.r),
            None => false,
        }
    }
}

impl BattleAI for AutoController {
    fn take_turn(&mut self, state: &mut BattleState, unit_id: UnitId) {
        if !Self::strike(state, unit_id) && !self.try_tactic(state, unit_id) {
            if Self::advance(state, unit_id) {
                Self::strike(state, unit_id);
            }
        }
        if !state.is_finished() {
            state.end_turn(unit_id);
        }
    }
}
