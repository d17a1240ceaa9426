//! Automatic battle control
//!
//! Architecture: trait + driver loop
//! - BattleAI trait acts for one unit through the public battle operations
//! - AutoController is the stock implementation
//! - run_to_completion plays AI-controlled turns until a stop condition

mod controller;

pub use controller::AutoController;

use crate::battle::execution::BattleState;
use crate::battle::units::UnitStatus;
use crate::core::types::UnitId;

/// Trait for battle AI implementations
pub trait BattleAI {
    /// Act for the currently acting unit. Implementations should end the
    /// unit's turn; the driver ends it if they do not.
    fn take_turn(&mut self, state: &mut BattleState, unit_id: UnitId);
}

/// Why `run_to_completion` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStop {
    /// The battle has a winner
    Finished,
    /// The acting unit belongs to the player faction
    AwaitingPlayer(UnitId),
    /// The action budget ran out first
    ActionLimit,
}

/// Drive AI-controlled turns until the battle ends, a player unit comes up,
/// or `max_actions` turns have been played.
pub fn run_to_completion(
    state: &mut BattleState,
    ai: &mut impl BattleAI,
    max_actions: usize,
) -> RunStop {
    for _ in 0..max_actions {
        if state.is_finished() {
            return RunStop::Finished;
        }
        let Some(unit_id) = state.active_unit else {
            state.advance_turn();
            continue;
        };
        if !state.is_ai_controlled(unit_id) {
            return RunStop::AwaitingPlayer(unit_id);
        }

        // Only close turns the AI left open; after a day rollover the same
        // unit may hold a fresh turn.
        let day = state.day;
        ai.take_turn(state, unit_id);
        let still_open = state.day == day
            && state.active_unit == Some(unit_id)
            && state
                .get_unit(unit_id)
                .is_some_and(|u| u.status == UnitStatus::Active);
        if still_open {
            state.end_turn(unit_id);
        }
    }

    if state.is_finished() {
        RunStop::Finished
    } else {
        tracing::warn!("Action limit of {} reached on day {}", max_actions, state.day);
        RunStop::ActionLimit
    }
}
