//! Battle system - turn-based tactical combat on a hex grid
//!
//! One battle resolves one attack order between two factions:
//! - Field battles on a randomly rolled map, sieges against walls and gates
//! - Units act one at a time in roster order; a day ends when all have acted
//! - Skill-gated tactics, fire hazards, weather and wind
//! - Morale collapse routs units; a fallen commander shakes the whole side

pub mod ai;
pub mod battle_map;
pub mod combat;
pub mod constants;
pub mod execution;
pub mod hex;
pub mod map_generation;
pub mod pathfinding;
pub mod tactics;
pub mod terrain;
pub mod unit_type;
pub mod units;
pub mod weather;

// Re-exports for convenient access
pub use ai::{run_to_completion, AutoController, BattleAI, RunStop};
pub use battle_map::{BattleMap, FireHazard, Gate, MapKind};
pub use combat::{capture_chance, gate_damage, resolve_attack, AttackResult};
pub use constants::*;
pub use execution::{
    BattleEvent, BattleEventType, BattleOutcome, BattleReport, BattleSetup, BattleState, SideSetup,
    UnitReport, VictoryReason,
};
pub use hex::{CubeCoord, HexCoord, HexDirection};
pub use map_generation::{generate, is_siege_battle, GeneratedMap};
pub use pathfinding::{find_path, path_cost, reachable_hexes};
pub use tactics::{Tactic, TacticTarget};
pub use terrain::Terrain;
pub use unit_type::{UnitProperties, UnitType};
pub use units::{Aptitude, BattleUnit, Officer, Side, UnitStatus};
pub use weather::Weather;
