//! Battle rule constants - all tunable values in one place

// Map generation (percent rolls per tile)
pub const FIELD_MOUNTAIN_PERCENT: u32 = 10;
pub const FIELD_FOREST_PERCENT: u32 = 10;
pub const FIELD_RIVER_PERCENT: u32 = 5;
pub const NAVAL_RIVER_PERCENT: u32 = 80;
pub const NAVAL_ISLAND_PERCENT: u32 = 10;

// Siege
pub const GATE_MAX_HP: u32 = 1000;
pub const GATE_DAMAGE_DIVISOR: i64 = 500;
pub const REPAIR_AMOUNT: u32 = 500;

/// Defender start offsets from the map center in siege battles.
///
/// All offsets are within hex distance 2, strictly inside the minimum wall
/// radius of 3. Rosters longer than the table wrap around.
pub const SIEGE_DEFENDER_OFFSETS: [(i32, i32); 12] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, -1),
    (-1, 1),
    (2, 0),
    (-2, 0),
    (0, 2),
    (0, -2),
    (2, -2),
];

// Combat
pub const MIN_ATTACK_DAMAGE: f64 = 50.0;
pub const DAMAGE_SCALE: f64 = 500.0;
pub const COUNTER_PERCENT: u64 = 30;
pub const TRAINING_DIVISOR: f64 = 200.0;
pub const NAVAL_RIVER_BONUS: f32 = 1.2;

// Morale
pub const MAX_MORALE: i32 = 100;
pub const ROUT_THRESHOLD: i32 = 20;
pub const COMMANDER_FALL_MORALE_LOSS: i32 = 30;
pub const DUEL_WINNER_MORALE: i32 = 20;
pub const DUEL_LOSER_MORALE: i32 = 30;

// Capture roll: base + (war difference) + charisma / 2, never clamped
pub const CAPTURE_BASE_CHANCE: i32 = 30;

// Tactics
pub const TACTIC_MIN_CHANCE: i32 = 5;
pub const TACTIC_MAX_CHANCE: i32 = 95;
pub const FIRE_DURATION_DAYS: u32 = 3;
pub const CONFUSION_TURNS: u32 = 2;
pub const LONG_CONFUSION_TURNS: u32 = 3;

// Day advance
pub const FIRE_DAMAGE_PERCENT: u32 = 10;
