//! Identifier types shared with the campaign layer

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Officer identifier owned by the campaign layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfficerId(pub u32);

/// Faction identifier owned by the campaign layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// Contested city identifier. Zero means no city (field battle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CityId(pub u32);

impl CityId {
    pub const NONE: CityId = CityId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// Unique identifier for units on the battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Draw an id from a seeded generator so replays hand out the same ids
    pub fn from_rng(rng: &mut impl Rng) -> Self {
        Self(Uuid::from_u128(rng.gen()))
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Battle day counter
pub type Day = u32;
