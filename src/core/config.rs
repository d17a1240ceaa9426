//! Battle configuration loaded from TOML
//!
//! Every field has a default, so a config file only needs to name the
//! values it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{BattleError, Result};

/// Smallest map side that keeps the siege wall radius at 3 or more.
///
/// The hardcoded defender placement table uses offsets up to distance 2 from
/// the map center, so a smaller radius would put defenders on the wall ring.
pub const MIN_MAP_SIDE: u32 = 12;

/// Configuration for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Battle canvas width in hexes (axial q runs 0..width)
    pub map_width: u32,

    /// Battle canvas height in hexes (axial r runs 0..height)
    pub map_height: u32,

    /// Last playable day. Advancing past it ends the battle in the
    /// defender's favor.
    pub max_days: u32,

    /// Pixel size of a hex, used only by the presentation projection
    pub hex_size: f32,

    /// RNG seed. A random seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            map_width: 20,
            map_height: 15,
            max_days: 30,
            hex_size: 32.0,
            seed: None,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.map_width < MIN_MAP_SIDE || self.map_height < MIN_MAP_SIDE {
            return Err(BattleError::InvalidConfig(format!(
                "map must be at least {MIN_MAP_SIDE}x{MIN_MAP_SIDE}, got {}x{}",
                self.map_width, self.map_height
            )));
        }

        if self.max_days == 0 {
            return Err(BattleError::InvalidConfig("max_days must be at least 1".into()));
        }

        if !(self.hex_size > 0.0) {
            return Err(BattleError::InvalidConfig(format!(
                "hex_size must be positive, got {}",
                self.hex_size
            )));
        }

        Ok(())
    }
}
