use thiserror::Error;

use crate::battle::units::Side;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Config IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Empty roster for {0:?}")]
    EmptyRoster(Side),

    #[error("{side:?} {field} has {got} entries, roster has {expected}")]
    RosterMismatch {
        side: Side,
        field: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, BattleError>;
