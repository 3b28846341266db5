//! Error taxonomy.
//!
//! Only caller bugs and bad configuration are errors. An opponent dying
//! mid-fight ends the fight normally, and removing an absent threat is a
//! no-op.

use thiserror::Error;

/// Contract violations in the fight decision API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FightError {
    #[error("trying to check the outcome of a fight that has not started")]
    NotFighting,

    #[error("unknown fight manner: {0:?}")]
    UnknownManner(String),
}

/// Failures while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type FightResult<T> = std::result::Result<T, FightError>;
