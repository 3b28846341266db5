//! Externally supplied configuration: fight-decision tuning and scenarios.
//!
//! Both are plain serde structs loaded from TOML. `validate` must pass
//! before a configuration reaches the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::CombatStats;
use crate::constants::*;
use crate::enums::{Faction, FightManner};
use crate::error::ConfigError;
use crate::types::Position;

/// Tuning for the fight decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    /// Base evaluation horizon in seconds, before the manner multiplier.
    pub advance_time: f64,
    /// Re-evaluation period while fighting, in seconds.
    pub refresh_time: f64,
    pub careful_multiplier: f64,
    pub frantic_multiplier: f64,
    /// Damage multiplier of a critical hit.
    pub critical_multiplier: f64,
    /// DPS removed per point of armor.
    pub armor_mitigation: f64,
    /// Re-sample surrounding threats before every evaluation instead of
    /// keeping the snapshot captured when they came into range.
    pub refresh_surrounding: bool,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            advance_time: DEFAULT_ADVANCE_TIME_SECS,
            refresh_time: DEFAULT_REFRESH_TIME_SECS,
            careful_multiplier: DEFAULT_CAREFUL_MULTIPLIER,
            frantic_multiplier: DEFAULT_FRANTIC_MULTIPLIER,
            critical_multiplier: DEFAULT_CRITICAL_MULTIPLIER,
            armor_mitigation: DEFAULT_ARMOR_MITIGATION,
            refresh_surrounding: false,
        }
    }
}

impl AttackSettings {
    /// Check the documented ranges. Careful > 1 >= frantic is a convention
    /// and is not enforced.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("advance_time", self.advance_time)?;
        positive("refresh_time", self.refresh_time)?;
        positive("careful_multiplier", self.careful_multiplier)?;
        positive("frantic_multiplier", self.frantic_multiplier)?;
        if !(self.critical_multiplier >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "critical_multiplier",
                reason: format!("must be >= 1, got {}", self.critical_multiplier),
            });
        }
        if !(self.armor_mitigation >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "armor_mitigation",
                reason: format!("must be >= 0, got {}", self.armor_mitigation),
            });
        }
        Ok(())
    }

    /// Horizon multiplier for a manner.
    pub fn manner_multiplier(&self, manner: FightManner) -> f64 {
        match manner {
            FightManner::Careful => self.careful_multiplier,
            FightManner::Normal => 1.0,
            FightManner::Frantic => self.frantic_multiplier,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

/// One combatant placed by a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub name: String,
    pub faction: Faction,
    pub position: Position,
    #[serde(default)]
    pub manner: FightManner,
    #[serde(default)]
    pub stats: CombatStats,
}

/// A skirmish setup: decision tuning plus the units to spawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// RNG seed; the runner may override it.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub settings: AttackSettings,
    #[serde(default)]
    pub units: Vec<UnitTemplate>,
}

impl ScenarioConfig {
    /// Parse and validate a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let scenario: ScenarioConfig = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse and validate a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        for unit in &self.units {
            if !(unit.stats.max_health > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "units.stats.max_health",
                    reason: format!("unit {:?} must start with positive health", unit.name),
                });
            }
        }
        Ok(())
    }
}
