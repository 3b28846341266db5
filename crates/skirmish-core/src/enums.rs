//! Enumeration types used throughout the simulation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FightError;

/// Side a combatant fights for. Units of different factions are hostile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    #[default]
    Colonists,
    Raiders,
}

/// Weapon currently equipped; selects which damage figure is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    Melee,
    Ranged,
}

/// Risk posture of a combatant. Scales the evaluation horizon:
/// a longer horizon escapes earlier, a shorter one fights longer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightManner {
    Careful,
    #[default]
    Normal,
    Frantic,
}

impl FightManner {
    pub const ALL: [FightManner; 3] = [
        FightManner::Careful,
        FightManner::Normal,
        FightManner::Frantic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FightManner::Careful => "careful",
            FightManner::Normal => "normal",
            FightManner::Frantic => "frantic",
        }
    }
}

impl std::fmt::Display for FightManner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FightManner {
    type Err = FightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "careful" => Ok(FightManner::Careful),
            "normal" => Ok(FightManner::Normal),
            "frantic" => Ok(FightManner::Frantic),
            _ => Err(FightError::UnknownManner(s.to_string())),
        }
    }
}

/// Engagement controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerPhase {
    /// No opponent; nothing is evaluated.
    #[default]
    Idle,
    /// One-shot evaluation while tracking an opponent.
    Assessing,
    /// Engaged; re-evaluated on a fixed cadence.
    Fighting,
}

/// Why a fight cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightEndReason {
    /// The attack collaborator reported the end of the attack.
    AttackEnded,
    /// The primary opponent died or disappeared mid-fight.
    OpponentLost,
    /// The controller was torn down (owner died or was removed).
    Shutdown,
}

/// Top-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Units may be spawned; no ticks run.
    #[default]
    Setup,
    /// Simulation running.
    Active,
    /// Simulation paused; time does not advance.
    Paused,
    /// Only one faction (or nobody) is left standing.
    Finished,
}
