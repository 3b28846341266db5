//! World state snapshot: the visible state produced after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{ControllerPhase, Faction, FightManner, GamePhase};
use crate::events::FightEvent;
use crate::types::{Position, SimTime, UnitId};

/// Complete state after one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkirmishSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub units: Vec<UnitView>,
    /// Events produced during this tick.
    pub events: Vec<FightEvent>,
}

/// One combatant as seen from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub position: Position,
    pub health: f64,
    pub max_health: f64,
    pub manner: FightManner,
    pub controller: ControllerPhase,
    pub target: Option<UnitId>,
    pub escaping: bool,
    /// Hostiles currently counted as surrounding threats.
    pub threats: usize,
}

impl SkirmishSnapshot {
    /// Units of a faction still standing.
    pub fn survivors(&self, faction: Faction) -> usize {
        self.units
            .iter()
            .filter(|u| u.faction == faction && u.health > 0.0)
            .count()
    }
}
