//! Commands sent to the simulation from outside.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::FightManner;
use crate::types::UnitId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Begin running ticks.
    Start,
    /// Change a unit's risk posture.
    SetManner { unit: UnitId, manner: FightManner },
    /// Set time scale (1.0 = normal, 0.0 = frozen). Clamped to a sane range.
    SetTimeScale { scale: f64 },
    Pause,
    Resume,
}
