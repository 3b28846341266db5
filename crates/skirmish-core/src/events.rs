//! Signals consumed by the fight decision engine and events emitted by the
//! simulation for logging and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::FightEndReason;
use crate::types::UnitId;

/// Engagement lifecycle reported by a unit's attack collaborator.
/// The opponent is resolved through the collaborator's tracked/attacked
/// accessors when the event is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Started chasing a target.
    TrackingStart,
    /// Started hitting a target.
    AttackStart,
    /// Stopped hitting a target.
    AttackEnd,
}

/// Hostiles entering or leaving a unit's threat radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximityEvent<Id> {
    OpponentEntered(Id),
    OpponentLeft(Id),
}

/// A message queued for one unit's engagement controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightSignal {
    Lifecycle(LifecycleEvent),
    Proximity(ProximityEvent<UnitId>),
}

impl From<LifecycleEvent> for FightSignal {
    fn from(event: LifecycleEvent) -> Self {
        FightSignal::Lifecycle(event)
    }
}

impl From<ProximityEvent<UnitId>> for FightSignal {
    fn from(event: ProximityEvent<UnitId>) -> Self {
        FightSignal::Proximity(event)
    }
}

/// Observable outcome of a tick, collected into the state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FightEvent {
    /// A unit picked a new target.
    TargetAcquired { unit: UnitId, target: UnitId },
    /// A unit started hitting its target.
    FightStarted { unit: UnitId, opponent: UnitId },
    /// Defeat was predicted and the unit was ordered to disengage.
    EscapeOrdered {
        unit: UnitId,
        opponent: UnitId,
        /// Guaranteed time to win, if any, within the horizon.
        win_time: Option<f64>,
        /// Guaranteed time to lose within the horizon.
        lose_time: Option<f64>,
    },
    /// A fight cycle ended.
    FightEnded { unit: UnitId, reason: FightEndReason },
    /// A unit's health reached zero.
    UnitDied { unit: UnitId },
}
