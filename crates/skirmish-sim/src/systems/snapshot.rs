//! Snapshot system: queries the ECS world and builds a complete SkirmishSnapshot.
//!
//! Read-only: it never modifies the world.

use std::collections::BTreeMap;

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::enums::{ControllerPhase, FightManner, GamePhase};
use skirmish_core::events::FightEvent;
use skirmish_core::state::{SkirmishSnapshot, UnitView};
use skirmish_core::types::{Position, SimTime, UnitId};
use skirmish_fight_ai::EngagementController;

/// Build a complete SkirmishSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    controllers: &BTreeMap<UnitId, EngagementController<UnitId>>,
    events: Vec<FightEvent>,
) -> SkirmishSnapshot {
    SkirmishSnapshot {
        time: *time,
        phase,
        units: build_units(world, controllers),
        events,
    }
}

fn build_units(
    world: &World,
    controllers: &BTreeMap<UnitId, EngagementController<UnitId>>,
) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<(&Unit, &Position, &Health, &Attacker, Option<&Escaping>)>()
        .iter()
        .map(|(_, (unit, pos, health, attacker, escaping))| {
            let controller = controllers.get(&unit.id);
            UnitView {
                id: unit.id,
                name: unit.name.clone(),
                faction: unit.faction,
                position: *pos,
                health: health.current,
                max_health: health.max,
                manner: controller.map_or(FightManner::default(), |c| c.manner()),
                controller: controller.map_or(ControllerPhase::Idle, |c| c.phase()),
                target: attacker.tracked,
                escaping: escaping.is_some(),
                threats: controller.map_or(0, |c| c.threats().len()),
            }
        })
        .collect();
    units.sort_by_key(|u| u.id);
    units
}
