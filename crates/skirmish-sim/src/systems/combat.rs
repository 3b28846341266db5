//! Damage, regeneration and death.
//!
//! Every attacking unit in reach deals its effective DPS to its target for
//! `dt` seconds. All damage is computed from the state at the start of the
//! step and applied together.

use std::collections::BTreeMap;

use hecs::World;
use tracing::info;

use skirmish_core::components::*;
use skirmish_core::constants::DISENGAGE_RANGE_FACTOR;
use skirmish_core::events::FightEvent;
use skirmish_core::types::{CombatSnapshot, Position, UnitId};
use skirmish_fight_ai::OutcomePredictor;

pub fn run(
    world: &mut World,
    predictor: &OutcomePredictor,
    dt: f64,
    events: &mut Vec<FightEvent>,
) {
    if dt <= 0.0 {
        return;
    }

    let mut combatants: BTreeMap<UnitId, (CombatSnapshot, Position)> = BTreeMap::new();
    let mut strikes = Vec::new();
    for (_entity, (unit, pos, stats, health, attacker, escaping)) in world
        .query::<(
            &Unit,
            &Position,
            &CombatStats,
            &Health,
            &Attacker,
            Option<&Escaping>,
        )>()
        .without::<&Dead>()
        .iter()
    {
        combatants.insert(unit.id, (stats.snapshot(health), *pos));
        if let (Some(target), None) = (attacker.attacked, escaping) {
            strikes.push((unit.id, target, stats.attack_range() * DISENGAGE_RANGE_FACTOR));
        }
    }

    let mut damage: BTreeMap<UnitId, f64> = BTreeMap::new();
    for (attacker, target, reach) in strikes {
        let (Some((me, my_pos)), Some((them, their_pos))) =
            (combatants.get(&attacker), combatants.get(&target))
        else {
            continue;
        };
        if their_pos.range_to(my_pos) > reach || them.health() <= 0.0 {
            continue;
        }
        *damage.entry(target).or_default() += predictor.effective_dps(me, them) * dt;
    }

    let mut died = Vec::new();
    for (entity, (unit, stats, health)) in world
        .query_mut::<(&Unit, &CombatStats, &mut Health)>()
        .without::<&Dead>()
    {
        if let Some(amount) = damage.get(&unit.id) {
            health.current -= amount;
        }
        if health.is_alive() {
            health.current = (health.current + stats.recovery_rate * dt).min(health.max);
        } else {
            health.current = 0.0;
            died.push((entity, unit.id));
        }
    }

    for (entity, unit) in died {
        info!(%unit, "unit died");
        let _ = world.insert_one(entity, Dead);
        events.push(FightEvent::UnitDied { unit });
    }
}
