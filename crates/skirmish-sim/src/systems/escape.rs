//! Escape execution.
//!
//! `order` turns the escape requests of this tick into `Escaping` units:
//! the target is dropped, an attack in progress is ended, and the unit runs
//! away from whoever it was facing. `run` steers escaping units each tick
//! and releases them when the escape window is over.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use tracing::{debug, info};

use skirmish_core::components::*;
use skirmish_core::constants::{ESCAPE_DURATION_SECS, ESCAPE_SPEED_FACTOR};
use skirmish_core::events::LifecycleEvent;
use skirmish_core::types::{Position, UnitId, Velocity};

use crate::mailbox::FightMailbox;
use crate::systems::movement;

pub fn order(
    world: &mut World,
    index: &BTreeMap<UnitId, Entity>,
    escapes: &[UnitId],
    mailbox: &mut FightMailbox,
) {
    for &unit in escapes {
        let Some(&entity) = index.get(&unit) else {
            continue;
        };
        let from = {
            let Ok(mut attacker) = world.get::<&mut Attacker>(entity) else {
                continue;
            };
            let from = attacker.attacked.or(attacker.tracked);
            if attacker.attacked.take().is_some() {
                mailbox.publish(unit, LifecycleEvent::AttackEnd);
            }
            attacker.tracked = None;
            from
        };
        let Some(from) = from else {
            debug!(%unit, "escape ordered without an opponent, ignored");
            continue;
        };
        info!(%unit, %from, "escaping");
        let _ = world.insert_one(
            entity,
            Escaping {
                from,
                remaining_secs: ESCAPE_DURATION_SECS,
            },
        );
    }
}

pub fn run(world: &mut World, dt: f64) {
    let positions: BTreeMap<UnitId, Position> = world
        .query::<(&Unit, &Position)>()
        .iter()
        .map(|(_, (unit, pos))| (unit.id, *pos))
        .collect();

    let mut finished = Vec::new();
    for (entity, (pos, stats, vel, escaping)) in world
        .query_mut::<(&Position, &CombatStats, &mut Velocity, &mut Escaping)>()
        .without::<&Dead>()
    {
        // Keep the last heading if the threat is gone.
        if let Some(threat) = positions.get(&escaping.from) {
            *vel = movement::away_from(pos, threat, stats.move_speed * ESCAPE_SPEED_FACTOR);
        }
        escaping.remaining_secs -= dt;
        if escaping.remaining_secs <= 0.0 {
            *vel = Velocity::zero();
            finished.push(entity);
        }
    }

    for entity in finished {
        let _ = world.remove_one::<Escaping>(entity);
    }
}
