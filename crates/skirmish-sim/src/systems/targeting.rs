//! Target search and approach.
//!
//! Every living unit that is not escaping keeps one tracked hostile: the
//! nearest living unit of another faction within its sight radius. It walks
//! toward that target and starts attacking once within weapon reach.
//! Each change is announced to the unit's controller through the mailbox.

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::constants::DISENGAGE_RANGE_FACTOR;
use skirmish_core::enums::Faction;
use skirmish_core::events::{FightEvent, LifecycleEvent};
use skirmish_core::types::{Position, UnitId, Velocity};

use crate::mailbox::FightMailbox;
use crate::systems::movement;

#[derive(Debug, Clone, Copy)]
struct Contact {
    id: UnitId,
    faction: Faction,
    position: Position,
}

pub fn run(world: &mut World, mailbox: &mut FightMailbox, events: &mut Vec<FightEvent>) {
    let roster = living_contacts(world);
    let locate = |id: UnitId| roster.iter().find(|c| c.id == id).map(|c| c.position);

    for (_entity, (unit, pos, stats, attacker, vel, memory)) in world
        .query_mut::<(
            &Unit,
            &Position,
            &CombatStats,
            &mut Attacker,
            &mut Velocity,
            &mut ProximityMemory,
        )>()
        .without::<&Dead>()
        .without::<&Escaping>()
    {
        // Forget a target that died or vanished.
        if attacker.tracked.is_some_and(|id| locate(id).is_none()) {
            attacker.tracked = None;
            if attacker.attacked.take().is_some() {
                mailbox.publish(unit.id, LifecycleEvent::AttackEnd);
            }
        }

        if attacker.tracked.is_none() {
            let nearest = roster
                .iter()
                .filter(|c| c.faction != unit.faction)
                .map(|c| (c.id, pos.range_to(&c.position)))
                .filter(|(_, range)| *range <= stats.sight_radius)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((target, _)) = nearest {
                attacker.tracked = Some(target);
                // Nearby hostiles are re-reported once the controller has
                // reset its threat set for the new target.
                memory.inside.clear();
                mailbox.publish(unit.id, LifecycleEvent::TrackingStart);
                events.push(FightEvent::TargetAcquired {
                    unit: unit.id,
                    target,
                });
            }
        }

        let Some((target, target_pos)) = attacker
            .tracked
            .and_then(|id| locate(id).map(|p| (id, p)))
        else {
            *vel = Velocity::zero();
            continue;
        };

        let range = pos.range_to(&target_pos);
        let reach = stats.attack_range();
        if range <= reach {
            *vel = Velocity::zero();
            if attacker.attacked != Some(target) {
                attacker.attacked = Some(target);
                mailbox.publish(unit.id, LifecycleEvent::AttackStart);
            }
        } else {
            if attacker.attacked.is_some() && range > reach * DISENGAGE_RANGE_FACTOR {
                attacker.attacked = None;
                mailbox.publish(unit.id, LifecycleEvent::AttackEnd);
            }
            *vel = movement::heading(pos, &target_pos, stats.move_speed);
        }
    }
}

fn living_contacts(world: &World) -> Vec<Contact> {
    world
        .query::<(&Unit, &Position, &Health)>()
        .without::<&Dead>()
        .iter()
        .filter(|(_, (_, _, health))| health.is_alive())
        .map(|(_, (unit, pos, _))| Contact {
            id: unit.id,
            faction: unit.faction,
            position: *pos,
        })
        .collect()
}
