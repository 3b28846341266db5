//! Threat-radius detection.
//!
//! Compares the hostiles inside each unit's threat radius against what was
//! reported last tick and publishes the difference.

use std::collections::BTreeSet;

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::events::ProximityEvent;
use skirmish_core::types::Position;

use crate::mailbox::FightMailbox;

pub fn run(world: &mut World, mailbox: &mut FightMailbox) {
    let roster: Vec<_> = world
        .query::<(&Unit, &Position, &Health)>()
        .without::<&Dead>()
        .iter()
        .filter(|(_, (_, _, health))| health.is_alive())
        .map(|(_, (unit, pos, _))| (unit.id, unit.faction, *pos))
        .collect();

    for (_entity, (unit, pos, stats, memory)) in world
        .query_mut::<(&Unit, &Position, &CombatStats, &mut ProximityMemory)>()
        .without::<&Dead>()
    {
        let inside: BTreeSet<_> = roster
            .iter()
            .filter(|(id, faction, other)| {
                *id != unit.id
                    && *faction != unit.faction
                    && pos.range_to(other) <= stats.threat_radius
            })
            .map(|(id, _, _)| *id)
            .collect();

        for &left in memory.inside.difference(&inside) {
            mailbox.publish(unit.id, ProximityEvent::OpponentLeft(left));
        }
        for &entered in inside.difference(&memory.inside) {
            mailbox.publish(unit.id, ProximityEvent::OpponentEntered(entered));
        }
        memory.inside = inside;
    }
}
