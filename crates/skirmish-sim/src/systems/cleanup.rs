//! Cleanup system: removes dead units from the world.

use hecs::{Entity, World};

use skirmish_core::components::{Dead, Unit};
use skirmish_core::types::UnitId;

/// Despawn every unit tagged `Dead` and return their ids so the engine can
/// tear down the matching controllers and mailboxes.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) -> Vec<UnitId> {
    despawn_buffer.clear();

    let mut removed = Vec::new();
    for (entity, unit) in world.query_mut::<&Unit>().with::<&Dead>() {
        despawn_buffer.push(entity);
        removed.push(unit.id);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    removed
}
