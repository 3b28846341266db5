//! Entity spawn factories for setting up the simulation world.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::config::UnitTemplate;
use skirmish_core::constants::SPAWN_JITTER;
use skirmish_core::types::{Position, UnitId, Velocity};

/// Spawn a unit from its template.
/// The position is jittered slightly so that stacked units separate.
pub fn spawn_unit(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    id: UnitId,
    template: &UnitTemplate,
) -> Entity {
    let position = Position::new(
        template.position.x + rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
        template.position.y + rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
    );

    world.spawn((
        Unit {
            id,
            name: template.name.clone(),
            faction: template.faction,
        },
        position,
        Velocity::zero(),
        Health::full(template.stats.max_health),
        template.stats,
        Attacker::default(),
        ProximityMemory::default(),
    ))
}
