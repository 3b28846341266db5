//! Kinematic integration system.
//!
//! Updates Position from Velocity each tick: position += velocity * dt.

use glam::DVec2;
use hecs::World;

use skirmish_core::components::Dead;
use skirmish_core::types::{Position, Velocity};

/// Run kinematic integration for all living entities with Position + Velocity.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (pos, vel)) in world
        .query_mut::<(&mut Position, &Velocity)>()
        .without::<&Dead>()
    {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
    }
}

/// Velocity of `speed` pointing from `from` to `to`. Zero if they coincide.
pub fn heading(from: &Position, to: &Position, speed: f64) -> Velocity {
    let dir = (to_vec(to) - to_vec(from)).normalize_or_zero() * speed;
    Velocity::new(dir.x, dir.y)
}

/// Velocity of `speed` pointing directly away from `threat`.
pub fn away_from(from: &Position, threat: &Position, speed: f64) -> Velocity {
    let away = heading(threat, from, speed);
    if away.speed() > 0.0 {
        away
    } else {
        // Standing on top of the threat: pick a fixed direction.
        Velocity::new(-speed, 0.0)
    }
}

fn to_vec(pos: &Position) -> DVec2 {
    DVec2::new(pos.x, pos.y)
}
