//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! State that is not a component (controllers, mailbox) is passed in by the
//! engine.

pub mod cleanup;
pub mod combat;
pub mod escape;
pub mod fight_behavior;
pub mod movement;
pub mod proximity;
pub mod snapshot;
pub mod targeting;
