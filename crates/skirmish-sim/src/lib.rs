//! Headless skirmish simulation.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate, routes
//! lifecycle and proximity signals to each unit's engagement controller,
//! and produces `SkirmishSnapshot`s.

pub mod arena;
pub mod engine;
pub mod mailbox;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use skirmish_core as core;

#[cfg(test)]
mod tests;
