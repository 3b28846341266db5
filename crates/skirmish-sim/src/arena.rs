//! The world as seen by an engagement controller.
//!
//! `FightContext` answers snapshot and liveness queries from the ECS and
//! records escape orders. Escapes are applied by the escape system after
//! every controller has run, so the world is never mutated mid-evaluation.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use skirmish_core::components::{Attacker, CombatStats, Dead, Health};
use skirmish_core::types::{CombatSnapshot, UnitId};
use skirmish_fight_ai::{Mobility, SnapshotProvider};

pub struct FightContext<'a> {
    world: &'a World,
    index: &'a BTreeMap<UnitId, Entity>,
    escapes: Vec<UnitId>,
}

impl<'a> FightContext<'a> {
    pub fn new(world: &'a World, index: &'a BTreeMap<UnitId, Entity>) -> Self {
        Self {
            world,
            index,
            escapes: Vec::new(),
        }
    }

    /// Escape orders recorded so far, in the order they were given.
    pub fn into_escapes(self) -> Vec<UnitId> {
        self.escapes
    }

    fn attacker(&self, unit: UnitId) -> Option<Attacker> {
        let entity = *self.index.get(&unit)?;
        self.world.get::<&Attacker>(entity).ok().map(|a| *a)
    }
}

impl SnapshotProvider<UnitId> for FightContext<'_> {
    fn get_specs(&self, unit: UnitId) -> Option<CombatSnapshot> {
        let entity = *self.index.get(&unit)?;
        let stats = self.world.get::<&CombatStats>(entity).ok()?;
        let health = self.world.get::<&Health>(entity).ok()?;
        Some(stats.snapshot(&health))
    }

    fn is_alive(&self, unit: UnitId) -> bool {
        let Some(&entity) = self.index.get(&unit) else {
            return false;
        };
        if self.world.get::<&Dead>(entity).is_ok() {
            return false;
        }
        self.world
            .get::<&Health>(entity)
            .map(|health| health.is_alive())
            .unwrap_or(false)
    }
}

impl Mobility<UnitId> for FightContext<'_> {
    fn escape(&mut self, unit: UnitId) {
        if !self.escapes.contains(&unit) {
            self.escapes.push(unit);
        }
    }

    fn tracked_unit(&self, unit: UnitId) -> Option<UnitId> {
        self.attacker(unit)?.tracked
    }

    fn attacked_unit(&self, unit: UnitId) -> Option<UnitId> {
        self.attacker(unit)?.attacked
    }
}
