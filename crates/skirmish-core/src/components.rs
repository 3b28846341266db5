//! ECS components for hecs entities.
//!
//! Components are plain data structs. The only logic here composes a
//! `CombatSnapshot` out of the raw stats.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{Faction, WeaponType};
use crate::types::{CombatSnapshot, UnitId};

/// Marker and identity of a combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
}

/// Hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Raw combat stats after buffs and equipment have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub max_health: f64,
    /// Health regenerated per second.
    pub recovery_rate: f64,
    pub armor: f64,
    pub dodge_chance: f64,
    pub weapon: WeaponType,

    pub melee_damage: f64,
    pub melee_damage_multiplier: f64,
    /// Hits per second.
    pub melee_attack_speed: f64,
    pub melee_critical_chance: f64,
    pub melee_accuracy: f64,
    pub melee_range: f64,

    pub ranged_damage: f64,
    pub ranged_damage_multiplier: f64,
    pub ranged_attack_speed: f64,
    pub ranged_critical_chance: f64,
    pub ranged_accuracy: f64,
    pub ranged_range: f64,

    pub move_speed: f64,
    /// Radius within which hostiles are picked as targets.
    pub sight_radius: f64,
    /// Radius within which hostiles count as surrounding threats.
    pub threat_radius: f64,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            recovery_rate: 0.0,
            armor: 0.0,
            dodge_chance: 0.0,
            weapon: WeaponType::Melee,
            melee_damage: 10.0,
            melee_damage_multiplier: 1.0,
            melee_attack_speed: 1.0,
            melee_critical_chance: 0.0,
            melee_accuracy: 1.0,
            melee_range: DEFAULT_MELEE_RANGE,
            ranged_damage: 0.0,
            ranged_damage_multiplier: 1.0,
            ranged_attack_speed: 1.0,
            ranged_critical_chance: 0.0,
            ranged_accuracy: 1.0,
            ranged_range: DEFAULT_RANGED_RANGE,
            move_speed: DEFAULT_MOVE_SPEED,
            sight_radius: DEFAULT_SIGHT_RADIUS,
            threat_radius: DEFAULT_THREAT_RADIUS,
        }
    }
}

impl CombatStats {
    pub fn melee_dps(&self) -> f64 {
        self.melee_damage * self.melee_damage_multiplier * self.melee_attack_speed
    }

    pub fn ranged_dps(&self) -> f64 {
        self.ranged_damage * self.ranged_damage_multiplier * self.ranged_attack_speed
    }

    /// Reach of the equipped weapon.
    pub fn attack_range(&self) -> f64 {
        match self.weapon {
            WeaponType::Melee => self.melee_range,
            WeaponType::Ranged => self.ranged_range,
        }
    }

    /// Capture the current stats, using the critical chance and accuracy of
    /// the equipped weapon.
    pub fn snapshot(&self, health: &Health) -> CombatSnapshot {
        let (critical_chance, accuracy) = match self.weapon {
            WeaponType::Melee => (self.melee_critical_chance, self.melee_accuracy),
            WeaponType::Ranged => (self.ranged_critical_chance, self.ranged_accuracy),
        };
        CombatSnapshot::default()
            .with_health(health.current)
            .with_recovery_rate(self.recovery_rate)
            .with_melee_dps(self.melee_dps())
            .with_ranged_dps(self.ranged_dps())
            .with_armor(self.armor)
            .with_dodge_chance(self.dodge_chance)
            .with_critical_chance(critical_chance)
            .with_accuracy(accuracy)
            .with_weapon(self.weapon)
    }
}

/// Who this unit is chasing and who it is hitting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Attacker {
    pub tracked: Option<UnitId>,
    pub attacked: Option<UnitId>,
}

/// Present while a unit is running away from a fight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Escaping {
    /// Unit being fled from.
    pub from: UnitId,
    pub remaining_secs: f64,
}

/// Tag for units whose health reached zero; removed by cleanup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Dead;

/// Hostiles currently inside this unit's threat radius, as last reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProximityMemory {
    pub inside: BTreeSet<UnitId>,
}
