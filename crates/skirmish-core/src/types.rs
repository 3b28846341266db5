//! Fundamental simulation types and the combat snapshot record.

use serde::{Deserialize, Serialize};

use crate::enums::WeaponType;

/// 2D position on the battlefield ground plane (meters).
/// x = East, y = North.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// 2D velocity on the ground plane (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

/// Stable, player-facing identifier of a combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds, after time scaling.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another position in meters.
    pub fn range_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl SimTime {
    /// Advance by one tick covering `dt` seconds of scaled time.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// A combatant's fight-relevant stats captured at one instant.
///
/// Snapshots are plain values: once built they never change, and the only
/// way to observe new stats is to sample a fresh one. Rates are kept
/// non-negative and chances are clamped to `[0, 1]` on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    health: f64,
    recovery_rate: f64,
    melee_dps: f64,
    ranged_dps: f64,
    armor: f64,
    dodge_chance: f64,
    critical_chance: f64,
    accuracy: f64,
    weapon: WeaponType,
}

impl Default for CombatSnapshot {
    fn default() -> Self {
        Self {
            health: 0.0,
            recovery_rate: 0.0,
            melee_dps: 0.0,
            ranged_dps: 0.0,
            armor: 0.0,
            dodge_chance: 0.0,
            critical_chance: 0.0,
            accuracy: 1.0,
            weapon: WeaponType::Melee,
        }
    }
}

impl CombatSnapshot {
    /// A melee combatant with perfect accuracy and no defensive stats.
    pub fn new(health: f64, melee_dps: f64) -> Self {
        Self::default()
            .with_health(health)
            .with_melee_dps(melee_dps)
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = non_negative(health);
        self
    }

    pub fn with_recovery_rate(mut self, rate: f64) -> Self {
        self.recovery_rate = non_negative(rate);
        self
    }

    pub fn with_melee_dps(mut self, dps: f64) -> Self {
        self.melee_dps = non_negative(dps);
        self
    }

    pub fn with_ranged_dps(mut self, dps: f64) -> Self {
        self.ranged_dps = non_negative(dps);
        self
    }

    pub fn with_armor(mut self, armor: f64) -> Self {
        self.armor = non_negative(armor);
        self
    }

    pub fn with_dodge_chance(mut self, chance: f64) -> Self {
        self.dodge_chance = unit_interval(chance);
        self
    }

    pub fn with_critical_chance(mut self, chance: f64) -> Self {
        self.critical_chance = unit_interval(chance);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = unit_interval(accuracy);
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponType) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    pub fn melee_dps(&self) -> f64 {
        self.melee_dps
    }

    pub fn ranged_dps(&self) -> f64 {
        self.ranged_dps
    }

    pub fn armor(&self) -> f64 {
        self.armor
    }

    pub fn dodge_chance(&self) -> f64 {
        self.dodge_chance
    }

    pub fn critical_chance(&self) -> f64 {
        self.critical_chance
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn weapon(&self) -> WeaponType {
        self.weapon
    }

    /// Raw damage per second of the currently equipped weapon.
    pub fn base_dps(&self) -> f64 {
        match self.weapon {
            WeaponType::Melee => self.melee_dps,
            WeaponType::Ranged => self.ranged_dps,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
