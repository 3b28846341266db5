//! Built-in scenarios, usable without a TOML file.

use skirmish_core::components::CombatStats;
use skirmish_core::config::{AttackSettings, ScenarioConfig, UnitTemplate};
use skirmish_core::enums::{Faction, FightManner, WeaponType};
use skirmish_core::types::Position;

/// Names accepted by `builtin`.
pub const BUILTIN: [&str; 3] = ["duel", "ambush", "crossfire"];

pub fn builtin(name: &str) -> Option<ScenarioConfig> {
    match name {
        "duel" => Some(duel()),
        "ambush" => Some(ambush()),
        "crossfire" => Some(crossfire()),
        _ => None,
    }
}

/// One colonist against one slightly weaker raider. Nobody should run.
pub fn duel() -> ScenarioConfig {
    ScenarioConfig {
        seed: None,
        settings: AttackSettings::default(),
        units: vec![
            unit("Ana", Faction::Colonists, 0.0, 0.0, melee(100.0, 10.0)),
            unit("Grit", Faction::Raiders, 8.0, 0.0, melee(100.0, 8.0)),
        ],
    }
}

/// A lone scout walks into three raiders. Taken one at a time it would win,
/// together they kill it in 2.5s.
pub fn ambush() -> ScenarioConfig {
    ScenarioConfig {
        seed: None,
        settings: AttackSettings::default(),
        units: vec![
            unit("Scout", Faction::Colonists, 0.0, 0.0, melee(60.0, 12.0)),
            unit("Raider A", Faction::Raiders, 6.0, 0.0, melee(40.0, 8.0)),
            unit("Raider B", Faction::Raiders, 6.0, 2.5, melee(40.0, 8.0)),
            unit("Raider C", Faction::Raiders, 6.0, -2.5, melee(40.0, 8.0)),
        ],
    }
}

/// Mixed melee and ranged on both sides with different fight manners.
pub fn crossfire() -> ScenarioConfig {
    let mut rifle = ranged(80.0, 9.0);
    rifle.ranged_accuracy = 0.8;
    rifle.ranged_critical_chance = 0.1;

    let mut brute = melee(140.0, 14.0);
    brute.armor = 2.0;

    let mut medic = melee(90.0, 6.0);
    medic.recovery_rate = 2.0;
    medic.dodge_chance = 0.2;

    ScenarioConfig {
        seed: None,
        settings: AttackSettings::default(),
        units: vec![
            UnitTemplate {
                manner: FightManner::Careful,
                ..unit("Rook", Faction::Colonists, 0.0, 0.0, rifle)
            },
            unit("Mara", Faction::Colonists, 2.0, 4.0, medic),
            UnitTemplate {
                manner: FightManner::Frantic,
                ..unit("Tusk", Faction::Raiders, 20.0, 0.0, brute)
            },
            unit("Vex", Faction::Raiders, 22.0, 5.0, rifle),
        ],
    }
}

fn unit(name: &str, faction: Faction, x: f64, y: f64, stats: CombatStats) -> UnitTemplate {
    UnitTemplate {
        name: name.to_string(),
        faction,
        position: Position::new(x, y),
        manner: FightManner::Normal,
        stats,
    }
}

fn melee(max_health: f64, dps: f64) -> CombatStats {
    CombatStats {
        max_health,
        melee_damage: dps,
        ..CombatStats::default()
    }
}

fn ranged(max_health: f64, dps: f64) -> CombatStats {
    CombatStats {
        max_health,
        weapon: WeaponType::Ranged,
        ranged_damage: dps,
        ..CombatStats::default()
    }
}
