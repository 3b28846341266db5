//! Tests for the simulation engine, signal routing, escape execution and cleanup.

use std::collections::BTreeMap;

use hecs::World;

use skirmish_core::commands::SimCommand;
use skirmish_core::components::*;
use skirmish_core::config::{AttackSettings, ScenarioConfig, UnitTemplate};
use skirmish_core::error::ConfigError;
use skirmish_core::enums::*;
use skirmish_core::events::{FightEvent, FightSignal, LifecycleEvent, ProximityEvent};
use skirmish_core::state::SkirmishSnapshot;
use skirmish_core::types::{Position, UnitId};
use skirmish_fight_ai::{Mobility, SnapshotProvider};

use crate::arena::FightContext;
use crate::engine::{SimConfig, SimulationEngine};
use crate::mailbox::FightMailbox;
use crate::scenario;
use crate::systems::movement;

fn started(scenario: &ScenarioConfig, seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::from_scenario(
        scenario,
        SimConfig {
            seed,
            ..Default::default()
        },
    )
    .unwrap();
    engine.queue_command(SimCommand::Start);
    engine
}

fn template(name: &str, faction: Faction, x: f64, y: f64, stats: CombatStats) -> UnitTemplate {
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

/// Tick `n` times and return the last snapshot.
fn run_ticks(engine: &mut SimulationEngine, n: usize) -> SkirmishSnapshot {
    let mut last = engine.tick().unwrap();
    for _ in 1..n {
        last = engine.tick().unwrap();
    }
    last
}

fn view(snapshot: &SkirmishSnapshot, unit: UnitId) -> Option<&skirmish_core::state::UnitView> {
    snapshot.units.iter().find(|u| u.id == unit)
}

fn nearest_hostile(snapshot: &SkirmishSnapshot, unit: UnitId) -> f64 {
    let Some(me) = view(snapshot, unit) else {
        return f64::NAN;
    };
    snapshot
        .units
        .iter()
        .filter(|u| u.faction != me.faction)
        .map(|u| u.position.range_to(&me.position))
        .fold(f64::INFINITY, f64::min)
}

fn escapes_of(snapshot: &SkirmishSnapshot, unit: UnitId) -> usize {
    snapshot
        .events
        .iter()
        .filter(|e| matches!(e, FightEvent::EscapeOrdered { unit: u, .. } if *u == unit))
        .count()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = started(&scenario::ambush(), 12345);
    let mut engine_b = started(&scenario::ambush(), 12345);

    for _ in 0..300 {
        let snap_a = engine_a.tick().unwrap();
        let snap_b = engine_b.tick().unwrap();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = started(&scenario::crossfire(), 111);
    let mut engine_b = started(&scenario::crossfire(), 222);

    // Spawn jitter alone is enough to tell the runs apart.
    let json_a = serde_json::to_string(&engine_a.tick().unwrap()).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick().unwrap()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should produce divergent output");
}

// ---- Phase and time ----

#[test]
fn test_nothing_runs_before_start() {
    let mut engine =
        SimulationEngine::from_scenario(&scenario::duel(), SimConfig::default()).unwrap();
    let snap = engine.tick().unwrap();
    assert_eq!(snap.phase, GamePhase::Setup);
    assert_eq!(snap.time.tick, 0);
    assert!(snap.events.is_empty());
    assert_eq!(snap.units.len(), 2);
}

#[test]
fn test_pause_and_resume() {
    let mut engine = started(&scenario::duel(), 1);
    engine.tick().unwrap();
    let tick = engine.time().tick;

    engine.queue_command(SimCommand::Pause);
    for _ in 0..10 {
        engine.tick().unwrap();
    }
    assert_eq!(engine.phase(), GamePhase::Paused);
    assert_eq!(engine.time().tick, tick);

    engine.queue_command(SimCommand::Resume);
    engine.tick().unwrap();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, tick + 1);
}

#[test]
fn test_time_scale_stretches_elapsed_time() {
    let mut engine = started(&scenario::duel(), 1);
    engine.queue_command(SimCommand::SetTimeScale { scale: 2.0 });
    for _ in 0..30 {
        engine.tick().unwrap();
    }
    assert!((engine.time().elapsed_secs - 2.0).abs() < 1e-9);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = started(&scenario::duel(), 1);
    engine.queue_command(SimCommand::SetTimeScale { scale: 100.0 });
    engine.tick().unwrap();
    assert_eq!(engine.time_scale(), 4.0);

    engine.queue_command(SimCommand::SetTimeScale { scale: -1.0 });
    engine.tick().unwrap();
    assert_eq!(engine.time_scale(), 0.0);

    engine.queue_command(SimCommand::SetTimeScale { scale: f64::NAN });
    engine.tick().unwrap();
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_zero_time_scale_freezes_the_world() {
    let mut engine = started(&scenario::duel(), 1);
    engine.queue_command(SimCommand::SetTimeScale { scale: 0.0 });
    let before = engine.tick().unwrap();
    let after = run_ticks(&mut engine, 60);
    for (a, b) in before.units.iter().zip(&after.units) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.health, b.health);
    }
    assert_eq!(after.time.elapsed_secs, 0.0);
}

// ---- Commands ----

#[test]
fn test_set_manner_command() {
    let mut engine = started(&scenario::duel(), 1);
    let ana = UnitId(0);
    engine.queue_command(SimCommand::SetManner {
        unit: ana,
        manner: FightManner::Careful,
    });
    // Unknown units are ignored.
    engine.queue_command(SimCommand::SetManner {
        unit: UnitId(99),
        manner: FightManner::Frantic,
    });
    let snap = engine.tick().unwrap();

    let controller = engine.controller(ana).unwrap();
    assert_eq!(controller.manner(), FightManner::Careful);
    assert!((controller.evaluation_horizon() - 4.5).abs() < 1e-9);
    assert_eq!(view(&snap, ana).unwrap().manner, FightManner::Careful);
}

#[test]
fn test_command_json_reaches_engine() {
    let mut engine = started(&scenario::duel(), 1);
    let command: SimCommand =
        serde_json::from_str(r#"{"type":"SetManner","unit":1,"manner":"frantic"}"#).unwrap();
    engine.queue_command(command);
    engine.tick().unwrap();
    assert_eq!(
        engine.controller(UnitId(1)).unwrap().manner(),
        FightManner::Frantic
    );
}

#[test]
fn test_scenario_manner_applied_at_spawn() {
    let engine = SimulationEngine::from_scenario(&scenario::crossfire(), SimConfig::default())
        .unwrap();
    assert_eq!(
        engine.controller(UnitId(0)).unwrap().manner(),
        FightManner::Careful
    );
    assert_eq!(
        engine.controller(UnitId(2)).unwrap().manner(),
        FightManner::Frantic
    );
}

#[test]
fn test_invalid_scenario_rejected() {
    let mut bad = scenario::duel();
    bad.settings.refresh_time = 0.0;
    assert!(SimulationEngine::from_scenario(&bad, SimConfig::default()).is_err());
}

#[test]
fn test_engine_rejects_invalid_settings() {
    for refresh_time in [0.0, -1.0, f64::NAN] {
        let mut config = SimConfig::default();
        config.settings.refresh_time = refresh_time;
        assert!(matches!(
            SimulationEngine::new(config),
            Err(ConfigError::Invalid {
                field: "refresh_time",
                ..
            })
        ));
    }

    let engine = SimulationEngine::new(SimConfig::default()).unwrap();
    assert_eq!(*engine.settings(), AttackSettings::default());
    assert_eq!(engine.phase(), GamePhase::Setup);
}

#[test]
fn test_engine_uses_scenario_settings() {
    let mut tuned = scenario::duel();
    tuned.settings.refresh_time = 0.5;
    let engine = SimulationEngine::from_scenario(&tuned, SimConfig::default()).unwrap();
    assert_eq!(engine.settings().refresh_time, 0.5);
    assert_eq!(
        engine.controller(UnitId(0)).unwrap().settings().refresh_time,
        0.5
    );
}

// ---- Targeting and proximity ----

#[test]
fn test_first_tick_acquires_targets() {
    let mut engine = started(&scenario::duel(), 7);
    let snap = engine.tick().unwrap();

    let acquired: Vec<_> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            FightEvent::TargetAcquired { unit, target } => Some((*unit, *target)),
            _ => None,
        })
        .collect();
    assert_eq!(acquired, vec![(UnitId(0), UnitId(1)), (UnitId(1), UnitId(0))]);
    assert_eq!(view(&snap, UnitId(0)).unwrap().target, Some(UnitId(1)));
    // A tracking test leaves the controller idle again.
    assert_eq!(
        view(&snap, UnitId(0)).unwrap().controller,
        ControllerPhase::Idle
    );
}

#[test]
fn test_units_out_of_sight_stay_put() {
    let scenario = ScenarioConfig {
        units: vec![
            template("Far A", Faction::Colonists, 0.0, 0.0, melee(100.0, 10.0)),
            template("Far B", Faction::Raiders, 100.0, 0.0, melee(100.0, 10.0)),
        ],
        ..Default::default()
    };
    let mut engine = started(&scenario, 3);
    let first = engine.tick().unwrap();
    let last = run_ticks(&mut engine, 30);
    assert!(last.events.is_empty());
    assert_eq!(first.units[0].position, last.units[0].position);
    assert_eq!(last.units[0].target, None);
}

#[test]
fn test_proximity_fills_threat_set_without_fighting() {
    // Blind units never pick a target, but still notice hostiles nearby.
    let blind = CombatStats {
        sight_radius: 0.0,
        ..melee(100.0, 10.0)
    };
    let scenario = ScenarioConfig {
        units: vec![
            template("Blind", Faction::Colonists, 0.0, 0.0, blind),
            template("Near", Faction::Raiders, 6.0, 0.0, blind),
            template("Other", Faction::Raiders, 0.0, 6.0, blind),
            template("Friend", Faction::Colonists, -2.0, -6.0, blind),
        ],
        ..Default::default()
    };
    let mut engine = started(&scenario, 3);
    let snap = engine.tick().unwrap();

    let me = view(&snap, UnitId(0)).unwrap();
    assert_eq!(me.threats, 2);
    assert_eq!(me.controller, ControllerPhase::Idle);
    assert_eq!(view(&snap, UnitId(1)).unwrap().threats, 2);
}

// ---- Escape ----

#[test]
fn test_ambushed_scout_escapes() {
    let mut engine = started(&scenario::ambush(), 9);
    let scout = UnitId(0);

    let mut escape_tick = None;
    let mut distance_at_escape = 0.0;
    for _ in 0..300 {
        let snap = engine.tick().unwrap();
        if escapes_of(&snap, scout) > 0 {
            escape_tick = Some(snap.time.tick);
            distance_at_escape = nearest_hostile(&snap, scout);
            let (win_time, lose_time) = snap
                .events
                .iter()
                .find_map(|e| match e {
                    FightEvent::EscapeOrdered {
                        unit,
                        win_time,
                        lose_time,
                        ..
                    } if *unit == scout => Some((*win_time, *lose_time)),
                    _ => None,
                })
                .unwrap();
            // Three raiders at 8 DPS each against at most 60 health.
            assert_eq!(win_time, None);
            let lose_time = lose_time.unwrap();
            assert!(lose_time <= 2.5 + 1e-9 && lose_time > 2.0);
            assert!(view(&snap, scout).unwrap().escaping);
            break;
        }
    }
    assert!(escape_tick.is_some(), "scout never escaped");

    // The attack is ended on the next tick.
    let next = engine.tick().unwrap();
    assert!(next.events.contains(&FightEvent::FightEnded {
        unit: scout,
        reason: FightEndReason::AttackEnded
    }));

    let last = run_ticks(&mut engine, 60);
    let me = view(&last, scout).unwrap();
    assert!(me.health > 0.0, "scout died while escaping");
    assert!(me.escaping);
    assert_eq!(me.target, None);
    assert!(nearest_hostile(&last, scout) > distance_at_escape);
}

#[test]
fn test_escaping_unit_stops_attacking() {
    let mut engine = started(&scenario::ambush(), 9);
    let scout = UnitId(0);
    for _ in 0..300 {
        let snap = engine.tick().unwrap();
        if escapes_of(&snap, scout) > 0 {
            break;
        }
    }
    let entity = engine.entity(scout).unwrap();
    let attacker = *engine.world().get::<&Attacker>(entity).unwrap();
    assert_eq!(attacker.attacked, None);
    assert_eq!(attacker.tracked, None);
    assert!(engine.world().get::<&Escaping>(entity).is_ok());
}

#[test]
fn test_duel_loser_runs_winner_stays() {
    let mut engine = started(&scenario::duel(), 5);
    let (ana, grit) = (UnitId(0), UnitId(1));

    let mut ana_escapes = 0;
    let mut grit_escapes = 0;
    let mut last = engine.tick().unwrap();
    for _ in 0..600 {
        last = engine.tick().unwrap();
        ana_escapes += escapes_of(&last, ana);
        grit_escapes += escapes_of(&last, grit);
    }
    assert_eq!(ana_escapes, 0);
    assert!(grit_escapes > 0, "the losing side never disengaged");
    assert!(view(&last, grit).is_some(), "the loser should have got away");
}

// ---- Death and cleanup ----

fn execution() -> ScenarioConfig {
    ScenarioConfig {
        units: vec![
            template("Killer", Faction::Colonists, 0.0, 0.0, melee(100.0, 50.0)),
            template("Victim", Faction::Raiders, 0.0, 0.0, melee(10.0, 1.0)),
            // Far outside every sight radius; keeps the skirmish running.
            template("Lookout", Faction::Raiders, 200.0, 0.0, melee(100.0, 1.0)),
        ],
        ..Default::default()
    }
}

#[test]
fn test_dead_unit_is_torn_down() {
    let mut engine = started(&execution(), 4);
    let (killer, victim) = (UnitId(0), UnitId(1));

    let mut died_at = None;
    for _ in 0..120 {
        let snap = engine.tick().unwrap();
        if snap.events.contains(&FightEvent::UnitDied { unit: victim }) {
            died_at = Some(snap.time.tick);
            assert!(view(&snap, victim).is_none());
            break;
        }
    }
    assert!(died_at.is_some(), "victim never died");
    assert!(engine.entity(victim).is_none());
    assert!(engine.controller(victim).is_none());
    assert!(!engine.mailbox().is_subscribed(victim));

    // The killer notices on the next tick and ends its fight.
    let snap = engine.tick().unwrap();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        FightEvent::FightEnded { unit, .. } if *unit == killer
    )));
    assert_eq!(
        engine.controller(killer).unwrap().phase(),
        ControllerPhase::Idle
    );
    assert_eq!(engine.phase(), GamePhase::Active);
}

#[test]
fn test_victim_tries_to_escape_first() {
    let mut engine = started(&execution(), 4);
    let snap = engine.tick().unwrap();
    // Once for the tracking test, once more when the attack starts.
    assert!(escapes_of(&snap, UnitId(1)) >= 1);
    assert_eq!(escapes_of(&snap, UnitId(0)), 0);
}

#[test]
fn test_skirmish_finishes_when_one_faction_remains() {
    let mut scenario = execution();
    scenario.units.pop();
    let mut engine = started(&scenario, 4);
    let mut last = engine.tick().unwrap();
    for _ in 0..120 {
        if last.phase == GamePhase::Finished {
            break;
        }
        last = engine.tick().unwrap();
    }
    assert_eq!(last.phase, GamePhase::Finished);
    assert_eq!(last.survivors(Faction::Colonists), 1);
    assert_eq!(last.survivors(Faction::Raiders), 0);

    // Finished is terminal.
    let tick = engine.time().tick;
    engine.tick().unwrap();
    assert_eq!(engine.time().tick, tick);
}

// ---- Mailbox ----

#[test]
fn test_mailbox_drops_unsubscribed() {
    let mut mailbox = FightMailbox::new();
    let unit = UnitId(1);
    assert!(!mailbox.publish(unit, LifecycleEvent::AttackStart));

    mailbox.subscribe(unit);
    assert!(mailbox.publish(unit, LifecycleEvent::TrackingStart));
    assert!(mailbox.publish(unit, ProximityEvent::OpponentEntered(UnitId(2))));
    assert_eq!(mailbox.pending(unit), 2);

    // Re-subscribing keeps what is queued.
    mailbox.subscribe(unit);
    assert_eq!(
        mailbox.drain(unit),
        vec![
            FightSignal::Lifecycle(LifecycleEvent::TrackingStart),
            FightSignal::Proximity(ProximityEvent::OpponentEntered(UnitId(2))),
        ]
    );
    assert!(mailbox.drain(unit).is_empty());

    mailbox.publish(unit, LifecycleEvent::AttackEnd);
    assert!(mailbox.unsubscribe(unit));
    assert!(!mailbox.unsubscribe(unit));
    assert!(mailbox.drain(unit).is_empty());
}

// ---- Fight context ----

#[test]
fn test_fight_context_reads_world() {
    let mut world = World::new();
    let stats = CombatStats {
        armor: 2.0,
        ..melee(80.0, 12.0)
    };
    let alive = world.spawn((
        stats,
        Health {
            current: 50.0,
            max: 80.0,
        },
        Attacker {
            tracked: Some(UnitId(1)),
            attacked: None,
        },
    ));
    let dead = world.spawn((stats, Health::full(80.0), Attacker::default(), Dead));
    let index = BTreeMap::from([(UnitId(0), alive), (UnitId(1), dead)]);

    let mut ctx = FightContext::new(&world, &index);
    let specs = ctx.get_specs(UnitId(0)).unwrap();
    assert_eq!(specs.health(), 50.0);
    assert_eq!(specs.melee_dps(), 12.0);
    assert_eq!(specs.armor(), 2.0);

    assert!(ctx.is_alive(UnitId(0)));
    assert!(!ctx.is_alive(UnitId(1)));
    assert!(!ctx.is_alive(UnitId(7)));
    assert!(ctx.get_specs(UnitId(7)).is_none());

    assert_eq!(ctx.tracked_unit(UnitId(0)), Some(UnitId(1)));
    assert_eq!(ctx.attacked_unit(UnitId(0)), None);

    ctx.escape(UnitId(0));
    ctx.escape(UnitId(0));
    assert_eq!(ctx.into_escapes(), vec![UnitId(0)]);
}

// ---- Movement ----

#[test]
fn test_movement_integration() {
    let mut world = World::new();
    let entity = world.spawn((
        Position::new(0.0, 0.0),
        skirmish_core::types::Velocity::new(3.0, -1.5),
    ));
    movement::run(&mut world, 0.5);
    let pos = *world.get::<&Position>(entity).unwrap();
    assert!((pos.x - 1.5).abs() < 1e-12);
    assert!((pos.y + 0.75).abs() < 1e-12);
}

#[test]
fn test_heading_and_away() {
    let origin = Position::new(0.0, 0.0);
    let east = Position::new(10.0, 0.0);
    let toward = movement::heading(&origin, &east, 3.0);
    assert!((toward.x - 3.0).abs() < 1e-12 && toward.y.abs() < 1e-12);

    let away = movement::away_from(&origin, &east, 2.0);
    assert!((away.x + 2.0).abs() < 1e-12);

    assert_eq!(movement::heading(&origin, &origin, 3.0).speed(), 0.0);
    assert!((movement::away_from(&origin, &origin, 2.0).speed() - 2.0).abs() < 1e-12);
}

// ---- Scenarios ----

#[test]
fn test_builtin_scenarios_are_valid() {
    for name in scenario::BUILTIN {
        let scenario = scenario::builtin(name).unwrap();
        scenario.validate().unwrap();
        assert!(!scenario.units.is_empty());
    }
    assert!(scenario::builtin("nope").is_none());
}
