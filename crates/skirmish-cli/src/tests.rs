use clap::Parser;

use skirmish_core::enums::{Faction, FightManner, GamePhase};
use skirmish_core::types::UnitId;
use skirmish_sim::engine::{SimConfig, SimulationEngine};
use skirmish_sim::scenario;

use super::*;
use crate::runner::{self, RunOptions};

#[test]
fn test_manner_override_parses() {
    assert_eq!(
        parse_manner_override("2=frantic").unwrap(),
        (UnitId(2), FightManner::Frantic)
    );
    assert_eq!(
        parse_manner_override(" 0 = Careful ").unwrap(),
        (UnitId(0), FightManner::Careful)
    );
    assert!(parse_manner_override("2").is_err());
    assert!(parse_manner_override("x=normal").is_err());
    assert!(parse_manner_override("1=reckless").is_err());
}

#[test]
fn test_args_defaults_and_overrides() {
    let args = Args::try_parse_from(["skirmish"]).unwrap();
    assert_eq!(args.scenario, "ambush");
    assert_eq!(args.ticks, 1800);
    assert_eq!(args.seed, None);
    assert!(args.manners.is_empty());

    let args = Args::try_parse_from([
        "skirmish",
        "--scenario",
        "duel",
        "--seed",
        "7",
        "--time-scale",
        "2",
        "--manner",
        "0=careful",
        "--manner",
        "1=frantic",
    ])
    .unwrap();
    assert_eq!(args.seed, Some(7));
    assert_eq!(args.time_scale, 2.0);
    assert_eq!(
        args.manners,
        vec![
            (UnitId(0), FightManner::Careful),
            (UnitId(1), FightManner::Frantic)
        ]
    );

    assert!(Args::try_parse_from(["skirmish", "--manner", "oops"]).is_err());
}

#[test]
fn test_load_scenario_builtin_and_file() {
    assert_eq!(load_scenario("duel").unwrap().units.len(), 2);
    assert!(matches!(
        load_scenario("no-such-scenario"),
        Err(CliError::UnknownScenario(_))
    ));

    let path = std::env::temp_dir().join(format!("skirmish-cli-test-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
seed = 9

[[units]]
name = "Solo"
faction = "colonists"
position = { x = 0.0, y = 0.0 }
"#,
    )
    .unwrap();
    let loaded = load_scenario(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.seed, Some(9));
    assert_eq!(loaded.units[0].name, "Solo");
}

#[test]
fn test_shipped_outpost_scenario_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios/outpost.toml");
    let outpost = load_scenario(path.to_str().unwrap()).unwrap();
    assert_eq!(outpost.seed, Some(2024));
    assert_eq!(outpost.units.len(), 5);
    assert!(outpost.settings.refresh_surrounding);
    assert_eq!(outpost.units[0].name, "Hale");
    assert_eq!(outpost.units[0].manner, FightManner::Careful);

    let engine = SimulationEngine::from_scenario(&outpost, SimConfig::default()).unwrap();
    assert!(engine.settings().refresh_surrounding);
}

#[test]
fn test_short_run_is_undecided() {
    let mut engine =
        SimulationEngine::from_scenario(&scenario::duel(), SimConfig::default()).unwrap();
    engine.queue_command(skirmish_core::commands::SimCommand::Start);
    let options = RunOptions {
        max_ticks: 30,
        realtime: false,
    };
    let mut seen = 0;
    let summary = runner::run(&mut engine, 42, &options, |_| seen += 1).unwrap();
    assert_eq!(seen, 30);
    assert_eq!(summary.outcome, "undecided");
    assert_eq!(summary.ticks, 30);
    assert_eq!(summary.survivors["colonists"], 1);
    assert_eq!(summary.survivors["raiders"], 1);
    assert!(summary.deaths.is_empty());
}

#[test]
fn test_summary_names_the_winner() {
    let mut snapshot = skirmish_core::state::SkirmishSnapshot {
        phase: GamePhase::Finished,
        ..Default::default()
    };
    snapshot.units.push(skirmish_core::state::UnitView {
        id: UnitId(0),
        name: "Ana".into(),
        faction: Faction::Colonists,
        position: Default::default(),
        health: 12.0,
        max_health: 100.0,
        manner: FightManner::Normal,
        controller: Default::default(),
        target: None,
        escaping: false,
        threats: 0,
    });
    let summary = runner::summarize(snapshot, 1, Default::default(), vec!["Grit #1".into()]);
    assert_eq!(summary.outcome, "colonists win");
    assert_eq!(summary.deaths, vec!["Grit #1".to_string()]);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["survivors"]["raiders"], 0);
}
