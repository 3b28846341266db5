//! Headless skirmish runner.
//!
//! Loads a scenario (built-in name or TOML file), runs the simulation and
//! prints a JSON summary on stdout. Logs go to stderr; set `RUST_LOG` for
//! more detail.

mod runner;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::error;

use skirmish_core::commands::SimCommand;
use skirmish_core::config::ScenarioConfig;
use skirmish_core::enums::FightManner;
use skirmish_core::error::{ConfigError, FightError};
use skirmish_core::types::UnitId;
use skirmish_sim::engine::{SimConfig, SimulationEngine};
use skirmish_sim::scenario;

use crate::runner::RunOptions;

const DEFAULT_SEED: u64 = 42;

/// Run a skirmish and report who fought, who ran and who survived
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a headless skirmish and print a JSON summary")]
struct Args {
    /// Built-in scenario name (duel, ambush, crossfire) or path to a TOML file
    #[arg(long, default_value = "ambush")]
    scenario: String,

    /// Maximum ticks to run (30 ticks per simulated second at 1x)
    #[arg(long, default_value_t = 1800)]
    ticks: u64,

    /// Random seed; overrides the scenario's own seed
    #[arg(long)]
    seed: Option<u64>,

    /// Time scale between 0 and 4
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Override a unit's fight manner, e.g. `--manner 0=careful` (repeatable)
    #[arg(long = "manner", value_parser = parse_manner_override)]
    manners: Vec<(UnitId, FightManner)>,

    /// Print every tick's events as JSON lines before the summary
    #[arg(long)]
    events: bool,

    /// Pace ticks in wall-clock time instead of running flat out
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unknown scenario {0:?}: not a built-in name and no such file")]
    UnknownScenario(String),
    #[error("scenario: {0}")]
    Config(#[from] ConfigError),
    #[error("simulation: {0}")]
    Fight(#[from] FightError),
    #[error("output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "skirmish failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let scenario = load_scenario(&args.scenario)?;
    let seed = args.seed.or(scenario.seed).unwrap_or(DEFAULT_SEED);

    let mut engine = SimulationEngine::from_scenario(
        &scenario,
        SimConfig {
            seed,
            time_scale: args.time_scale,
            ..Default::default()
        },
    )?;
    engine.queue_commands(
        args.manners
            .iter()
            .map(|&(unit, manner)| SimCommand::SetManner { unit, manner }),
    );
    engine.queue_command(SimCommand::Start);

    let options = RunOptions {
        max_ticks: args.ticks,
        realtime: args.realtime,
    };
    let summary = runner::run(&mut engine, seed, &options, |snapshot| {
        if args.events && !snapshot.events.is_empty() {
            match serde_json::to_string(&snapshot.events) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(%err, "could not serialize events"),
            }
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_scenario(name: &str) -> Result<ScenarioConfig, CliError> {
    if let Some(builtin) = scenario::builtin(name) {
        return Ok(builtin);
    }
    if Path::new(name).is_file() {
        return Ok(ScenarioConfig::load(name)?);
    }
    Err(CliError::UnknownScenario(name.to_string()))
}

/// Parse `UNIT=MANNER`, e.g. `2=frantic`.
fn parse_manner_override(raw: &str) -> Result<(UnitId, FightManner), String> {
    let (unit, manner) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected UNIT=MANNER, got {raw:?}"))?;
    let unit = unit
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("bad unit id {unit:?}: {err}"))?;
    let manner = manner.parse::<FightManner>().map_err(|err| err.to_string())?;
    Ok((UnitId(unit), manner))
}

#[cfg(test)]
mod tests;
