//! Tick loop and end-of-run summary.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use skirmish_core::constants::TICK_RATE;
use skirmish_core::enums::{Faction, GamePhase};
use skirmish_core::error::FightError;
use skirmish_core::events::FightEvent;
use skirmish_core::state::{SkirmishSnapshot, UnitView};
use skirmish_core::types::UnitId;
use skirmish_sim::engine::SimulationEngine;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

pub struct RunOptions {
    pub max_ticks: u64,
    pub realtime: bool,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub outcome: String,
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub escapes: BTreeMap<String, usize>,
    pub deaths: Vec<String>,
    pub survivors: BTreeMap<String, usize>,
    pub units: Vec<UnitView>,
}

/// Tick until the skirmish finishes or `max_ticks` is reached, handing
/// every snapshot to `on_snapshot`.
pub fn run(
    engine: &mut SimulationEngine,
    seed: u64,
    options: &RunOptions,
    mut on_snapshot: impl FnMut(&SkirmishSnapshot),
) -> Result<Summary, FightError> {
    let mut escapes: BTreeMap<String, usize> = BTreeMap::new();
    let mut deaths = Vec::new();
    let mut names = BTreeMap::new();
    let mut last = SkirmishSnapshot::default();
    let mut next_tick_time = Instant::now();

    for _ in 0..options.max_ticks {
        let snapshot = engine.tick()?;
        for unit in &snapshot.units {
            names.entry(unit.id).or_insert_with(|| unit.name.clone());
        }
        for event in &snapshot.events {
            match event {
                FightEvent::EscapeOrdered { unit, .. } => {
                    *escapes.entry(display_name(&names, unit)).or_default() += 1;
                }
                FightEvent::UnitDied { unit } => deaths.push(display_name(&names, unit)),
                _ => {}
            }
        }
        on_snapshot(&snapshot);
        let finished = snapshot.phase == GamePhase::Finished;
        last = snapshot;
        if finished {
            break;
        }

        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind, restart pacing from now
                next_tick_time = now;
            }
        }
    }

    let summary = summarize(last, seed, escapes, deaths);
    info!(outcome = %summary.outcome, ticks = summary.ticks, "run complete");
    Ok(summary)
}

fn display_name(names: &BTreeMap<UnitId, String>, unit: &UnitId) -> String {
    match names.get(unit) {
        Some(name) => format!("{name} {unit}"),
        None => unit.to_string(),
    }
}

pub fn summarize(
    last: SkirmishSnapshot,
    seed: u64,
    escapes: BTreeMap<String, usize>,
    deaths: Vec<String>,
) -> Summary {
    let survivors: BTreeMap<String, usize> = [Faction::Colonists, Faction::Raiders]
        .into_iter()
        .map(|faction| (faction_name(faction).to_string(), last.survivors(faction)))
        .collect();

    let standing: Vec<_> = survivors.iter().filter(|(_, n)| **n > 0).collect();
    let outcome = match (last.phase, standing.as_slice()) {
        (GamePhase::Finished, [(winner, _)]) => format!("{winner} win"),
        (GamePhase::Finished, _) => "no survivors".to_string(),
        _ => "undecided".to_string(),
    };

    Summary {
        outcome,
        seed,
        ticks: last.time.tick,
        elapsed_secs: last.time.elapsed_secs,
        escapes,
        deaths,
        survivors,
        units: last.units,
    }
}

fn faction_name(faction: Faction) -> &'static str {
    match faction {
        Faction::Colonists => "colonists",
        Faction::Raiders => "raiders",
    }
}
