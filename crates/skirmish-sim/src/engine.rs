//! Simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world and one engagement controller
//! per unit, processes commands, runs all systems, and produces
//! `SkirmishSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use skirmish_core::commands::SimCommand;
use skirmish_core::components::{Dead, Health, Unit};
use skirmish_core::config::{AttackSettings, ScenarioConfig, UnitTemplate};
use skirmish_core::constants::{DT, MAX_TIME_SCALE};
use skirmish_core::enums::GamePhase;
use skirmish_core::error::{ConfigError, FightError};
use skirmish_core::events::FightEvent;
use skirmish_core::state::SkirmishSnapshot;
use skirmish_core::types::{SimTime, UnitId};
use skirmish_fight_ai::{CombatRules, EngagementController, OutcomePredictor};

use crate::mailbox::FightMailbox;
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    /// Fight-decision tuning shared by every controller.
    pub settings: AttackSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            settings: AttackSettings::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    settings: AttackSettings,
    predictor: OutcomePredictor,
    next_unit_id: u32,
    index: BTreeMap<UnitId, Entity>,
    controllers: BTreeMap<UnitId, EngagementController<UnitId>>,
    mailbox: FightMailbox,
    command_queue: VecDeque<SimCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<FightEvent>,
}

impl SimulationEngine {
    /// Create an empty engine with the given config. Rejects settings
    /// that fail validation.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.settings.validate()?;
        Ok(Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: clamp_time_scale(config.time_scale).unwrap_or(1.0),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            settings: config.settings,
            predictor: OutcomePredictor::new(CombatRules::from(&config.settings)),
            next_unit_id: 0,
            index: BTreeMap::new(),
            controllers: BTreeMap::new(),
            mailbox: FightMailbox::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Create an engine populated with every unit of `scenario`.
    /// The scenario's settings replace those of `config`.
    pub fn from_scenario(
        scenario: &ScenarioConfig,
        config: SimConfig,
    ) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let mut engine = Self::new(SimConfig {
            settings: scenario.settings,
            ..config
        })?;
        for template in &scenario.units {
            engine.spawn_unit(template);
        }
        info!(
            units = scenario.units.len(),
            seed = config.seed,
            "scenario loaded"
        );
        Ok(engine)
    }

    /// Add a unit with its own controller and mailbox subscription.
    pub fn spawn_unit(&mut self, template: &UnitTemplate) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let entity = world_setup::spawn_unit(&mut self.world, &mut self.rng, id, template);
        self.index.insert(id, entity);
        self.mailbox.subscribe(id);
        self.controllers.insert(
            id,
            EngagementController::new(id, self.settings).with_manner(template.manner),
        );
        debug!(%id, name = %template.name, faction = ?template.faction, "unit spawned");
        id
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    ///
    /// A controller error means a broken contract somewhere in the engine;
    /// it is logged and returned, and the tick is left incomplete.
    pub fn tick(&mut self) -> Result<SkirmishSnapshot, FightError> {
        self.process_commands();

        if self.phase == GamePhase::Active {
            let dt = DT * self.time_scale;
            self.run_systems(dt)?;
            self.time.advance(dt);
            self.check_finished();
        }

        let events = std::mem::take(&mut self.events);
        Ok(systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.controllers,
            events,
        ))
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Fight-decision tuning shared by every controller.
    pub fn settings(&self) -> &AttackSettings {
        &self.settings
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The entity of a unit that has not been despawned yet.
    pub fn entity(&self, unit: UnitId) -> Option<Entity> {
        self.index.get(&unit).copied()
    }

    pub fn controller(&self, unit: UnitId) -> Option<&EngagementController<UnitId>> {
        self.controllers.get(&unit)
    }

    pub fn mailbox(&self) -> &FightMailbox {
        &self.mailbox
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::Start => {
                if self.phase == GamePhase::Setup {
                    self.phase = GamePhase::Active;
                    self.time = SimTime::default();
                    info!(units = self.index.len(), "skirmish started");
                }
            }
            SimCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            SimCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            SimCommand::SetTimeScale { scale } => {
                match clamp_time_scale(scale) {
                    Some(scale) => self.time_scale = scale,
                    None => warn!("ignoring NaN time scale"),
                }
            }
            SimCommand::SetManner { unit, manner } => match self.controllers.get_mut(&unit) {
                Some(controller) => controller.set_manner(manner),
                None => warn!(%unit, %manner, "no controller for unit, manner not changed"),
            },
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) -> Result<(), FightError> {
        // 1. Target search + approach (TrackingStart / AttackStart / AttackEnd)
        systems::targeting::run(&mut self.world, &mut self.mailbox, &mut self.events);
        // 2. Threat-radius detection (OpponentEntered / OpponentLeft)
        systems::proximity::run(&mut self.world, &mut self.mailbox);
        // 3. Fight behavior (deliver signals, advance controllers)
        let escapes = systems::fight_behavior::run(
            &self.world,
            &self.index,
            &mut self.controllers,
            &mut self.mailbox,
            dt,
            &mut self.events,
        )?;
        // 4. Escape execution
        systems::escape::order(&mut self.world, &self.index, &escapes, &mut self.mailbox);
        systems::escape::run(&mut self.world, dt);
        // 5. Damage, regeneration, death
        systems::combat::run(&mut self.world, &self.predictor, dt, &mut self.events);
        // 6. Movement integration
        systems::movement::run(&mut self.world, dt);
        // 7. Cleanup (dead units)
        let removed = systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        for unit in removed {
            self.retire(unit);
        }
        Ok(())
    }

    /// Tear down everything the engine keeps for a unit outside the world.
    fn retire(&mut self, unit: UnitId) {
        self.index.remove(&unit);
        self.mailbox.unsubscribe(unit);
        if let Some(mut controller) = self.controllers.remove(&unit) {
            if let Some(reason) = controller.shutdown() {
                self.events.push(FightEvent::FightEnded { unit, reason });
            }
        }
    }

    /// Finish once at most one faction has living units.
    fn check_finished(&mut self) {
        let factions: BTreeSet<_> = self
            .world
            .query::<(&Unit, &Health)>()
            .without::<&Dead>()
            .iter()
            .filter(|(_, (_, health))| health.is_alive())
            .map(|(_, (unit, _))| unit.faction)
            .collect();
        if factions.len() < 2 {
            self.phase = GamePhase::Finished;
            info!(tick = self.time.tick, winner = ?factions.first(), "skirmish finished");
        }
    }
}

fn clamp_time_scale(scale: f64) -> Option<f64> {
    (!scale.is_nan()).then(|| scale.clamp(0.0, MAX_TIME_SCALE))
}
