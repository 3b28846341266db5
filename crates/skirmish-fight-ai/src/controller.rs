//! Engagement controller: decides when a combatant should disengage.
//!
//! One controller per combatant. It reacts to the combatant's attack
//! lifecycle (tracking, attack start, attack end) and to hostiles entering
//! or leaving its threat radius, and while fighting it re-evaluates the
//! fight on a fixed cadence of simulation time.
//!
//! ```text
//!   Idle ──TrackingStart──▶ Assessing ──(one evaluation)──▶ Idle
//!   Idle/Assessing ──AttackStart──▶ Fighting ──every refresh_time──▶ evaluate
//!   Fighting ──AttackEnd / opponent lost / shutdown──▶ Idle
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, info};

use skirmish_core::config::AttackSettings;
use skirmish_core::enums::{ControllerPhase, FightEndReason, FightManner};
use skirmish_core::error::{FightError, FightResult};
use skirmish_core::events::{LifecycleEvent, ProximityEvent};
use skirmish_core::types::CombatSnapshot;

use crate::outcome::{Assessment, CombatRules, OutcomePredictor};
use crate::schedule::{TaskId, TaskSlot};
use crate::threat_set::ThreatSet;

/// Source of combat snapshots. Must be cheap and side-effect free.
pub trait SnapshotProvider<Id> {
    /// Current stats of `unit`, or `None` if it no longer exists.
    fn get_specs(&self, unit: Id) -> Option<CombatSnapshot>;

    fn is_alive(&self, unit: Id) -> bool;
}

/// The combatant's movement/attack collaborator.
pub trait Mobility<Id> {
    /// Order `unit` to break off and run.
    fn escape(&mut self, unit: Id);

    /// Opponent `unit` is currently chasing.
    fn tracked_unit(&self, unit: Id) -> Option<Id>;

    /// Opponent `unit` is currently hitting.
    fn attacked_unit(&self, unit: Id) -> Option<Id>;
}

/// What happened while handling one event or tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOutput<Id> {
    /// Evaluation performed, if any.
    pub assessment: Option<Assessment>,
    /// Whether `Mobility::escape` was called.
    pub escaped: bool,
    /// Opponent of a fight that just started.
    pub started: Option<Id>,
    /// Set when a fight cycle ended.
    pub ended: Option<FightEndReason>,
}

impl<Id> Default for ControllerOutput<Id> {
    fn default() -> Self {
        Self {
            assessment: None,
            escaped: false,
            started: None,
            ended: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngagementController<Id> {
    owner: Id,
    settings: AttackSettings,
    predictor: OutcomePredictor,
    manner: FightManner,
    evaluation_horizon: f64,
    phase: ControllerPhase,
    fighting: bool,
    primary_opponent: Option<Id>,
    self_snapshot: Option<CombatSnapshot>,
    opponent_snapshot: Option<CombatSnapshot>,
    threats: ThreatSet<Id>,
    task: TaskSlot,
}

impl<Id: Copy + Eq + Hash + Debug> EngagementController<Id> {
    pub fn new(owner: Id, settings: AttackSettings) -> Self {
        Self {
            owner,
            predictor: OutcomePredictor::new(CombatRules::from(&settings)),
            manner: FightManner::Normal,
            evaluation_horizon: settings.advance_time,
            settings,
            phase: ControllerPhase::Idle,
            fighting: false,
            primary_opponent: None,
            self_snapshot: None,
            opponent_snapshot: None,
            threats: ThreatSet::new(),
            task: TaskSlot::new(),
        }
    }

    pub fn with_manner(mut self, manner: FightManner) -> Self {
        self.set_manner(manner);
        self
    }

    pub fn owner(&self) -> Id {
        self.owner
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn is_fighting(&self) -> bool {
        self.fighting
    }

    pub fn primary_opponent(&self) -> Option<Id> {
        self.primary_opponent
    }

    pub fn manner(&self) -> FightManner {
        self.manner
    }

    /// Current horizon in seconds: base advance time × manner multiplier.
    pub fn evaluation_horizon(&self) -> f64 {
        self.evaluation_horizon
    }

    pub fn settings(&self) -> &AttackSettings {
        &self.settings
    }

    pub fn threats(&self) -> &ThreatSet<Id> {
        &self.threats
    }

    pub fn self_snapshot(&self) -> Option<&CombatSnapshot> {
        self.self_snapshot.as_ref()
    }

    pub fn opponent_snapshot(&self) -> Option<&CombatSnapshot> {
        self.opponent_snapshot.as_ref()
    }

    /// Id of the running re-evaluation task, if any.
    pub fn active_task(&self) -> Option<TaskId> {
        self.task.active().map(|task| task.id())
    }

    /// Change risk posture. The multiplier always applies to the base
    /// advance time, so switching back and forth never compounds.
    pub fn set_manner(&mut self, manner: FightManner) {
        self.manner = manner;
        self.evaluation_horizon =
            self.settings.advance_time * self.settings.manner_multiplier(manner);
        debug!(
            owner = ?self.owner,
            %manner,
            horizon = self.evaluation_horizon,
            "fight manner changed"
        );
    }

    /// Change risk posture by name. Unknown names are a caller bug.
    pub fn set_manner_by_name(&mut self, name: &str) -> FightResult<()> {
        let manner = name.parse::<FightManner>()?;
        self.set_manner(manner);
        Ok(())
    }

    /// Route an attack lifecycle event.
    pub fn handle_lifecycle<E>(
        &mut self,
        event: LifecycleEvent,
        env: &mut E,
    ) -> FightResult<ControllerOutput<Id>>
    where
        E: SnapshotProvider<Id> + Mobility<Id>,
    {
        match event {
            LifecycleEvent::TrackingStart => self.test_fight(env),
            LifecycleEvent::AttackStart => self.start_fight(env),
            LifecycleEvent::AttackEnd => {
                let mut output = ControllerOutput::default();
                if self.phase == ControllerPhase::Fighting {
                    self.stop_fight(FightEndReason::AttackEnded);
                    output.ended = Some(FightEndReason::AttackEnded);
                }
                Ok(output)
            }
        }
    }

    /// Route a proximity event into the threat set. Never changes state.
    /// Returns whether the threat set changed.
    pub fn handle_proximity<P>(&mut self, event: ProximityEvent<Id>, provider: &P) -> bool
    where
        P: SnapshotProvider<Id> + ?Sized,
    {
        match event {
            ProximityEvent::OpponentEntered(opponent) => {
                if opponent == self.owner || !provider.is_alive(opponent) {
                    return false;
                }
                let primary = if self.fighting {
                    self.primary_opponent.as_ref()
                } else {
                    None
                };
                match provider.get_specs(opponent) {
                    Some(snapshot) => self.threats.add(opponent, snapshot, primary),
                    None => false,
                }
            }
            ProximityEvent::OpponentLeft(opponent) => self.threats.remove(&opponent).is_some(),
        }
    }

    /// Advance the re-evaluation task by `dt` seconds of scaled time.
    pub fn tick<E>(&mut self, dt: f64, env: &mut E) -> FightResult<ControllerOutput<Id>>
    where
        E: SnapshotProvider<Id> + Mobility<Id>,
    {
        let mut output = ControllerOutput::default();
        if self.phase != ControllerPhase::Fighting || !self.task.advance(dt) {
            return Ok(output);
        }
        self.run_iteration(env, &mut output)?;
        Ok(output)
    }

    /// Compare guaranteed win against guaranteed loss for the current
    /// snapshots. Only meaningful during a fight.
    pub fn assess(&self) -> FightResult<Assessment> {
        if !self.fighting {
            return Err(FightError::NotFighting);
        }
        let (Some(me), Some(opponent)) = (&self.self_snapshot, &self.opponent_snapshot) else {
            return Err(FightError::NotFighting);
        };
        Ok(self
            .predictor
            .assess(me, opponent, self.threats.snapshots(), self.evaluation_horizon))
    }

    pub fn would_be_defeated(&self) -> FightResult<bool> {
        self.assess().map(|assessment| assessment.defeated)
    }

    /// Tear down: cancel any running task and forget every opponent.
    /// Returns the end reason if a fight was in progress.
    pub fn shutdown(&mut self) -> Option<FightEndReason> {
        let was_fighting = self.phase == ControllerPhase::Fighting;
        self.stop_fight(FightEndReason::Shutdown);
        self.threats.clear();
        was_fighting.then_some(FightEndReason::Shutdown)
    }

    fn test_fight<E>(&mut self, env: &mut E) -> FightResult<ControllerOutput<Id>>
    where
        E: SnapshotProvider<Id> + Mobility<Id>,
    {
        let mut output = ControllerOutput::default();
        if self.phase == ControllerPhase::Fighting {
            debug!(owner = ?self.owner, "tracking started mid-fight, ignored");
            return Ok(output);
        }
        self.threats.clear();
        let Some(target) = env.tracked_unit(self.owner) else {
            debug!(owner = ?self.owner, "tracking started without a target, ignored");
            return Ok(output);
        };

        self.phase = ControllerPhase::Assessing;
        self.fighting = true;
        self.primary_opponent = Some(target);

        let result = if self.refresh_specs(&*env) {
            self.evaluate(env).map(Some)
        } else {
            Ok(None)
        };

        self.phase = ControllerPhase::Idle;
        self.fighting = false;
        self.primary_opponent = None;
        self.self_snapshot = None;
        self.opponent_snapshot = None;

        if let Some(assessment) = result? {
            output.escaped = assessment.defeated;
            output.assessment = Some(assessment);
        }
        Ok(output)
    }

    fn start_fight<E>(&mut self, env: &mut E) -> FightResult<ControllerOutput<Id>>
    where
        E: SnapshotProvider<Id> + Mobility<Id>,
    {
        let mut output = ControllerOutput::default();
        if self.phase == ControllerPhase::Fighting {
            debug!(owner = ?self.owner, "attack started while already fighting, ignored");
            return Ok(output);
        }
        let Some(target) = env.attacked_unit(self.owner) else {
            debug!(owner = ?self.owner, "attack started without a target, ignored");
            return Ok(output);
        };

        self.phase = ControllerPhase::Fighting;
        self.fighting = true;
        self.primary_opponent = Some(target);
        self.threats.remove(&target);
        let task = self.task.start(self.settings.refresh_time);
        output.started = Some(target);
        debug!(owner = ?self.owner, opponent = ?target, ?task, "fight started");

        self.run_iteration(env, &mut output)?;
        Ok(output)
    }

    fn run_iteration<E>(
        &mut self,
        env: &mut E,
        output: &mut ControllerOutput<Id>,
    ) -> FightResult<()>
    where
        E: SnapshotProvider<Id> + Mobility<Id>,
    {
        if !self.refresh_specs(&*env) {
            self.stop_fight(FightEndReason::OpponentLost);
            output.ended = Some(FightEndReason::OpponentLost);
            return Ok(());
        }
        if self.settings.refresh_surrounding {
            self.threats.refresh(&*env);
        }
        let assessment = self.evaluate(env)?;
        output.escaped = assessment.defeated;
        output.assessment = Some(assessment);
        Ok(())
    }

    /// Assess and order an escape if defeat is predicted.
    fn evaluate<E>(&mut self, env: &mut E) -> FightResult<Assessment>
    where
        E: Mobility<Id>,
    {
        let assessment = self.assess()?;
        if assessment.defeated {
            info!(
                owner = ?self.owner,
                opponent = ?self.primary_opponent,
                win_time = ?assessment.win_time,
                lose_time = ?assessment.lose_time,
                threats = self.threats.len(),
                "defeat predicted, escaping"
            );
            env.escape(self.owner);
        }
        Ok(assessment)
    }

    /// Sample self and the primary opponent. False when the opponent is
    /// gone or dead (or self has vanished), in which case nothing is stored.
    fn refresh_specs<P>(&mut self, provider: &P) -> bool
    where
        P: SnapshotProvider<Id> + ?Sized,
    {
        self.self_snapshot = provider.get_specs(self.owner);
        if self.self_snapshot.is_none() {
            return false;
        }
        let Some(opponent) = self.primary_opponent else {
            return false;
        };
        if !provider.is_alive(opponent) {
            return false;
        }
        self.opponent_snapshot = provider.get_specs(opponent);
        self.opponent_snapshot.is_some()
    }

    fn stop_fight(&mut self, reason: FightEndReason) {
        let cancelled = self.task.cancel();
        if self.phase == ControllerPhase::Fighting {
            debug!(owner = ?self.owner, ?reason, cancelled, "fight ended");
        }
        self.phase = ControllerPhase::Idle;
        self.fighting = false;
        self.primary_opponent = None;
        self.self_snapshot = None;
        self.opponent_snapshot = None;
    }
}
