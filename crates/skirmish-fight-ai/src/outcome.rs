//! Fight outcome prediction.
//!
//! Pure functions over `CombatSnapshot`s. Times are in seconds. A time
//! "within the horizon" is a guaranteed outcome and is returned as
//! `Some(secs)`; anything slower than the horizon is `None`.

use skirmish_core::config::AttackSettings;
use skirmish_core::types::CombatSnapshot;

/// Constants of the simplified combat math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatRules {
    /// Damage multiplier of a critical hit.
    pub critical_multiplier: f64,
    /// DPS removed per point of defender armor.
    pub armor_mitigation: f64,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self::from(&AttackSettings::default())
    }
}

impl From<&AttackSettings> for CombatRules {
    fn from(settings: &AttackSettings) -> Self {
        Self {
            critical_multiplier: settings.critical_multiplier,
            armor_mitigation: settings.armor_mitigation,
        }
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Guaranteed time for self to kill the primary opponent.
    pub win_time: Option<f64>,
    /// Guaranteed time for all hostiles together to kill self.
    pub lose_time: Option<f64>,
    pub defeated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutcomePredictor {
    rules: CombatRules,
}

impl OutcomePredictor {
    pub fn new(rules: CombatRules) -> Self {
        Self { rules }
    }

    /// Damage per second `attacker` actually deals to `defender` after
    /// accuracy, dodge, criticals and armor. Never negative.
    pub fn effective_dps(&self, attacker: &CombatSnapshot, defender: &CombatSnapshot) -> f64 {
        let hit_rate = attacker.accuracy() * (1.0 - defender.dodge_chance());
        let critical_factor =
            1.0 + attacker.critical_chance() * (self.rules.critical_multiplier - 1.0);
        let mitigation = defender.armor() * self.rules.armor_mitigation;
        (attacker.base_dps() * hit_rate * critical_factor - mitigation).max(0.0)
    }

    /// Seconds for `attacker` to bring `defender` to zero health.
    /// Infinite when the defender regenerates at least as fast.
    pub fn time_to_kill(&self, attacker: &CombatSnapshot, defender: &CombatSnapshot) -> f64 {
        let dps = self.effective_dps(attacker, defender);
        deplete(defender, dps)
    }

    /// Time for `me` to kill `opponent`, if it happens within `horizon`.
    pub fn would_win_in_time(
        &self,
        me: &CombatSnapshot,
        opponent: &CombatSnapshot,
        horizon: f64,
    ) -> Option<f64> {
        within(self.time_to_kill(me, opponent), horizon)
    }

    /// Time for the primary opponent and every surrounding hostile,
    /// attacking together, to kill `me`, if it happens within `horizon`.
    pub fn would_lose_in_time<'a>(
        &self,
        me: &CombatSnapshot,
        primary: &CombatSnapshot,
        surrounding: impl IntoIterator<Item = &'a CombatSnapshot>,
        horizon: f64,
    ) -> Option<f64> {
        let incoming = surrounding
            .into_iter()
            .map(|other| self.effective_dps(other, me))
            .sum::<f64>()
            + self.effective_dps(primary, me);
        within(deplete(me, incoming), horizon)
    }

    /// Evaluate both directions and compare them.
    pub fn assess<'a>(
        &self,
        me: &CombatSnapshot,
        primary: &CombatSnapshot,
        surrounding: impl IntoIterator<Item = &'a CombatSnapshot>,
        horizon: f64,
    ) -> Assessment {
        let win_time = self.would_win_in_time(me, primary, horizon);
        let lose_time = self.would_lose_in_time(me, primary, surrounding, horizon);
        Assessment {
            win_time,
            lose_time,
            defeated: would_be_defeated(win_time, lose_time),
        }
    }
}

/// Defeat is predicted when a loss is guaranteed and self cannot finish
/// the primary opponent strictly before it.
pub fn would_be_defeated(win_time: Option<f64>, lose_time: Option<f64>) -> bool {
    match (win_time, lose_time) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(win), Some(lose)) => win >= lose,
    }
}

fn deplete(defender: &CombatSnapshot, dps: f64) -> f64 {
    if defender.health() <= 0.0 {
        return 0.0;
    }
    let net = dps - defender.recovery_rate();
    if net <= 0.0 {
        f64::INFINITY
    } else {
        defender.health() / net
    }
}

fn within(time: f64, horizon: f64) -> Option<f64> {
    if horizon > 0.0 && time <= horizon {
        Some(time)
    } else {
        None
    }
}
