//! Per-unit signal queues between the world systems and the controllers.
//!
//! Systems publish, the fight behavior system drains. Signals addressed to
//! a unit that is not subscribed are dropped.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use skirmish_core::events::FightSignal;
use skirmish_core::types::UnitId;

#[derive(Debug, Default)]
pub struct FightMailbox {
    queues: BTreeMap<UnitId, VecDeque<FightSignal>>,
}

impl FightMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting signals for `unit`. Re-subscribing keeps pending signals.
    pub fn subscribe(&mut self, unit: UnitId) {
        self.queues.entry(unit).or_default();
    }

    /// Stop accepting signals for `unit` and discard anything pending.
    pub fn unsubscribe(&mut self, unit: UnitId) -> bool {
        self.queues.remove(&unit).is_some()
    }

    pub fn is_subscribed(&self, unit: UnitId) -> bool {
        self.queues.contains_key(&unit)
    }

    /// Queue a signal. Returns false if it was dropped.
    pub fn publish(&mut self, unit: UnitId, signal: impl Into<FightSignal>) -> bool {
        let signal = signal.into();
        match self.queues.get_mut(&unit) {
            Some(queue) => {
                queue.push_back(signal);
                true
            }
            None => {
                trace!(%unit, ?signal, "dropped signal for unsubscribed unit");
                false
            }
        }
    }

    /// Take every pending signal for `unit`, oldest first.
    pub fn drain(&mut self, unit: UnitId) -> Vec<FightSignal> {
        self.queues
            .get_mut(&unit)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn pending(&self, unit: UnitId) -> usize {
        self.queues.get(&unit).map_or(0, VecDeque::len)
    }
}
