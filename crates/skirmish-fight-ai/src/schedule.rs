//! Cooperative periodic tasks driven by the simulation tick.
//!
//! Nothing runs on its own: the owner advances the task with the scaled
//! time of each tick and acts when it reports a firing. Cancelling is
//! dropping the task.

/// Slack for float accumulation when comparing against the period.
const FIRE_EPSILON: f64 = 1e-9;

/// Identifies one started task; a restarted slot gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Fires every `period` seconds of advanced time, at most once per advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicTask {
    id: TaskId,
    period: f64,
    until_next: f64,
}

impl PeriodicTask {
    /// A task whose first firing is one full period away.
    pub fn new(id: TaskId, period: f64) -> Self {
        Self {
            id,
            period,
            until_next: period,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Seconds until the next firing.
    pub fn until_next(&self) -> f64 {
        self.until_next
    }

    /// Let `dt` seconds pass. Returns true if the task is due.
    /// A long pause does not produce a burst of catch-up firings.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        self.until_next -= dt;
        if self.until_next > FIRE_EPSILON {
            return false;
        }
        self.until_next += self.period;
        if self.until_next <= FIRE_EPSILON {
            self.until_next = self.period;
        }
        true
    }
}

/// Holds at most one running task. Starting a new one always cancels the
/// previous one first.
#[derive(Debug, Clone, Default)]
pub struct TaskSlot {
    current: Option<PeriodicTask>,
    next_id: u64,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is running with a fresh task.
    pub fn start(&mut self, period: f64) -> TaskId {
        self.cancel();
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.current = Some(PeriodicTask::new(id, period));
        id
    }

    /// Stop the running task. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Advance the running task, if any.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.current.as_mut().is_some_and(|task| task.advance(dt))
    }

    pub fn active(&self) -> Option<&PeriodicTask> {
        self.current.as_ref()
    }
}
