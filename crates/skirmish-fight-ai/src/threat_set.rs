//! Surrounding hostiles and the stats they had when they came into range.

use std::collections::HashMap;
use std::hash::Hash;

use skirmish_core::types::CombatSnapshot;

use crate::controller::SnapshotProvider;

/// Opponent id → snapshot captured on proximity-enter.
///
/// Entries are assumed alive and hostile until removed. They are not
/// re-sampled unless `refresh` is called explicitly.
#[derive(Debug, Clone)]
pub struct ThreatSet<Id> {
    entries: HashMap<Id, CombatSnapshot>,
}

impl<Id> Default for ThreatSet<Id> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash> ThreatSet<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hostile. The primary opponent is tracked separately and is
    /// never added; an id already present keeps its first capture.
    /// Returns whether the entry was inserted.
    pub fn add(&mut self, id: Id, snapshot: CombatSnapshot, primary: Option<&Id>) -> bool {
        if primary == Some(&id) || self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, snapshot);
        true
    }

    /// Forget a hostile. Absent ids are ignored.
    pub fn remove(&mut self, id: &Id) -> Option<CombatSnapshot> {
        self.entries.remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captured snapshots, in no particular order.
    pub fn snapshots(&self) -> impl Iterator<Item = &CombatSnapshot> {
        self.entries.values()
    }

    /// Re-sample every entry, dropping hostiles the provider reports dead
    /// or no longer knows.
    pub fn refresh<P: SnapshotProvider<Id> + ?Sized>(&mut self, provider: &P) {
        self.entries.retain(|id, snapshot| {
            if !provider.is_alive(*id) {
                return false;
            }
            match provider.get_specs(*id) {
                Some(fresh) => {
                    *snapshot = fresh;
                    true
                }
                None => false,
            }
        });
    }
}
