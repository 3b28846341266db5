//! Fight decision AI for SKIRMISH.
//!
//! Predicts whether a combatant would lose its current fight, given its
//! opponent and the hostiles around it, and tells it to disengage in time.

pub mod controller;
pub mod outcome;
pub mod schedule;
pub mod threat_set;

pub use skirmish_core as core;

pub use controller::{ControllerOutput, EngagementController, Mobility, SnapshotProvider};
pub use outcome::{Assessment, CombatRules, OutcomePredictor};
pub use threat_set::ThreatSet;
