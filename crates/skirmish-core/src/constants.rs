//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick at 1x time scale.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Upper bound for the time scale command.
pub const MAX_TIME_SCALE: f64 = 4.0;

// --- Fight decision ---

/// Base evaluation horizon (s): a win or loss must happen within this
/// window to count as guaranteed.
pub const DEFAULT_ADVANCE_TIME_SECS: f64 = 3.0;

/// Period of fight re-evaluation while engaged (s).
pub const DEFAULT_REFRESH_TIME_SECS: f64 = 1.0;

/// Horizon multiplier for the careful manner.
pub const DEFAULT_CAREFUL_MULTIPLIER: f64 = 1.5;

/// Horizon multiplier for the frantic manner.
pub const DEFAULT_FRANTIC_MULTIPLIER: f64 = 0.5;

/// Damage multiplier of a critical hit.
pub const DEFAULT_CRITICAL_MULTIPLIER: f64 = 2.0;

/// DPS removed from an attack per point of defender armor.
pub const DEFAULT_ARMOR_MITIGATION: f64 = 1.0;

// --- Units ---

/// Radius within which a unit notices hostiles to attack (m).
pub const DEFAULT_SIGHT_RADIUS: f64 = 30.0;

/// Radius within which hostiles count as surrounding threats (m).
pub const DEFAULT_THREAT_RADIUS: f64 = 12.0;

/// Melee attack range (m).
pub const DEFAULT_MELEE_RANGE: f64 = 1.5;

/// Ranged attack range (m).
pub const DEFAULT_RANGED_RANGE: f64 = 15.0;

/// Default ground movement speed (m/s).
pub const DEFAULT_MOVE_SPEED: f64 = 3.0;

/// How long an escaping unit runs before it may pick a new target (s).
pub const ESCAPE_DURATION_SECS: f64 = 4.0;

/// Escaping units move faster than their walking speed by this factor.
pub const ESCAPE_SPEED_FACTOR: f64 = 1.25;

/// Maximum random offset applied to scenario spawn positions (m).
pub const SPAWN_JITTER: f64 = 0.5;

/// An attack is dropped once the target is this far beyond weapon reach.
pub const DISENGAGE_RANGE_FACTOR: f64 = 1.25;
