//! Shared primitive types used across the entire simulation.

/// A turn counter. One turn = one decision = one in-game week.
pub type Turn = u64;

/// A quarter counter. Four turns per quarter.
pub type Quarter = u64;

/// A stable, unique identifier for scenarios and options.
pub type EntityId = String;

/// The canonical session identifier.
pub type SessionId = String;
