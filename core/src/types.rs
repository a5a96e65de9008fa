//! Shared primitive types used across the experiment engine.

/// A 1-based round number within a session.
pub type Round = u32;

/// A player-local, monotonically increasing puzzle sequence number.
pub type Iteration = u32;

/// Wall-clock time in seconds since the Unix epoch.
pub type UnixTime = f64;

/// Stable identifier of a participant, unique within a session.
pub type PlayerId = String;

/// Stable identifier of a group of co-playing participants.
pub type GroupId = String;

/// The canonical session identifier.
pub type SessionId = String;
