//! Error types for the game simulation.
//!
//! Only construction-time problems are errors. Malformed entries inside a
//! tick batch are defined no-ops and never surface here.

use thiserror::Error;

use crate::components::{UnitId, UnitType};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Bad game creation parameters.
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    /// A balance table entry is inconsistent with its unit type.
    #[error("Invalid balance for {unit_type:?}: {reason}")]
    InvalidBalance {
        /// Unit type whose stats are wrong.
        unit_type: UnitType,
        /// What is wrong with them.
        reason: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Binary state or replay encoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A replay was written by an incompatible format version.
    #[error("Replay version mismatch: expected {expected}, found {found}")]
    ReplayVersion {
        /// Version this build reads.
        expected: u32,
        /// Version stored in the replay.
        found: u32,
    },

    /// An explicit API call named a unit that is not in the registry.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Replayed state diverged from the recorded state.
    #[error("Desync detected at tick {tick}: local hash {local_hash}, remote hash {remote_hash}")]
    DesyncDetected {
        /// Tick where desync occurred.
        tick: u64,
        /// Hash produced by the re-run.
        local_hash: u64,
        /// Hash stored in the recording.
        remote_hash: u64,
    },
}
