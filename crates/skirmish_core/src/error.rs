//! Error types for the battle simulation.
//!
//! These cover API misuse, data loading and internal defects. A command that
//! fails validation is not an error: it is reported through
//! [`CommandOutcome::Rejected`](crate::session::CommandOutcome::Rejected).

use thiserror::Error;

use crate::registry::Uid;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// No participant with this identity is seated in the match.
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// A match needs one or two participants.
    #[error("Invalid participant count: {0} (expected 1 or 2)")]
    InvalidParticipantCount(usize),

    /// The same identity was seated twice.
    #[error("Duplicate player: {0}")]
    DuplicatePlayer(String),

    /// Species id not present in the match roster.
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    /// No live minion carries this uid.
    #[error("Minion not found: {0}")]
    MinionNotFound(Uid),

    /// A registry handle outlived the minion it pointed at.
    #[error("Stale minion handle: slot {slot}, generation {generation}")]
    StaleHandle {
        /// Arena slot the handle referred to.
        slot: u32,
        /// Generation recorded in the handle.
        generation: u32,
    },

    /// Tile index outside the board.
    #[error("Tile index out of range: {0}")]
    TileOutOfRange(usize),

    /// Battlefield bookkeeping disagrees with itself. Always a defect.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Match rules failed validation.
    #[error("Invalid match rules: {0:?}")]
    InvalidRules(Vec<String>),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Binary (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Replaying a recorded match did not reproduce the recorded state.
    #[error("Replay mismatch: expected hash {expected}, got {actual}")]
    ReplayMismatch {
        /// Hash recorded when the replay was finalized.
        expected: u64,
        /// Hash produced by re-execution.
        actual: u64,
    },

    /// Replay written by an incompatible format version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Filesystem error while loading or saving.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
