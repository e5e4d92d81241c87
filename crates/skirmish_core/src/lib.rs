//! # Skirmish Core
//!
//! Deterministic simulation core for a turn-based tactical skirmish on a
//! 5x5 board.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No network or terminal IO
//! - No randomness
//! - No wall-clock time (the host feeds elapsed seconds in)
//!
//! This separation enables:
//! - Authoritative headless hosts
//! - Replays verified by state hash
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`grid`] - Board topology, paths and reach
//! - [`registry`] - Minion storage with generation-checked handles
//! - [`battlefield`] - Tiles plus minions, occupancy bookkeeping
//! - [`economy`] - Resources, bench and graveyard
//! - [`movement`] / [`combat`] - Attack-move and 1v1 resolution
//! - [`validation`] - Structural checks on untrusted commands
//! - [`turn`] - Turn clock and rotation
//! - [`session`] - The host-facing match API
//! - [`replay`] - Recording and verified playback
//! - [`data`] - RON-loadable rules and species

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battlefield;
pub mod combat;
pub mod data;
pub mod economy;
pub mod error;
pub mod events;
pub mod grid;
pub mod movement;
pub mod registry;
pub mod replay;
pub mod session;
pub mod state;
pub mod turn;
pub mod validation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::CombatResult;
    pub use crate::data::{MatchRules, MinionData, SpeciesId};
    pub use crate::economy::{PlayerId, PlayerState};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{FailureCode, GameEvent};
    pub use crate::grid::{PlayerIndex, Tile, TileKind};
    pub use crate::registry::{Minion, Uid};
    pub use crate::replay::{Replay, ReplayEntry};
    pub use crate::session::{Command, CommandOutcome, MatchSession, MatchSnapshot};
    pub use crate::turn::GameplayPhase;
    pub use crate::validation::RejectReason;
}
