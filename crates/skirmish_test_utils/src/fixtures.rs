//! Test fixtures and helpers.
//!
//! Pre-built sessions and scripted inputs for consistent testing.

use skirmish_core::data::{MatchRules, MinionData, SpeciesId};
use skirmish_core::economy::PlayerId;
use skirmish_core::grid::PlayerIndex;
use skirmish_core::session::{Command, MatchSession};

/// Identity seated first in fixture sessions.
pub const ALICE: &str = "alice";

/// Identity seated second in fixture sessions.
pub const BOB: &str = "bob";

/// Identity that is never seated.
pub const STRANGER: &str = "mallory";

/// First seat's identity.
#[must_use]
pub fn alice() -> PlayerId {
    PlayerId::from(ALICE)
}

/// Second seat's identity.
#[must_use]
pub fn bob() -> PlayerId {
    PlayerId::from(BOB)
}

/// Shorthand for a species id.
#[must_use]
pub fn species(id: &str) -> SpeciesId {
    SpeciesId::from(id)
}

/// A two-player session on the default rules.
///
/// # Panics
///
/// Panics if the default rules are invalid.
#[must_use]
pub fn two_player_session() -> MatchSession {
    MatchSession::new(MatchRules::default(), &[alice(), bob()]).expect("default rules are valid")
}

/// A two-player session with a custom roster and starting bench.
///
/// # Panics
///
/// Panics if the resulting rules are invalid.
#[must_use]
pub fn session_with_roster(roster: Vec<MinionData>, bench: &[&str]) -> MatchSession {
    let rules = MatchRules {
        roster,
        starting_bench: bench.iter().map(|id| species(id)).collect(),
        ..MatchRules::default()
    };
    MatchSession::new(rules, &[alice(), bob()]).expect("fixture rules are valid")
}

/// Identity seated at `seat`, or a stranger for an empty seat.
#[must_use]
pub fn actor_for(session: &MatchSession, seat: u8) -> PlayerId {
    session
        .state()
        .player(PlayerIndex(seat))
        .map_or_else(|| PlayerId::from(STRANGER), |p| p.id.clone())
}

/// One scripted input to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// The player in `seat` (or a stranger, for an empty seat) issues a command.
    Command {
        /// Seat of the actor.
        seat: u8,
        /// Command issued.
        command: Command,
    },
    /// The turn clock advances.
    Tick(u32),
}

/// Apply one step, ignoring command outcomes.
///
/// # Panics
///
/// Panics if the session reports an internal error.
pub fn apply_step(session: &mut MatchSession, step: &ScriptStep) {
    match step {
        ScriptStep::Command { seat, command } => {
            let actor = actor_for(session, *seat);
            session
                .handle_command(&actor, command.clone())
                .expect("command must not corrupt the session");
        }
        ScriptStep::Tick(elapsed) => {
            session.tick(*elapsed);
        }
    }
}

/// Apply a whole script.
///
/// # Panics
///
/// Panics if the session reports an internal error.
pub fn apply_script(session: &mut MatchSession, script: &[ScriptStep]) {
    for step in script {
        apply_step(session, step);
    }
}

/// A short opening where both sides spawn and close in to fight.
#[must_use]
pub fn skirmish_script() -> Vec<ScriptStep> {
    vec![
        ScriptStep::Command {
            seat: 0,
            command: Command::SpawnAndMove {
                species: species("speed"),
                tile: 0,
                to: 10,
            },
        },
        ScriptStep::Command {
            seat: 1,
            command: Command::SpawnAndMove {
                species: species("technical"),
                tile: 24,
                to: 19,
            },
        },
        ScriptStep::Command {
            seat: 0,
            command: Command::Move { from: 10, to: 16 },
        },
        ScriptStep::Tick(45),
        ScriptStep::Command {
            seat: 0,
            command: Command::Spawn {
                species: species("power"),
                tile: 0,
            },
        },
        ScriptStep::Command {
            seat: 1,
            command: Command::Move { from: 19, to: 17 },
        },
        ScriptStep::Command {
            seat: 0,
            command: Command::Attack { from: 16, to: 17 },
        },
    ]
}
