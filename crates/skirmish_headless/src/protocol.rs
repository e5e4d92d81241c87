//! JSON protocol for headless match communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Outcomes, snapshots and other responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every line with exactly one response
//! 4. On `quit` (or end of input) the runner saves the replay if asked to
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","players":["alice","bob"]}
//! -> {"cmd":"spawn","player":"alice","species":"speed","tile":0}
//! <- {"type":"outcome","cmd":"spawn","outcome":{"status":"executed","success":true},"events":[...]}
//! -> {"cmd":"move","player":"alice","from":0,"to":5}
//! <- {"type":"invalid_action","cmd":"move","reason":"not_your_turn","message":"..."}
//! -> {"cmd":"tick","elapsed":45}
//! <- {"type":"ticked","turn_changed":true,"timer":45,"events":[...]}
//! -> {"cmd":"query"}
//! <- {"type":"state","hash":...,"snapshot":{...}}
//! ```

use serde::{Deserialize, Serialize};

use skirmish_core::data::SpeciesId;
use skirmish_core::economy::PlayerId;
use skirmish_core::events::GameEvent;
use skirmish_core::session::{Command as CoreCommand, CommandOutcome, MatchSnapshot};
use skirmish_core::validation::RejectReason;

/// Protocol version announced in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Spawn a benched species onto a spawn tile.
    Spawn {
        /// Acting player.
        player: String,
        /// Species id.
        species: String,
        /// Spawn tile.
        tile: usize,
    },

    /// Attack-move the minion on `from` to `to`.
    Move {
        /// Acting player.
        player: String,
        /// Source tile.
        from: usize,
        /// Destination tile.
        to: usize,
    },

    /// Attack the enemy on `to` with the minion on `from`.
    Attack {
        /// Acting player.
        player: String,
        /// Source tile.
        from: usize,
        /// Enemy tile.
        to: usize,
    },

    /// Spawn, then attack-move the new minion.
    SpawnAndMove {
        /// Acting player.
        player: String,
        /// Species id.
        species: String,
        /// Spawn tile.
        tile: usize,
        /// Destination tile.
        to: usize,
    },

    /// Advance the turn clock (default: 1 second).
    Tick {
        /// Seconds elapsed.
        #[serde(default = "default_elapsed")]
        elapsed: u32,
    },

    /// Query the current snapshot without changing anything.
    Query,

    /// Report the current state hash.
    Hash,

    /// Tiles the minion on `tile` could move to.
    Reach {
        /// Tile of the minion.
        tile: usize,
    },

    /// Place a minion directly for scenario setup.
    Deploy {
        /// Owning seat (0 or 1).
        owner: u8,
        /// Species id.
        species: String,
        /// Target tile.
        tile: usize,
        /// Whether it is a token.
        #[serde(default)]
        token: bool,
    },

    /// A participant connected.
    Join {
        /// Participant id.
        player: String,
    },

    /// A participant disconnected.
    Leave {
        /// Participant id.
        player: String,
    },

    /// Stop the runner.
    Quit,
}

const fn default_elapsed() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Seated participants in seat order.
        players: Vec<String>,
    },

    /// A player command passed validation and ran.
    Outcome {
        /// Command name.
        cmd: String,
        /// Whether it took effect.
        outcome: CommandOutcome,
        /// Events of this command cycle.
        events: Vec<GameEvent>,
    },

    /// A player command failed validation. Nothing changed.
    InvalidAction {
        /// Command name.
        cmd: String,
        /// First failed check.
        reason: RejectReason,
        /// Human-readable reason.
        message: String,
    },

    /// The turn clock advanced.
    Ticked {
        /// Whether the turn passed to the next player.
        turn_changed: bool,
        /// Seconds left in the current turn.
        timer: u32,
        /// Events queued by the turn change, if any.
        events: Vec<GameEvent>,
    },

    /// Current match snapshot.
    State {
        /// State hash.
        hash: u64,
        /// The snapshot.
        snapshot: MatchSnapshot,
    },

    /// State hash for determinism verification.
    StateHash {
        /// State hash.
        hash: u64,
    },

    /// Reachable tiles.
    Reach {
        /// Queried tile.
        tile: usize,
        /// Reachable tiles, ascending.
        tiles: Vec<usize>,
    },

    /// A minion was deployed.
    Deployed {
        /// Its uid.
        uid: u32,
    },

    /// Acknowledgment of a command without a richer answer.
    Ack {
        /// Command name.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command name, when the line parsed.
        cmd: Option<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(players: &[PlayerId]) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            players: players.iter().map(ToString::to_string).collect(),
        }
    }

    /// Create an acknowledgment.
    #[must_use]
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed or unknown commands.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for responses.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Move { .. } => "move",
            Self::Attack { .. } => "attack",
            Self::SpawnAndMove { .. } => "spawn_and_move",
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Reach { .. } => "reach",
            Self::Deploy { .. } => "deploy",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Quit => "quit",
        }
    }

    /// Split a player command into actor and core command. Host commands
    /// return `None`.
    #[must_use]
    pub fn to_core(&self) -> Option<(PlayerId, CoreCommand)> {
        let (player, command) = match self {
            Self::Spawn {
                player,
                species,
                tile,
            } => (
                player,
                CoreCommand::Spawn {
                    species: SpeciesId::from(species.as_str()),
                    tile: *tile,
                },
            ),
            Self::Move { player, from, to } => (
                player,
                CoreCommand::Move {
                    from: *from,
                    to: *to,
                },
            ),
            Self::Attack { player, from, to } => (
                player,
                CoreCommand::Attack {
                    from: *from,
                    to: *to,
                },
            ),
            Self::SpawnAndMove {
                player,
                species,
                tile,
                to,
            } => (
                player,
                CoreCommand::SpawnAndMove {
                    species: SpeciesId::from(species.as_str()),
                    tile: *tile,
                    to: *to,
                },
            ),
            _ => return None,
        };
        Some((PlayerId::from(player.as_str()), command))
    }
}
