//! Presentation events.
//!
//! Every command handling cycle clears the queue and refills it with what
//! just happened, in order, ending with a [`GameEvent::RequireInput`] prompt.
//! A presentation layer replays the queue to animate the command.

use serde::{Deserialize, Serialize};

use crate::combat::CombatResult;
use crate::grid::PlayerIndex;

/// Why the same player is being asked for input again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FailureCode {
    /// No path within the minion's movement.
    NoPath = 1,
    /// Another minion stands on the path.
    PathBlocked = 2,
    /// A friendly minion occupies the destination.
    FriendlyAtDestination = 3,
    /// The requested species is not on the bench.
    SpeciesNotOnBench = 4,
    /// The spawn tile is not a spawn owned by the player, or is occupied.
    SpawnTileUnavailable = 5,
    /// An attack found no enemy at the destination.
    NothingToAttack = 6,
}

impl FailureCode {
    /// Numeric code carried by [`GameEvent::RequireInput`].
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// One thing that happened during a command.
///
/// Fields are primitives only so the queue can cross any host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    /// The given player must act next. `error` is 0 for a fresh prompt,
    /// otherwise a [`FailureCode`].
    RequireInput {
        /// Seat to prompt.
        player: u8,
        /// Failure code of the previous attempt, 0 if none.
        error: u8,
    },
    /// A minion took one step.
    MinionMoved {
        /// Uid of the minion.
        minion: u32,
        /// Tile stepped from.
        from: usize,
        /// Tile stepped onto.
        to: usize,
    },
    /// A minion entered the board.
    MinionSpawned {
        /// Uid of the new minion.
        minion: u32,
        /// Tile it appeared on.
        tile: usize,
    },
    /// Two minions fought.
    CombatResolved {
        /// Uid of the initiating minion.
        attacker: u32,
        /// Uid of the defending minion.
        defender: u32,
        /// Result from the attacker's point of view.
        result: CombatResult,
    },
    /// A minion died and left the board.
    MinionDied {
        /// Uid of the dead minion.
        minion: u32,
        /// Tile it died on.
        tile: usize,
    },
    /// A graveyard overflow sent the oldest casualty back to the bench.
    MinionRevived {
        /// Seat whose bench received it.
        player: u8,
    },
    /// A graveyard overflow could not fit the oldest casualty on the bench.
    MinionLost {
        /// Seat that lost it.
        player: u8,
    },
    /// A new turn began.
    TurnStarted {
        /// Seat now acting.
        player: u8,
        /// Turn counter after the transition.
        turn: u32,
    },
}

impl GameEvent {
    /// Fresh input prompt.
    #[must_use]
    pub const fn require_input(player: PlayerIndex) -> Self {
        Self::RequireInput {
            player: player.0,
            error: 0,
        }
    }

    /// Re-prompt after a soft failure.
    #[must_use]
    pub const fn retry_input(player: PlayerIndex, failure: FailureCode) -> Self {
        Self::RequireInput {
            player: player.0,
            error: failure.code(),
        }
    }
}

/// Ordered list of events from the current command cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drop every queued event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Queued events in emission order.
    #[must_use]
    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recent event.
    #[must_use]
    pub fn last(&self) -> Option<&GameEvent> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_input_codes() {
        assert_eq!(
            GameEvent::require_input(PlayerIndex::SECOND),
            GameEvent::RequireInput { player: 1, error: 0 }
        );
        assert_eq!(
            GameEvent::retry_input(PlayerIndex::FIRST, FailureCode::PathBlocked),
            GameEvent::RequireInput { player: 0, error: 2 }
        );
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = GameEvent::MinionMoved {
            minion: 3,
            from: 0,
            to: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"MINION_MOVED","minion":3,"from":0,"to":5}"#);
    }

    #[test]
    fn test_queue_drain_empties() {
        let mut queue = EventQueue::new();
        queue.push(GameEvent::require_input(PlayerIndex::FIRST));
        assert_eq!(queue.len(), 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }
}
