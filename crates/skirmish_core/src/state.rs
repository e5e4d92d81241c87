//! The complete mutable state of one match.
//!
//! Gameplay operations live in their own modules as `impl MatchState`
//! blocks: spawning and deaths in [`economy`](crate::economy), walking in
//! [`movement`](crate::movement), fights in [`combat`](crate::combat),
//! command checks in [`validation`](crate::validation) and turn flow in
//! [`turn`](crate::turn).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::battlefield::BattlefieldState;
use crate::data::MatchRules;
use crate::economy::{PlayerId, PlayerState};
use crate::error::{GameError, Result};
use crate::events::{EventQueue, GameEvent};
use crate::grid::PlayerIndex;
use crate::turn::GameplayPhase;

/// Identity given to the synthesized opponent when only one participant
/// joins.
pub const PLACEHOLDER_PLAYER: &str = "placeholder-opponent";

/// Board, players, turn bookkeeping and the current event queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Rules the match was created with.
    pub rules: MatchRules,
    /// Whether commands are currently accepted.
    pub phase: GameplayPhase,
    /// Seat whose turn it is.
    pub current_player: PlayerIndex,
    /// Completed turn transitions.
    pub turns_taken: u32,
    /// Seconds left in the current turn.
    pub timer: u32,
    /// Tiles and minions.
    pub battlefield: BattlefieldState,
    /// Participants in seat order.
    pub players: Vec<PlayerState>,
    /// Events of the last command cycle. Presentation only: not persisted
    /// and not part of the state hash.
    #[serde(skip)]
    pub events: EventQueue,
}

impl MatchState {
    /// Seat the participants and open the first turn.
    ///
    /// A lone participant gets a [`PLACEHOLDER_PLAYER`] opponent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRules` if the rules fail validation,
    /// `InvalidParticipantCount` for zero or more than two participants and
    /// `DuplicatePlayer` if an identity repeats.
    pub fn new(rules: MatchRules, participants: &[PlayerId]) -> Result<Self> {
        let errors = rules.validate();
        if !errors.is_empty() {
            return Err(GameError::InvalidRules(errors));
        }
        if participants.is_empty() || participants.len() > 2 {
            return Err(GameError::InvalidParticipantCount(participants.len()));
        }

        let mut ids = participants.to_vec();
        if ids.len() == 1 {
            tracing::info!(player = %ids[0], "Single participant, synthesizing opponent");
            ids.push(PlayerId::new(PLACEHOLDER_PLAYER));
        }
        if ids[0] == ids[1] {
            return Err(GameError::DuplicatePlayer(ids[0].to_string()));
        }

        let players = ids
            .into_iter()
            .zip(0u8..)
            .map(|(id, seat)| PlayerState::new(id, PlayerIndex(seat), &rules))
            .collect();

        let mut events = EventQueue::new();
        events.push(GameEvent::require_input(PlayerIndex::FIRST));

        Ok(Self {
            timer: rules.time_per_turn,
            rules,
            phase: GameplayPhase::AwaitingInput,
            current_player: PlayerIndex::FIRST,
            turns_taken: 0,
            battlefield: BattlefieldState::new(),
            players,
            events,
        })
    }

    /// Player in a seat.
    #[must_use]
    pub fn player(&self, index: PlayerIndex) -> Option<&PlayerState> {
        self.players.get(index.as_usize())
    }

    /// Player in a seat, mutably.
    pub fn player_mut(&mut self, index: PlayerIndex) -> Option<&mut PlayerState> {
        self.players.get_mut(index.as_usize())
    }

    /// Seat of a participant.
    #[must_use]
    pub fn index_of(&self, id: &PlayerId) -> Option<PlayerIndex> {
        self.players.iter().find(|p| &p.id == id).map(|p| p.index)
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current(&self) -> Option<&PlayerState> {
        self.player(self.current_player)
    }

    pub(crate) fn player_or_err(&mut self, index: PlayerIndex) -> Result<&mut PlayerState> {
        self.players
            .get_mut(index.as_usize())
            .ok_or_else(|| GameError::UnknownPlayer(index.to_string()))
    }

    /// Deterministic hash of everything except the event queue.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.rules.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.current_player.hash(&mut hasher);
        self.turns_taken.hash(&mut hasher);
        self.timer.hash(&mut hasher);
        self.battlefield.hash(&mut hasher);
        self.players.hash(&mut hasher);
        hasher.finish()
    }

    /// Check occupancy bookkeeping and per-player bounds.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first inconsistency.
    pub fn check_invariants(&self) -> Result<()> {
        self.battlefield.check_invariants()?;
        for player in &self.players {
            if player.bench.len() > player.bench.capacity() {
                return Err(GameError::InvariantViolation(format!(
                    "bench of {} exceeds capacity",
                    player.index
                )));
            }
            if player.graveyard.len() > player.graveyard.capacity() {
                return Err(GameError::InvariantViolation(format!(
                    "graveyard of {} exceeds capacity",
                    player.index
                )));
            }
        }
        for minion in self.battlefield.minions().iter() {
            if self.player(minion.owner).is_none() {
                return Err(GameError::InvariantViolation(format!(
                    "minion {} owned by unseated {}",
                    minion.uid, minion.owner
                )));
            }
        }
        if self.player(self.current_player).is_none() {
            return Err(GameError::InvariantViolation(format!(
                "current player {} is not seated",
                self.current_player
            )));
        }
        Ok(())
    }
}
