//! Match session: the single entry point a host drives.
//!
//! A session owns one [`MatchState`], validates and executes commands
//! atomically, runs the turn clock and records everything it is asked to do
//! so the match can be replayed.

use serde::{Deserialize, Serialize};

use crate::data::{MatchRules, SpeciesId};
use crate::economy::{PlayerId, PlayerState};
use crate::error::{GameError, Result};
use crate::events::{FailureCode, GameEvent};
use crate::grid::{PlayerIndex, Tile};
use crate::registry::{Minion, Uid};
use crate::replay::ReplayEntry;
use crate::state::MatchState;
use crate::turn::GameplayPhase;
use crate::validation::RejectReason;

/// A player's request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Deploy a benched species onto an owned spawn tile.
    Spawn {
        /// Species to deploy.
        species: SpeciesId,
        /// Spawn tile.
        tile: usize,
    },
    /// Walk the minion on `from` to `to`, fighting an enemy found there.
    Move {
        /// Tile of the minion to move.
        from: usize,
        /// Destination tile.
        to: usize,
    },
    /// Like `Move`, but only valid when an enemy stands on `to`.
    Attack {
        /// Tile of the attacking minion.
        from: usize,
        /// Tile of the enemy.
        to: usize,
    },
    /// Spawn, then immediately attack-move the new minion. Either both
    /// happen or neither does.
    SpawnAndMove {
        /// Species to deploy.
        species: SpeciesId,
        /// Spawn tile.
        tile: usize,
        /// Destination of the follow-up move.
        to: usize,
    },
}

impl Command {
    /// Every tile index the command refers to.
    #[must_use]
    pub fn tiles(&self) -> Vec<usize> {
        match self {
            Self::Spawn { tile, .. } => vec![*tile],
            Self::Move { from, to } | Self::Attack { from, to } => vec![*from, *to],
            Self::SpawnAndMove { tile, to, .. } => vec![*tile, *to],
        }
    }
}

/// What became of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Refused by validation. Nothing changed, not even the event queue.
    Rejected {
        /// First failed check.
        reason: RejectReason,
    },
    /// Passed validation and ran. On success the turn passed; otherwise the
    /// state is unchanged and the same player is prompted again.
    Executed {
        /// Whether the command took effect.
        success: bool,
    },
}

impl CommandOutcome {
    /// Returns true if the command took effect.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Executed { success: true })
    }
}

/// Read-only view of a match for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Whether commands are accepted.
    pub phase: GameplayPhase,
    /// Seat whose turn it is.
    pub current_player: PlayerIndex,
    /// Completed turn transitions.
    pub turns_taken: u32,
    /// Seconds left in the turn.
    pub timer: u32,
    /// Tiles in index order.
    pub tiles: Vec<Tile>,
    /// Live minions in uid order.
    pub minions: Vec<Minion>,
    /// Participants in seat order.
    pub players: Vec<PlayerState>,
    /// Events of the last command cycle.
    pub events: Vec<GameEvent>,
}

/// A running match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSession {
    participants: Vec<PlayerId>,
    state: MatchState,
    history: Vec<ReplayEntry>,
}

impl MatchSession {
    /// Start a match. One or two participants; a lone participant gets a
    /// placeholder opponent.
    ///
    /// # Errors
    ///
    /// See [`MatchState::new`].
    pub fn new(rules: MatchRules, participants: &[PlayerId]) -> Result<Self> {
        let state = MatchState::new(rules, participants)?;
        tracing::info!(players = participants.len(), "Match started");
        Ok(Self {
            participants: participants.to_vec(),
            state,
            history: Vec::new(),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    /// Rules in force.
    #[must_use]
    pub const fn rules(&self) -> &MatchRules {
        &self.state.rules
    }

    /// Participants as originally supplied.
    #[must_use]
    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    /// Everything applied so far, in order.
    #[must_use]
    pub fn history(&self) -> &[ReplayEntry] {
        &self.history
    }

    /// Events of the last command cycle.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.state.events.as_slice()
    }

    /// Take the events of the last command cycle.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain()
    }

    /// Validate and execute a command from `actor`.
    ///
    /// Rejected commands leave the state and event queue untouched. Accepted
    /// commands clear the queue first. A successful command ends the turn; a
    /// soft failure leaves the state as it was and re-prompts `actor` with
    /// the failure code.
    ///
    /// # Errors
    ///
    /// Only internal defects surface as errors. The state is restored to
    /// what it was before the command.
    pub fn handle_command(&mut self, actor: &PlayerId, command: Command) -> Result<CommandOutcome> {
        self.history.push(ReplayEntry::Command {
            actor: actor.clone(),
            command: command.clone(),
        });

        let seat = match self.state.validate(actor, &command) {
            Ok(seat) => seat,
            Err(reason) => {
                tracing::warn!(player = %actor, ?command, %reason, "Command rejected");
                return Ok(CommandOutcome::Rejected { reason });
            }
        };

        let before = self.state.clone();
        self.state.events.clear();
        let outcome = match self.state.execute(seat, &command) {
            Ok(None) => {
                self.state.advance_turn();
                CommandOutcome::Executed { success: true }
            }
            Ok(Some(failure)) => {
                tracing::debug!(player = %actor, ?command, ?failure, "Command failed");
                // Partial work (a spawn before a failed move) is discarded
                // whole, including the uid it allocated.
                self.state = before.clone();
                self.state.events.clear();
                self.state.events.push(GameEvent::retry_input(seat, failure));
                CommandOutcome::Executed { success: false }
            }
            Err(err) => {
                tracing::error!(player = %actor, ?command, error = %err, "Command aborted");
                self.state = before;
                return Err(err);
            }
        };

        if let Err(err) = self.verify() {
            tracing::error!(player = %actor, ?command, error = %err, "State corrupted by command");
            self.state = before;
            return Err(err);
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state.state_hash();
            tracing::debug!(player = %actor, ?outcome, state_hash = hash, "Command handled");
        }
        Ok(outcome)
    }

    /// Advance the turn clock. Returns true if the turn changed.
    pub fn tick(&mut self, elapsed: u32) -> bool {
        self.history.push(ReplayEntry::Tick { elapsed });
        self.state.tick(elapsed)
    }

    /// Place a token for `owner`. Tokens vanish on death instead of being
    /// buried.
    ///
    /// # Errors
    ///
    /// See [`MatchState::deploy`].
    pub fn deploy_token(
        &mut self,
        owner: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
    ) -> Result<Uid> {
        self.deploy(owner, species, tile, true)
    }

    /// Place a regular minion for `owner` without touching bench or
    /// resources.
    ///
    /// # Errors
    ///
    /// See [`MatchState::deploy`].
    pub fn deploy_unit(
        &mut self,
        owner: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
    ) -> Result<Uid> {
        self.deploy(owner, species, tile, false)
    }

    fn deploy(
        &mut self,
        owner: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
        is_token: bool,
    ) -> Result<Uid> {
        let uid = self.state.deploy(owner, species, tile, is_token)?;
        self.history.push(ReplayEntry::Deploy {
            owner,
            species: species.clone(),
            tile,
            is_token,
        });
        Ok(uid)
    }

    /// Re-apply one recorded entry.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying operation.
    pub fn apply(&mut self, entry: &ReplayEntry) -> Result<()> {
        match entry {
            ReplayEntry::Command { actor, command } => {
                self.handle_command(actor, command.clone())?;
            }
            ReplayEntry::Tick { elapsed } => {
                self.tick(*elapsed);
            }
            ReplayEntry::Deploy {
                owner,
                species,
                tile,
                is_token,
            } => {
                self.deploy(*owner, species, *tile, *is_token)?;
            }
        }
        Ok(())
    }

    /// Host notification that a participant connected.
    pub fn on_player_joined(&self, id: &PlayerId) {
        match self.state.index_of(id) {
            Some(seat) => tracing::info!(player = %id, seat = %seat, "Player joined"),
            None => tracing::warn!(player = %id, "Unseated player joined"),
        }
    }

    /// Host notification that a participant disconnected. The match keeps
    /// running; their turns expire on the clock.
    pub fn on_player_left(&self, id: &PlayerId) {
        tracing::info!(player = %id, "Player left");
    }

    /// Tiles the minion on `tile` could move to right now.
    #[must_use]
    pub fn reach_from(&self, tile: usize) -> Vec<usize> {
        self.state
            .battlefield
            .occupant(tile)
            .map(|m| self.state.battlefield.reach_of(m.uid))
            .unwrap_or_default()
    }

    /// Presentation view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.state.phase,
            current_player: self.state.current_player,
            turns_taken: self.state.turns_taken,
            timer: self.state.timer,
            tiles: self.state.battlefield.tiles().to_vec(),
            minions: self.state.battlefield.minions().iter().cloned().collect(),
            players: self.state.players.clone(),
            events: self.state.events.as_slice().to_vec(),
        }
    }

    /// Deterministic hash of the match state, excluding events.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }

    /// Serialize the session to bytes. The event queue is not persisted.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Restore a session from [`serialize`](Self::serialize) output.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if decoding fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| GameError::Serialization(e.to_string()))
    }

    fn verify(&self) -> Result<()> {
        #[cfg(any(debug_assertions, feature = "debug-validation"))]
        self.state.check_invariants()?;
        Ok(())
    }
}

impl MatchState {
    /// Run a validated command. `Ok(Some(code))` is a soft failure; the
    /// caller discards whatever was mutated before it.
    fn execute(&mut self, seat: PlayerIndex, command: &Command) -> Result<Option<FailureCode>> {
        match command {
            Command::Spawn { species, tile } => {
                if let Some(failure) = self.spawn_blocker(seat, species, *tile) {
                    return Ok(Some(failure));
                }
                self.spawn_from_bench(seat, species, *tile)?;
                Ok(None)
            }
            Command::Move { from, to } => {
                let uid = self.minion_on(*from)?;
                Ok(self.try_attack_move(uid, *to)?.failure())
            }
            Command::Attack { from, to } => {
                let uid = self.minion_on(*from)?;
                let enemy_there = self
                    .battlefield
                    .occupant(*to)
                    .is_some_and(|m| m.owner != seat);
                if !enemy_there {
                    return Ok(Some(FailureCode::NothingToAttack));
                }
                Ok(self.try_attack_move(uid, *to)?.failure())
            }
            Command::SpawnAndMove { species, tile, to } => {
                if let Some(failure) = self.spawn_blocker(seat, species, *tile) {
                    return Ok(Some(failure));
                }
                let uid = self.spawn_from_bench(seat, species, *tile)?;
                Ok(self.try_attack_move(uid, *to)?.failure())
            }
        }
    }

    fn minion_on(&self, tile: usize) -> Result<Uid> {
        self.battlefield
            .occupant(tile)
            .map(|m| m.uid)
            .ok_or_else(|| GameError::InvariantViolation(format!("no minion on tile {tile}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MatchSession {
        MatchSession::new(
            MatchRules::default(),
            &[PlayerId::from("alice"), PlayerId::from("bob")],
        )
        .unwrap()
    }

    fn alice() -> PlayerId {
        PlayerId::from("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::from("bob")
    }

    fn spawn(species: &str, tile: usize) -> Command {
        Command::Spawn {
            species: SpeciesId::from(species),
            tile,
        }
    }

    #[test]
    fn test_successful_spawn_ends_turn() {
        let mut session = session();
        let outcome = session.handle_command(&alice(), spawn("power", 0)).unwrap();

        assert!(outcome.is_success());
        assert_eq!(session.state().current_player, PlayerIndex::SECOND);
        assert_eq!(
            session.events(),
            &[
                GameEvent::MinionSpawned { minion: 1, tile: 0 },
                GameEvent::TurnStarted { player: 1, turn: 1 },
                GameEvent::require_input(PlayerIndex::SECOND),
            ]
        );
    }

    #[test]
    fn test_rejection_keeps_events_and_state() {
        let mut session = session();
        let events = session.events().to_vec();
        let hash = session.state_hash();

        let outcome = session.handle_command(&bob(), spawn("power", 24)).unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Rejected {
                reason: RejectReason::NotYourTurn
            }
        );
        assert_eq!(session.events(), events.as_slice());
        assert_eq!(session.state_hash(), hash);
    }

    #[test]
    fn test_soft_failure_reprompts_same_player() {
        let mut session = session();
        let hash = session.state_hash();

        let outcome = session.handle_command(&alice(), spawn("power", 4)).unwrap();

        assert_eq!(outcome, CommandOutcome::Executed { success: false });
        assert_eq!(session.state_hash(), hash);
        assert_eq!(
            session.events(),
            &[GameEvent::retry_input(
                PlayerIndex::FIRST,
                FailureCode::SpawnTileUnavailable
            )]
        );
    }

    #[test]
    fn test_spawn_and_move_rolls_back_on_failed_move() {
        let mut session = session();
        let bench = session.state().players[0].bench.clone();
        let hash = session.state_hash();
        let next_uid = session.state().battlefield.minions().peek_next_uid();

        // Power spawns with no movement left, so any move fails.
        let outcome = session
            .handle_command(
                &alice(),
                Command::SpawnAndMove {
                    species: SpeciesId::from("power"),
                    tile: 0,
                    to: 1,
                },
            )
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Executed { success: false });
        let state = session.state();
        assert!(state.battlefield.minions().is_empty());
        assert!(!state.battlefield.tile(0).unwrap().is_occupied());
        assert_eq!(state.players[0].bench, bench);
        assert_eq!(state.players[0].resources, 1);
        assert_eq!(state.current_player, PlayerIndex::FIRST);
        assert_eq!(state.battlefield.minions().peek_next_uid(), next_uid);
        assert_eq!(session.state_hash(), hash);
        assert_eq!(
            session.events(),
            &[GameEvent::retry_input(PlayerIndex::FIRST, FailureCode::NoPath)]
        );
    }

    #[test]
    fn test_failed_spawn_and_move_leaves_no_uid_gap() {
        let mut session = session();
        assert!(session
            .handle_command(&alice(), spawn("speed", 0))
            .unwrap()
            .is_success());

        let failed = session
            .handle_command(
                &bob(),
                Command::SpawnAndMove {
                    species: SpeciesId::from("power"),
                    tile: 24,
                    to: 23,
                },
            )
            .unwrap();
        assert_eq!(failed, CommandOutcome::Executed { success: false });

        assert!(session
            .handle_command(&bob(), spawn("power", 24))
            .unwrap()
            .is_success());
        assert_eq!(session.state().battlefield.minions().uids(), vec![Uid(1), Uid(2)]);
    }

    #[test]
    fn test_spawn_and_move_success() {
        let mut session = session();
        let outcome = session
            .handle_command(
                &alice(),
                Command::SpawnAndMove {
                    species: SpeciesId::from("speed"),
                    tile: 0,
                    to: 6,
                },
            )
            .unwrap();

        assert!(outcome.is_success());
        let minion = session.state().battlefield.occupant(6).unwrap();
        assert_eq!(minion.owner, PlayerIndex::FIRST);
        // Movement is refreshed by the turn change.
        assert_eq!(minion.movement, 3);
    }

    #[test]
    fn test_attack_without_enemy_is_soft_failure() {
        let mut session = session();
        session
            .deploy_unit(PlayerIndex::FIRST, &SpeciesId::from("power"), 6)
            .unwrap();
        let outcome = session
            .handle_command(&alice(), Command::Attack { from: 6, to: 7 })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Executed { success: false });
        assert_eq!(
            session.events(),
            &[GameEvent::retry_input(
                PlayerIndex::FIRST,
                FailureCode::NothingToAttack
            )]
        );
    }

    #[test]
    fn test_history_records_everything() {
        let mut session = session();
        session.handle_command(&bob(), spawn("power", 24)).unwrap();
        session.tick(5);
        session
            .deploy_token(PlayerIndex::SECOND, &SpeciesId::from("speed"), 7)
            .unwrap();
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_serialize_roundtrip_preserves_hash() {
        let mut session = session();
        session.handle_command(&alice(), spawn("technical", 0)).unwrap();
        let bytes = session.serialize().unwrap();
        let restored = MatchSession::deserialize(&bytes).unwrap();
        assert_eq!(restored.state_hash(), session.state_hash());
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_snapshot_json_has_tagged_events() {
        let session = session();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["events"][0]["type"], "REQUIRE_INPUT");
        assert_eq!(json["phase"], "AWAITING_INPUT");
        assert_eq!(json["tiles"].as_array().unwrap().len(), 25);
    }

    #[test]
    fn test_reach_from_occupied_tile() {
        let mut session = session();
        session
            .deploy_unit(PlayerIndex::FIRST, &SpeciesId::from("power"), 0)
            .unwrap();
        assert_eq!(session.reach_from(0), vec![1, 5]);
        assert!(session.reach_from(3).is_empty());
    }
}
