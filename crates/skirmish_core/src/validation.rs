//! Structural validation of player commands.
//!
//! Checks run in a fixed order: phase, actor identity, tile indices,
//! species, ownership, resources. The first failing check decides the
//! reason. Nothing here mutates state, and a rejected command leaves the
//! event queue alone.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::economy::PlayerId;
use crate::grid::{PlayerIndex, TILE_COUNT};
use crate::session::Command;
use crate::state::MatchState;
use crate::turn::GameplayPhase;

/// Why a command was refused before it could touch the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The match is between turns.
    #[error("commands are not accepted in this phase")]
    WrongPhase,
    /// The actor is seated but it is not their turn.
    #[error("it is not this player's turn")]
    NotYourTurn,
    /// The actor is not seated in this match.
    #[error("player is not part of this match")]
    UnknownPlayer,
    /// A tile index is off the board.
    #[error("tile index out of range")]
    TileOutOfRange,
    /// A tile is unpathable.
    #[error("tile is unpathable")]
    TileUnpathable,
    /// The species is not in the player's deck. Checked after the tile
    /// checks and before spawn tile ownership.
    #[error("species is not in the deck")]
    UnknownSpecies,
    /// No minion stands on the source tile.
    #[error("no minion on the source tile")]
    NoMinionAtSource,
    /// The minion on the source tile belongs to someone else.
    #[error("minion belongs to another player")]
    NotYourMinion,
    /// The spawn tile is owned by another player.
    #[error("tile is owned by an opponent")]
    TileOwnedByOpponent,
    /// The player cannot pay for the spawn.
    #[error("insufficient resources")]
    InsufficientResources,
}

impl MatchState {
    /// Check that `actor` may issue `command` right now.
    ///
    /// Returns the actor's seat on success.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`RejectReason`].
    pub fn validate(
        &self,
        actor: &PlayerId,
        command: &Command,
    ) -> std::result::Result<PlayerIndex, RejectReason> {
        if self.phase != GameplayPhase::AwaitingInput {
            return Err(RejectReason::WrongPhase);
        }

        let seat = self.index_of(actor).ok_or(RejectReason::UnknownPlayer)?;
        if seat != self.current_player {
            return Err(RejectReason::NotYourTurn);
        }

        for tile in command.tiles() {
            if tile >= TILE_COUNT {
                return Err(RejectReason::TileOutOfRange);
            }
            let pathable = self
                .battlefield
                .tile(tile)
                .is_some_and(|t| t.kind.is_pathable());
            if !pathable {
                return Err(RejectReason::TileUnpathable);
            }
        }

        let player = self.player(seat).ok_or(RejectReason::UnknownPlayer)?;
        match command {
            Command::Move { from, .. } | Command::Attack { from, .. } => {
                let minion = self
                    .battlefield
                    .occupant(*from)
                    .ok_or(RejectReason::NoMinionAtSource)?;
                if minion.owner != seat {
                    return Err(RejectReason::NotYourMinion);
                }
            }
            Command::Spawn { species, tile } | Command::SpawnAndMove { species, tile, .. } => {
                if !player.deck.contains(species) {
                    return Err(RejectReason::UnknownSpecies);
                }
                let owner = self.battlefield.tile(*tile).and_then(|t| t.owner);
                if owner.is_some_and(|o| o != seat) {
                    return Err(RejectReason::TileOwnedByOpponent);
                }
                let cost = self
                    .rules
                    .species(species)
                    .map(|s| s.cost)
                    .ok_or(RejectReason::UnknownSpecies)?;
                if !player.can_afford(cost) {
                    return Err(RejectReason::InsufficientResources);
                }
            }
        }

        Ok(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MatchRules, SpeciesId};

    fn state() -> MatchState {
        MatchState::new(
            MatchRules::default(),
            &[PlayerId::from("alice"), PlayerId::from("bob")],
        )
        .unwrap()
    }

    fn alice() -> PlayerId {
        PlayerId::from("alice")
    }

    fn spawn(species: &str, tile: usize) -> Command {
        Command::Spawn {
            species: SpeciesId::from(species),
            tile,
        }
    }

    #[test]
    fn test_valid_spawn_returns_seat() {
        let state = state();
        assert_eq!(state.validate(&alice(), &spawn("power", 0)), Ok(PlayerIndex::FIRST));
    }

    #[test]
    fn test_phase_checked_first() {
        let mut state = state();
        state.phase = GameplayPhase::TurnTransition;
        let stranger = PlayerId::from("mallory");
        assert_eq!(
            state.validate(&stranger, &spawn("power", 99)),
            Err(RejectReason::WrongPhase)
        );
    }

    #[test]
    fn test_identity_checks() {
        let state = state();
        assert_eq!(
            state.validate(&PlayerId::from("mallory"), &spawn("power", 0)),
            Err(RejectReason::UnknownPlayer)
        );
        assert_eq!(
            state.validate(&PlayerId::from("bob"), &spawn("power", 24)),
            Err(RejectReason::NotYourTurn)
        );
    }

    #[test]
    fn test_tile_checks() {
        let state = state();
        assert_eq!(
            state.validate(&alice(), &spawn("power", 25)),
            Err(RejectReason::TileOutOfRange)
        );
        assert_eq!(
            state.validate(&alice(), &Command::Move { from: 11, to: 12 }),
            Err(RejectReason::TileUnpathable)
        );
    }

    #[test]
    fn test_ownership_checks() {
        let mut state = state();
        assert_eq!(
            state.validate(&alice(), &Command::Move { from: 6, to: 7 }),
            Err(RejectReason::NoMinionAtSource)
        );
        state
            .deploy(PlayerIndex::SECOND, &SpeciesId::from("power"), 6, false)
            .unwrap();
        assert_eq!(
            state.validate(&alice(), &Command::Attack { from: 6, to: 7 }),
            Err(RejectReason::NotYourMinion)
        );
        assert_eq!(
            state.validate(&alice(), &spawn("power", 24)),
            Err(RejectReason::TileOwnedByOpponent)
        );
    }

    #[test]
    fn test_unclaimed_spawn_passes_validation() {
        let state = state();
        assert!(state.validate(&alice(), &spawn("power", 4)).is_ok());
    }

    #[test]
    fn test_unknown_species() {
        let state = state();
        assert_eq!(
            state.validate(&alice(), &spawn("dragon", 0)),
            Err(RejectReason::UnknownSpecies)
        );
    }

    #[test]
    fn test_species_checked_between_tiles_and_ownership() {
        let mut state = state();
        state.players[0].resources = 0;
        assert_eq!(
            state.validate(&alice(), &spawn("dragon", 25)),
            Err(RejectReason::TileOutOfRange)
        );
        assert_eq!(
            state.validate(&alice(), &spawn("dragon", 24)),
            Err(RejectReason::UnknownSpecies)
        );
    }

    #[test]
    fn test_insufficient_resources() {
        let mut state = state();
        state.players[0].resources = 0;
        assert_eq!(
            state.validate(&alice(), &spawn("power", 0)),
            Err(RejectReason::InsufficientResources)
        );
    }
}
