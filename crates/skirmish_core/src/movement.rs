//! Attack-move: walk a minion toward a tile and fight whatever enemy holds it.

use crate::combat::CombatResult;
use crate::error::{GameError, Result};
use crate::events::{FailureCode, GameEvent};
use crate::registry::Uid;
use crate::state::MatchState;

/// How an attack-move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The minion was already on the target tile.
    Stayed,
    /// The minion walked all the way to the target.
    Moved,
    /// The minion stopped one tile short and fought the occupant.
    Fought(CombatResult),
    /// Nothing changed; the player should be asked again.
    Failed(FailureCode),
}

impl MoveOutcome {
    /// The soft failure, if any.
    #[must_use]
    pub const fn failure(self) -> Option<FailureCode> {
        match self {
            Self::Failed(code) => Some(code),
            _ => None,
        }
    }
}

impl MatchState {
    /// Move `uid` toward `target`, attacking an enemy standing there.
    ///
    /// The route is the canonical path within the minion's remaining
    /// movement. Any occupied tile before the destination blocks the move,
    /// as does a friendly minion on the destination. Soft failures leave
    /// the state untouched.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound` for an unknown uid and `InvariantViolation`
    /// if the minion is not on the grid.
    pub fn try_attack_move(&mut self, uid: Uid, target: usize) -> Result<MoveOutcome> {
        let minion = self
            .battlefield
            .minion(uid)
            .ok_or(GameError::MinionNotFound(uid))?;
        let owner = minion.owner;
        let from = minion.position.ok_or_else(|| {
            GameError::InvariantViolation(format!("minion {uid} is not on the grid"))
        })?;
        if from == target {
            return Ok(MoveOutcome::Stayed);
        }

        let mut path = self.battlefield.path(from, target, minion.movement);
        let Some((&destination, steps)) = path.split_last() else {
            return Ok(MoveOutcome::Failed(FailureCode::NoPath));
        };
        let blocked = steps.iter().any(|&tile| {
            self.battlefield
                .tile(tile)
                .is_some_and(|t| t.is_occupied())
        });
        if blocked {
            return Ok(MoveOutcome::Failed(FailureCode::PathBlocked));
        }

        match self.battlefield.occupant(destination).map(|m| (m.uid, m.owner)) {
            Some((_, occupant_owner)) if occupant_owner == owner => {
                Ok(MoveOutcome::Failed(FailureCode::FriendlyAtDestination))
            }
            Some((enemy, _)) => {
                path.pop();
                self.move_along_path(uid, &path)?;
                let result = self.resolve_combat(uid, enemy)?;
                Ok(MoveOutcome::Fought(result))
            }
            None => {
                self.move_along_path(uid, &path)?;
                Ok(MoveOutcome::Moved)
            }
        }
    }

    /// Step a minion through `path` one tile at a time, spending a movement
    /// point and queueing a `MinionMoved` per step.
    ///
    /// # Errors
    ///
    /// Propagates step failures; the path must already be known clear.
    pub fn move_along_path(&mut self, uid: Uid, path: &[usize]) -> Result<()> {
        for &to in path {
            let from = self.battlefield.step(uid, to)?;
            if let Some(minion) = self.battlefield.minion_mut(uid) {
                minion.movement = minion.movement.saturating_sub(1);
            }
            self.events.push(GameEvent::MinionMoved {
                minion: uid.0,
                from,
                to,
            });
        }
        if !path.is_empty() {
            tracing::debug!(uid = uid.0, steps = path.len(), "Minion moved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MatchRules, SpeciesId};
    use crate::economy::PlayerId;
    use crate::grid::PlayerIndex;

    fn state() -> MatchState {
        MatchState::new(
            MatchRules::default(),
            &[PlayerId::from("alice"), PlayerId::from("bob")],
        )
        .unwrap()
    }

    fn deploy(state: &mut MatchState, owner: PlayerIndex, species: &str, tile: usize) -> Uid {
        state
            .deploy(owner, &SpeciesId::from(species), tile, false)
            .unwrap()
    }

    #[test]
    fn test_move_to_empty_tile() {
        let mut state = state();
        let uid = deploy(&mut state, PlayerIndex::FIRST, "speed", 0);
        state.events.clear();

        assert_eq!(state.try_attack_move(uid, 11).unwrap(), MoveOutcome::Moved);

        let minion = state.battlefield.minion(uid).unwrap();
        assert_eq!(minion.position, Some(11));
        assert_eq!(minion.movement, 0);
        assert_eq!(
            state.events.as_slice(),
            &[
                GameEvent::MinionMoved { minion: uid.0, from: 0, to: 5 },
                GameEvent::MinionMoved { minion: uid.0, from: 5, to: 10 },
                GameEvent::MinionMoved { minion: uid.0, from: 10, to: 11 },
            ]
        );
    }

    #[test]
    fn test_same_tile_is_trivial() {
        let mut state = state();
        let uid = deploy(&mut state, PlayerIndex::FIRST, "speed", 0);
        assert_eq!(state.try_attack_move(uid, 0).unwrap(), MoveOutcome::Stayed);
    }

    #[test]
    fn test_out_of_range_is_no_path() {
        let mut state = state();
        let uid = deploy(&mut state, PlayerIndex::FIRST, "power", 0);
        assert_eq!(
            state.try_attack_move(uid, 2).unwrap(),
            MoveOutcome::Failed(FailureCode::NoPath)
        );
        assert_eq!(state.battlefield.minion(uid).unwrap().position, Some(0));
    }

    #[test]
    fn test_occupied_intermediate_blocks() {
        let mut state = state();
        let mover = deploy(&mut state, PlayerIndex::FIRST, "speed", 0);
        deploy(&mut state, PlayerIndex::SECOND, "power", 5);
        let before = state.state_hash();

        assert_eq!(
            state.try_attack_move(mover, 10).unwrap(),
            MoveOutcome::Failed(FailureCode::PathBlocked)
        );
        assert_eq!(state.state_hash(), before);
    }

    #[test]
    fn test_friendly_destination_fails() {
        let mut state = state();
        let mover = deploy(&mut state, PlayerIndex::FIRST, "speed", 0);
        deploy(&mut state, PlayerIndex::FIRST, "power", 10);
        assert_eq!(
            state.try_attack_move(mover, 10).unwrap(),
            MoveOutcome::Failed(FailureCode::FriendlyAtDestination)
        );
    }

    #[test]
    fn test_enemy_destination_stops_short_and_fights() {
        let mut state = state();
        let mover = deploy(&mut state, PlayerIndex::FIRST, "technical", 0);
        let enemy = deploy(&mut state, PlayerIndex::SECOND, "speed", 10);

        let outcome = state.try_attack_move(mover, 10).unwrap();

        assert_eq!(outcome, MoveOutcome::Fought(CombatResult::Win));
        assert_eq!(state.battlefield.minion(mover).unwrap().position, Some(5));
        assert!(state.battlefield.minion(enemy).is_none());
        assert!(!state.battlefield.tile(10).unwrap().is_occupied());
    }

    #[test]
    fn test_adjacent_attack_does_not_move() {
        let mut state = state();
        let mover = deploy(&mut state, PlayerIndex::FIRST, "power", 6);
        deploy(&mut state, PlayerIndex::SECOND, "power", 7);
        state.events.clear();

        let outcome = state.try_attack_move(mover, 7).unwrap();

        assert_eq!(outcome, MoveOutcome::Fought(CombatResult::Draw));
        assert!(!state
            .events
            .as_slice()
            .iter()
            .any(|e| matches!(e, GameEvent::MinionMoved { .. })));
    }

    #[test]
    fn test_unpathable_route_is_no_path() {
        let mut state = state();
        let mover = deploy(&mut state, PlayerIndex::FIRST, "speed", 11);
        assert_eq!(
            state.try_attack_move(mover, 13).unwrap(),
            MoveOutcome::Failed(FailureCode::NoPath)
        );
    }
}
