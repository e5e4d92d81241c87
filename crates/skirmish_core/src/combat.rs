//! One-on-one combat.
//!
//! Both sides strike at once using the power they had before the exchange:
//! - defender health drops by the attacker's power
//! - attacker health drops by the defender's power
//! - anyone at zero health or below dies
//! - survivors return to their pre-combat health, so damage never lingers

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::registry::{Minion, Uid};
use crate::state::MatchState;

/// Result of a fight from the attacker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatResult {
    /// Only the attacker died.
    Loss,
    /// Both or neither died.
    Draw,
    /// Only the defender died.
    Win,
}

/// Health after a simultaneous exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    /// Attacker health after taking the defender's blow.
    pub attacker_health: i32,
    /// Defender health after taking the attacker's blow.
    pub defender_health: i32,
}

impl Exchange {
    /// Trade blows between two minions without touching either.
    #[must_use]
    pub const fn between(attacker: &Minion, defender: &Minion) -> Self {
        Self {
            attacker_health: attacker.health.saturating_sub(defender.power),
            defender_health: defender.health.saturating_sub(attacker.power),
        }
    }

    /// Whether the attacker dies.
    #[must_use]
    pub const fn attacker_dies(&self) -> bool {
        self.attacker_health <= 0
    }

    /// Whether the defender dies.
    #[must_use]
    pub const fn defender_dies(&self) -> bool {
        self.defender_health <= 0
    }

    /// Classify the exchange.
    #[must_use]
    pub const fn result(&self) -> CombatResult {
        match (self.attacker_dies(), self.defender_dies()) {
            (false, true) => CombatResult::Win,
            (true, false) => CombatResult::Loss,
            _ => CombatResult::Draw,
        }
    }
}

impl MatchState {
    /// Fight between two minions on the board.
    ///
    /// Queues `CombatResolved`, then a `MinionDied` (plus any graveyard
    /// overflow event) for each casualty, defender first.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound` if either minion is not on the board.
    pub fn resolve_combat(&mut self, attacker: Uid, defender: Uid) -> Result<CombatResult> {
        let a = self
            .battlefield
            .minion(attacker)
            .ok_or(GameError::MinionNotFound(attacker))?;
        let d = self
            .battlefield
            .minion(defender)
            .ok_or(GameError::MinionNotFound(defender))?;
        let exchange = Exchange::between(a, d);
        let result = exchange.result();

        tracing::info!(
            attacker = attacker.0,
            defender = defender.0,
            ?result,
            "Combat resolved"
        );
        self.events.push(GameEvent::CombatResolved {
            attacker: attacker.0,
            defender: defender.0,
            result,
        });

        if exchange.defender_dies() {
            self.kill_minion(defender)?;
        }
        if exchange.attacker_dies() {
            self.kill_minion(attacker)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MatchRules, MinionData, SpeciesId};
    use crate::economy::PlayerId;
    use crate::grid::PlayerIndex;

    fn state_with(roster: Vec<MinionData>) -> MatchState {
        let rules = MatchRules {
            roster,
            starting_bench: Vec::new(),
            ..MatchRules::default()
        };
        MatchState::new(rules, &[PlayerId::from("a"), PlayerId::from("b")]).unwrap()
    }

    fn deploy(state: &mut MatchState, owner: PlayerIndex, species: &str, tile: usize) -> Uid {
        state
            .deploy(owner, &SpeciesId::from(species), tile, false)
            .unwrap()
    }

    #[test]
    fn test_simultaneous_exchange_both_die() {
        let mut state = state_with(vec![
            MinionData::new("striker", 2, 3, 1, 1),
            MinionData::new("brute", 4, 1, 1, 1),
        ]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "striker", 6);
        let d = deploy(&mut state, PlayerIndex::SECOND, "brute", 7);

        let result = state.resolve_combat(a, d).unwrap();

        assert_eq!(result, CombatResult::Draw);
        assert!(state.battlefield.minion(a).is_none());
        assert!(state.battlefield.minion(d).is_none());
        assert_eq!(state.players[0].graveyard.len(), 1);
        assert_eq!(state.players[1].graveyard.len(), 1);
        assert!(!state.battlefield.tile(6).unwrap().is_occupied());
        assert!(!state.battlefield.tile(7).unwrap().is_occupied());
    }

    #[test]
    fn test_win_restores_survivor_health() {
        let mut state = state_with(vec![
            MinionData::new("technical", 2, 3, 2, 1),
            MinionData::new("speed", 1, 2, 3, 1),
        ]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "technical", 6);
        let d = deploy(&mut state, PlayerIndex::SECOND, "speed", 7);

        assert_eq!(state.resolve_combat(a, d).unwrap(), CombatResult::Win);
        assert_eq!(state.battlefield.minion(a).unwrap().health, 3);
        assert!(state.battlefield.minion(d).is_none());
    }

    #[test]
    fn test_loss_when_only_attacker_dies() {
        let mut state = state_with(vec![
            MinionData::new("speed", 1, 2, 3, 1),
            MinionData::new("power", 3, 2, 1, 1),
        ]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "speed", 6);
        let d = deploy(&mut state, PlayerIndex::SECOND, "power", 7);

        assert_eq!(state.resolve_combat(a, d).unwrap(), CombatResult::Loss);
        assert!(state.battlefield.minion(a).is_none());
        assert_eq!(state.battlefield.minion(d).unwrap().health, 2);
    }

    #[test]
    fn test_neither_dies_is_draw() {
        let mut state = state_with(vec![MinionData::new("wall", 1, 5, 1, 1)]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "wall", 6);
        let d = deploy(&mut state, PlayerIndex::SECOND, "wall", 7);

        assert_eq!(state.resolve_combat(a, d).unwrap(), CombatResult::Draw);
        assert_eq!(state.battlefield.minion(a).unwrap().health, 5);
        assert_eq!(state.battlefield.minion(d).unwrap().health, 5);
    }

    #[test]
    fn test_event_order_defender_dies_first() {
        let mut state = state_with(vec![MinionData::new("glass", 5, 1, 1, 1)]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "glass", 6);
        let d = deploy(&mut state, PlayerIndex::SECOND, "glass", 7);
        state.events.clear();

        state.resolve_combat(a, d).unwrap();

        assert_eq!(
            state.events.as_slice(),
            &[
                GameEvent::CombatResolved {
                    attacker: a.0,
                    defender: d.0,
                    result: CombatResult::Draw,
                },
                GameEvent::MinionDied { minion: d.0, tile: 7 },
                GameEvent::MinionDied { minion: a.0, tile: 6 },
            ]
        );
    }

    #[test]
    fn test_missing_combatant_is_error() {
        let mut state = state_with(vec![MinionData::new("wall", 1, 5, 1, 1)]);
        let a = deploy(&mut state, PlayerIndex::FIRST, "wall", 6);
        assert!(matches!(
            state.resolve_combat(a, Uid(42)),
            Err(GameError::MinionNotFound(Uid(42)))
        ));
    }
}
