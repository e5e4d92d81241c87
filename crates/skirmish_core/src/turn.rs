//! Turn flow: the per-turn countdown and handing the turn to the next seat.

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::grid::PlayerIndex;
use crate::state::MatchState;

/// Whether the match is accepting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameplayPhase {
    /// The current player may act.
    AwaitingInput,
    /// A turn change is in progress; commands and ticks are ignored.
    TurnTransition,
}

impl MatchState {
    /// Hand the turn to the next seat.
    ///
    /// Resets the timer, restores the new player's resources and every
    /// minion's movement, and queues `TurnStarted` followed by a fresh
    /// `RequireInput`. Returns false without doing anything if a
    /// transition is already under way.
    pub fn advance_turn(&mut self) -> bool {
        if self.phase == GameplayPhase::TurnTransition {
            return false;
        }
        self.phase = GameplayPhase::TurnTransition;

        let seats = u8::try_from(self.players.len()).unwrap_or(u8::MAX).max(1);
        let next = PlayerIndex((self.current_player.0 + 1) % seats);
        self.current_player = next;
        self.turns_taken += 1;
        self.timer = self.rules.time_per_turn;

        let initial = self.rules.initial_resources;
        if let Some(player) = self.player_mut(next) {
            player.resources = initial;
        }
        self.battlefield.refresh_movement();

        self.events.push(GameEvent::TurnStarted {
            player: next.0,
            turn: self.turns_taken,
        });
        self.events.push(GameEvent::require_input(next));
        self.phase = GameplayPhase::AwaitingInput;

        tracing::info!(player = %next, turn = self.turns_taken, "Turn started");
        true
    }

    /// Run the turn clock down by `elapsed` seconds.
    ///
    /// The timer saturates at zero; reaching zero clears the event queue
    /// and forfeits the rest of the turn. Returns true if the turn changed.
    /// Outside [`GameplayPhase::AwaitingInput`] this does nothing.
    pub fn tick(&mut self, elapsed: u32) -> bool {
        if self.phase != GameplayPhase::AwaitingInput {
            return false;
        }
        self.timer = self.timer.saturating_sub(elapsed);
        if self.timer > 0 {
            return false;
        }
        tracing::debug!(player = %self.current_player, "Turn timer expired");
        self.events.clear();
        self.advance_turn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MatchRules;
    use crate::economy::PlayerId;

    fn state() -> MatchState {
        MatchState::new(
            MatchRules::default(),
            &[PlayerId::from("alice"), PlayerId::from("bob")],
        )
        .unwrap()
    }

    #[test]
    fn test_advance_rotates_and_resets() {
        let mut state = state();
        state.players[1].resources = 0;
        state.timer = 3;

        assert!(state.advance_turn());

        assert_eq!(state.current_player, PlayerIndex::SECOND);
        assert_eq!(state.turns_taken, 1);
        assert_eq!(state.timer, state.rules.time_per_turn);
        assert_eq!(state.players[1].resources, state.rules.initial_resources);
        assert_eq!(state.phase, GameplayPhase::AwaitingInput);

        assert!(state.advance_turn());
        assert_eq!(state.current_player, PlayerIndex::FIRST);
        assert_eq!(state.turns_taken, 2);
    }

    #[test]
    fn test_advance_queues_turn_started_then_prompt() {
        let mut state = state();
        state.events.clear();
        state.advance_turn();
        assert_eq!(
            state.events.as_slice(),
            &[
                GameEvent::TurnStarted { player: 1, turn: 1 },
                GameEvent::require_input(PlayerIndex::SECOND),
            ]
        );
    }

    #[test]
    fn test_advance_ignored_during_transition() {
        let mut state = state();
        state.phase = GameplayPhase::TurnTransition;
        assert!(!state.advance_turn());
        assert_eq!(state.current_player, PlayerIndex::FIRST);
        assert_eq!(state.turns_taken, 0);
    }

    #[test]
    fn test_tick_counts_down_then_advances() {
        let mut state = state();
        assert!(!state.tick(40));
        assert_eq!(state.timer, 5);
        assert!(state.tick(10));
        assert_eq!(state.current_player, PlayerIndex::SECOND);
        assert_eq!(state.timer, state.rules.time_per_turn);
    }

    #[test]
    fn test_tick_expiry_is_idempotent() {
        let mut state = state();
        assert!(state.tick(45));
        let turns = state.turns_taken;
        assert!(!state.tick(0));
        assert_eq!(state.turns_taken, turns);
    }

    #[test]
    fn test_tick_ignored_during_transition() {
        let mut state = state();
        state.phase = GameplayPhase::TurnTransition;
        assert!(!state.tick(100));
        assert_eq!(state.timer, state.rules.time_per_turn);
    }
}
