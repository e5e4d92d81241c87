//! Per-player unit economy: resources, bench and graveyard.
//!
//! The bench holds species waiting to be deployed. The graveyard is a
//! bounded FIFO of fallen species; when it overflows, its oldest entry is
//! revived onto the bench before the new casualty is buried.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::data::{MatchRules, SpeciesId};
use crate::error::{GameError, Result};
use crate::events::{FailureCode, GameEvent};
use crate::grid::PlayerIndex;
use crate::registry::Uid;
use crate::state::MatchState;

/// Identity of a match participant as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a player id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Bounded list of deployable species.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bench {
    capacity: usize,
    entries: Vec<SpeciesId>,
}

impl Bench {
    /// Create an empty bench.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    /// Add a species. Fails without mutation when the bench is full.
    pub fn push(&mut self, species: SpeciesId) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(species);
        true
    }

    /// Remove one instance of `species`, the earliest benched first.
    /// Returns the slot it was taken from.
    pub fn take(&mut self, species: &SpeciesId) -> Option<usize> {
        let slot = self.entries.iter().position(|s| s == species)?;
        self.entries.remove(slot);
        Some(slot)
    }

    /// Check whether a species is available.
    #[must_use]
    pub fn contains(&self, species: &SpeciesId) -> bool {
        self.entries.contains(species)
    }

    /// Number of benched species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is benched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if no more species fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Benched species in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[SpeciesId] {
        &self.entries
    }
}

/// Bounded FIFO of fallen species.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Graveyard {
    capacity: usize,
    entries: VecDeque<SpeciesId>,
}

impl Graveyard {
    /// Create an empty graveyard.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Number of buried species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the graveyard is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the graveyard is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buried species, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &SpeciesId> + '_ {
        self.entries.iter()
    }

    fn pop_oldest(&mut self) -> Option<SpeciesId> {
        self.entries.pop_front()
    }

    fn push_newest(&mut self, species: SpeciesId) {
        self.entries.push_back(species);
    }
}

/// What happened to the graveyard's oldest entry while burying a casualty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BurialOutcome {
    /// There was room; nothing else moved.
    Buried,
    /// The oldest entry was moved back to the bench to make room.
    Revived(SpeciesId),
    /// The oldest entry had to leave but the bench was full, so it is gone.
    Lost(SpeciesId),
}

/// Economy and roster state of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Host-supplied identity.
    pub id: PlayerId,
    /// Seat at the table.
    pub index: PlayerIndex,
    /// Species this player may field.
    pub deck: Vec<SpeciesId>,
    /// Spendable currency. Unsigned, so never negative.
    pub resources: u32,
    /// Species waiting to be deployed.
    pub bench: Bench,
    /// Recently fallen species.
    pub graveyard: Graveyard,
}

impl PlayerState {
    /// Seat a player with the starting bench and resources from `rules`.
    #[must_use]
    pub fn new(id: PlayerId, index: PlayerIndex, rules: &MatchRules) -> Self {
        let mut bench = Bench::new(rules.max_bench_size);
        for species in &rules.starting_bench {
            bench.push(species.clone());
        }
        Self {
            id,
            index,
            deck: rules.deck(),
            resources: rules.initial_resources,
            bench,
            graveyard: Graveyard::new(rules.graveyard_size),
        }
    }

    /// Check if the player can pay `cost`.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.resources >= cost
    }

    /// Pay `cost` if possible. Returns true if the payment happened.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.resources -= cost;
            true
        } else {
            false
        }
    }

    /// Route a fallen species into the graveyard.
    ///
    /// When the graveyard is full its oldest entry is dequeued first and
    /// moved to the bench; only then is `species` appended. If the bench
    /// has no room either, the dequeued entry is lost.
    pub fn bury(&mut self, species: SpeciesId) -> BurialOutcome {
        let mut outcome = BurialOutcome::Buried;
        if self.graveyard.is_full() {
            if let Some(oldest) = self.graveyard.pop_oldest() {
                outcome = if self.bench.push(oldest.clone()) {
                    BurialOutcome::Revived(oldest)
                } else {
                    tracing::warn!(
                        player = %self.index,
                        species = %oldest,
                        "Graveyard and bench both full, oldest casualty lost"
                    );
                    BurialOutcome::Lost(oldest)
                };
            }
        }
        self.graveyard.push_newest(species);
        outcome
    }
}

impl MatchState {
    /// Why `player` cannot spawn `species` onto `tile` right now, if at all.
    ///
    /// Checks bench availability first, then that the tile is an empty spawn
    /// tile owned by `player`.
    #[must_use]
    pub fn spawn_blocker(
        &self,
        player: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
    ) -> Option<FailureCode> {
        let on_bench = self
            .player(player)
            .is_some_and(|p| p.bench.contains(species));
        if !on_bench {
            return Some(FailureCode::SpeciesNotOnBench);
        }
        if !self.battlefield.can_spawn_at(player, tile) {
            return Some(FailureCode::SpawnTileUnavailable);
        }
        None
    }

    /// Deploy `species` from `player`'s bench onto `tile`.
    ///
    /// Takes the species off the bench, pays its cost and places a fresh
    /// minion with one movement point less than its baseline for the
    /// current turn.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSpecies` if the species is not in the roster and
    /// `InvariantViolation` if the spawn is blocked or unaffordable. Callers
    /// check [`spawn_blocker`](Self::spawn_blocker) first.
    pub fn spawn_from_bench(
        &mut self,
        player: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
    ) -> Result<Uid> {
        let data = self
            .rules
            .species(species)
            .cloned()
            .ok_or_else(|| GameError::UnknownSpecies(species.to_string()))?;
        if let Some(failure) = self.spawn_blocker(player, species, tile) {
            return Err(GameError::InvariantViolation(format!(
                "spawn of {species} by {player} on tile {tile} blocked: {failure:?}"
            )));
        }
        if !self.player(player).is_some_and(|p| p.can_afford(data.cost)) {
            return Err(GameError::InvariantViolation(format!(
                "{player} cannot afford {species}"
            )));
        }

        let uid = self.battlefield.place(player, &data, tile, false)?;
        let owner = self.player_or_err(player)?;
        owner.bench.take(species);
        owner.spend(data.cost);
        if let Some(minion) = self.battlefield.minion_mut(uid) {
            minion.movement = minion.movement.saturating_sub(1);
        }

        self.events.push(GameEvent::MinionSpawned { minion: uid.0, tile });
        tracing::info!(player = %player, species = %species, tile, uid = uid.0, "Minion spawned");
        Ok(uid)
    }

    /// Remove a dead minion from the board and route it by kind.
    ///
    /// Tokens simply vanish. Everything else is buried in its owner's
    /// graveyard, which may revive or lose the oldest casualty.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound` if the uid is not on the board.
    pub fn kill_minion(&mut self, uid: Uid) -> Result<()> {
        let tile = self
            .battlefield
            .minion(uid)
            .and_then(|m| m.position)
            .ok_or(GameError::MinionNotFound(uid))?;
        let minion = self.battlefield.remove_from_battle(uid)?;
        self.events.push(GameEvent::MinionDied { minion: uid.0, tile });
        tracing::info!(uid = uid.0, tile, player = %minion.owner, "Minion died");

        if minion.is_token {
            return Ok(());
        }
        let seat = minion.owner.0;
        let outcome = self.player_or_err(minion.owner)?.bury(minion.species);
        match outcome {
            BurialOutcome::Buried => {}
            BurialOutcome::Revived(species) => {
                tracing::debug!(player = seat, species = %species, "Graveyard overflow revived");
                self.events.push(GameEvent::MinionRevived { player: seat });
            }
            BurialOutcome::Lost(_) => {
                self.events.push(GameEvent::MinionLost { player: seat });
            }
        }
        Ok(())
    }

    /// Place a minion for `owner` directly, outside the bench and resource
    /// economy. Used by hosts to set up scenarios.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSpecies`, `UnknownPlayer`, `TileOutOfRange`, or
    /// `InvariantViolation` if the tile is unpathable or occupied.
    pub fn deploy(
        &mut self,
        owner: PlayerIndex,
        species: &SpeciesId,
        tile: usize,
        is_token: bool,
    ) -> Result<Uid> {
        let data = self
            .rules
            .species(species)
            .cloned()
            .ok_or_else(|| GameError::UnknownSpecies(species.to_string()))?;
        if self.player(owner).is_none() {
            return Err(GameError::UnknownPlayer(owner.to_string()));
        }
        let uid = self.battlefield.place(owner, &data, tile, is_token)?;
        self.events.push(GameEvent::MinionSpawned { minion: uid.0, tile });
        tracing::info!(player = %owner, species = %species, tile, is_token, "Minion deployed");
        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: &str) -> SpeciesId {
        SpeciesId::from(id)
    }

    fn player_with(bench: &[&str], graveyard_size: usize, bench_size: usize) -> PlayerState {
        let rules = MatchRules {
            graveyard_size,
            max_bench_size: bench_size,
            starting_bench: bench.iter().map(|s| sid(s)).collect(),
            ..MatchRules::default()
        };
        PlayerState::new(PlayerId::from("alice"), PlayerIndex::FIRST, &rules)
    }

    #[test]
    fn test_bench_push_beyond_capacity_fails() {
        let mut bench = Bench::new(1);
        assert!(bench.push(sid("power")));
        assert!(!bench.push(sid("speed")));
        assert_eq!(bench.entries(), &[sid("power")]);
    }

    #[test]
    fn test_bench_take_removes_one_instance() {
        let mut bench = Bench::new(3);
        bench.push(sid("power"));
        bench.push(sid("speed"));
        bench.push(sid("power"));
        assert_eq!(bench.take(&sid("power")), Some(0));
        assert_eq!(bench.entries(), &[sid("speed"), sid("power")]);
        assert_eq!(bench.take(&sid("technical")), None);
        assert!(bench.insert(0, sid("power")));
        assert_eq!(bench.entries(), &[sid("power"), sid("speed"), sid("power")]);
    }

    #[test]
    fn test_spend_never_goes_negative() {
        let mut player = player_with(&[], 2, 6);
        assert_eq!(player.resources, 1);
        assert!(!player.spend(2));
        assert_eq!(player.resources, 1);
        assert!(player.spend(1));
        assert_eq!(player.resources, 0);
    }

    #[test]
    fn test_bury_with_room() {
        let mut player = player_with(&[], 2, 6);
        assert_eq!(player.bury(sid("power")), BurialOutcome::Buried);
        assert_eq!(player.graveyard.len(), 1);
    }

    #[test]
    fn test_bury_full_graveyard_revives_oldest_first() {
        let mut player = player_with(&[], 2, 6);
        player.bury(sid("a"));
        player.bury(sid("b"));

        let outcome = player.bury(sid("c"));

        assert_eq!(outcome, BurialOutcome::Revived(sid("a")));
        let graveyard: Vec<_> = player.graveyard.entries().cloned().collect();
        assert_eq!(graveyard, vec![sid("b"), sid("c")]);
        assert_eq!(player.bench.entries(), &[sid("a")]);
    }

    #[test]
    fn test_bury_full_graveyard_and_bench_loses_oldest() {
        let mut player = player_with(&["power"], 1, 1);
        player.bury(sid("a"));

        let outcome = player.bury(sid("b"));

        assert_eq!(outcome, BurialOutcome::Lost(sid("a")));
        let graveyard: Vec<_> = player.graveyard.entries().cloned().collect();
        assert_eq!(graveyard, vec![sid("b")]);
        assert_eq!(player.bench.entries(), &[sid("power")]);
    }

    fn match_state() -> MatchState {
        MatchState::new(
            MatchRules::default(),
            &[PlayerId::from("alice"), PlayerId::from("bob")],
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_from_bench_pays_and_penalizes_movement() {
        let mut state = match_state();
        let uid = state
            .spawn_from_bench(PlayerIndex::FIRST, &sid("speed"), 0)
            .unwrap();

        let minion = state.battlefield.minion(uid).unwrap();
        assert_eq!(minion.position, Some(0));
        assert_eq!(minion.movement, 2);
        let player = &state.players[0];
        assert_eq!(player.resources, 0);
        assert_eq!(player.bench.len(), 5);
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::MinionSpawned { minion: uid.0, tile: 0 })
        );
    }

    #[test]
    fn test_spawn_blocker_order() {
        let state = match_state();
        assert_eq!(
            state.spawn_blocker(PlayerIndex::FIRST, &sid("ghost"), 0),
            Some(FailureCode::SpeciesNotOnBench)
        );
        assert_eq!(
            state.spawn_blocker(PlayerIndex::FIRST, &sid("power"), 24),
            Some(FailureCode::SpawnTileUnavailable)
        );
        assert_eq!(
            state.spawn_blocker(PlayerIndex::FIRST, &sid("power"), 4),
            Some(FailureCode::SpawnTileUnavailable)
        );
        assert_eq!(state.spawn_blocker(PlayerIndex::FIRST, &sid("power"), 0), None);
    }

    #[test]
    fn test_kill_token_skips_graveyard() {
        let mut state = match_state();
        let uid = state
            .deploy(PlayerIndex::SECOND, &sid("power"), 7, true)
            .unwrap();
        state.kill_minion(uid).unwrap();
        assert!(state.players[1].graveyard.is_empty());
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::MinionDied { minion: uid.0, tile: 7 })
        );
    }

    #[test]
    fn test_kill_with_full_graveyard_and_bench_loses_oldest() {
        let mut state = match_state();
        for (tile, species) in [(6, "power"), (7, "speed"), (8, "technical"), (9, "speed")] {
            let uid = state
                .deploy(PlayerIndex::FIRST, &sid(species), tile, false)
                .unwrap();
            state.kill_minion(uid).unwrap();
        }
        let graveyard: Vec<_> = state.players[0].graveyard.entries().cloned().collect();
        assert_eq!(graveyard, vec![sid("speed"), sid("technical"), sid("speed")]);
        assert!(state.players[0].bench.is_full());
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::MinionLost { player: 0 })
        );
    }

    #[test]
    fn test_deploy_unknown_species() {
        let mut state = match_state();
        assert!(matches!(
            state.deploy(PlayerIndex::FIRST, &sid("dragon"), 6, true),
            Err(GameError::UnknownSpecies(_))
        ));
    }
}
