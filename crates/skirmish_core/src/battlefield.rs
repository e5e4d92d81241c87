//! Battlefield state: the tile array plus the minion registry.
//!
//! All occupancy bookkeeping goes through this type so that a tile's
//! occupant and a minion's position always agree.

use serde::{Deserialize, Serialize};

use crate::data::MinionData;
use crate::error::{GameError, Result};
use crate::grid::{self, PlayerIndex, Tile, TileKind};
use crate::registry::{Minion, MinionRegistry, Uid};

/// Tiles and the minions standing on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattlefieldState {
    tiles: Vec<Tile>,
    minions: MinionRegistry,
}

impl BattlefieldState {
    /// Create the standard empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: grid::standard_board(),
            minions: MinionRegistry::new(),
        }
    }

    /// All tiles in index order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// One tile, if the index is on the board.
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// The minion registry.
    #[must_use]
    pub fn minions(&self) -> &MinionRegistry {
        &self.minions
    }

    /// Look a minion up by uid.
    #[must_use]
    pub fn minion(&self, uid: Uid) -> Option<&Minion> {
        self.minions.by_uid(uid)
    }

    /// Look a minion up by uid, mutably.
    pub fn minion_mut(&mut self, uid: Uid) -> Option<&mut Minion> {
        self.minions.by_uid_mut(uid)
    }

    /// The minion standing on a tile.
    #[must_use]
    pub fn occupant(&self, index: usize) -> Option<&Minion> {
        self.tile(index)
            .and_then(|t| t.occupant)
            .and_then(|uid| self.minions.by_uid(uid))
    }

    /// Canonical path on this board, see [`grid::get_path`].
    #[must_use]
    pub fn path(&self, from: usize, to: usize, budget: u32) -> Vec<usize> {
        grid::get_path(&self.tiles, from, to, budget)
    }

    /// Reachable tiles given current occupancy, see [`grid::get_reach`].
    #[must_use]
    pub fn reach(&self, from: usize, budget: u32) -> Vec<usize> {
        grid::get_reach(&self.tiles, from, budget)
    }

    /// Reach of the minion with `uid`, using its current movement.
    #[must_use]
    pub fn reach_of(&self, uid: Uid) -> Vec<usize> {
        self.minion(uid)
            .and_then(|m| m.position.map(|p| self.reach(p, m.movement)))
            .unwrap_or_default()
    }

    /// Returns true if `owner` may spawn onto `index` right now: the tile is
    /// a spawn tile owned by `owner` and nobody stands on it.
    #[must_use]
    pub fn can_spawn_at(&self, owner: PlayerIndex, index: usize) -> bool {
        self.tile(index).is_some_and(|t| {
            t.kind == TileKind::Spawn && t.owner == Some(owner) && !t.is_occupied()
        })
    }

    /// Put a new minion of `species` on `index`.
    ///
    /// Assigns the next uid, inserts into the registry, sets the tile
    /// occupant and the minion's position. Tile type and ownership are the
    /// caller's concern; only range, pathability and vacancy are enforced.
    ///
    /// # Errors
    ///
    /// Returns `TileOutOfRange` for an index off the board and
    /// `InvariantViolation` if the tile is unpathable or occupied.
    pub fn place(
        &mut self,
        owner: PlayerIndex,
        species: &MinionData,
        index: usize,
        is_token: bool,
    ) -> Result<Uid> {
        let tile = self.tile(index).ok_or(GameError::TileOutOfRange(index))?;
        if !tile.kind.is_pathable() || tile.is_occupied() {
            return Err(GameError::InvariantViolation(format!(
                "cannot place a minion on tile {index}"
            )));
        }

        let uid = self.minions.allocate_uid();
        let mut minion = Minion::new(uid, owner, species.id.clone(), species.stats());
        minion.position = Some(index);
        minion.is_token = is_token;
        self.minions.insert(minion)?;
        self.tiles[index].occupant = Some(uid);
        tracing::debug!(uid = uid.0, tile = index, player = %owner, "Minion placed");
        Ok(uid)
    }

    /// Take a minion off the board: clear its tile and delete it from the
    /// registry. Where it goes next (bench, graveyard, nowhere) is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound` if no live minion has this uid.
    pub fn remove_from_battle(&mut self, uid: Uid) -> Result<Minion> {
        let mut minion = self.minions.remove_uid(uid)?;
        if let Some(index) = minion.position.take() {
            if let Some(tile) = self.tiles.get_mut(index) {
                if tile.occupant == Some(uid) {
                    tile.occupant = None;
                }
            }
        }
        Ok(minion)
    }

    /// Move a minion one tile, returning the tile it left.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound`, `TileOutOfRange`, or `InvariantViolation`
    /// if the minion is off the grid or `to` is occupied or unpathable.
    pub fn step(&mut self, uid: Uid, to: usize) -> Result<usize> {
        let target = self.tile(to).ok_or(GameError::TileOutOfRange(to))?;
        if !target.kind.is_pathable() || target.is_occupied() {
            return Err(GameError::InvariantViolation(format!(
                "minion {uid} cannot step onto tile {to}"
            )));
        }
        let minion = self
            .minions
            .by_uid_mut(uid)
            .ok_or(GameError::MinionNotFound(uid))?;
        let from = minion.position.ok_or_else(|| {
            GameError::InvariantViolation(format!("minion {uid} is not on the grid"))
        })?;
        minion.position = Some(to);
        self.tiles[from].occupant = None;
        self.tiles[to].occupant = Some(uid);
        Ok(from)
    }

    /// Restore every minion's movement to its species baseline.
    pub fn refresh_movement(&mut self) {
        for minion in self.minions.iter_mut() {
            minion.movement = minion.base.movement;
        }
    }

    /// Verify occupancy bookkeeping.
    ///
    /// Every occupied tile must reference a live minion whose position is
    /// that tile, and every placed minion must be referenced by its tile.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first inconsistency.
    pub fn check_invariants(&self) -> Result<()> {
        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.index != index {
                return Err(GameError::InvariantViolation(format!(
                    "tile at {index} claims index {}",
                    tile.index
                )));
            }
            let Some(uid) = tile.occupant else {
                continue;
            };
            let Some(minion) = self.minions.by_uid(uid) else {
                return Err(GameError::InvariantViolation(format!(
                    "tile {index} references missing minion {uid}"
                )));
            };
            if minion.position != Some(index) {
                return Err(GameError::InvariantViolation(format!(
                    "tile {index} holds minion {uid} whose position is {:?}",
                    minion.position
                )));
            }
        }
        for minion in self.minions.iter() {
            let Some(index) = minion.position else {
                return Err(GameError::InvariantViolation(format!(
                    "live minion {} is not on the grid",
                    minion.uid
                )));
            };
            if self.tile(index).and_then(|t| t.occupant) != Some(minion.uid) {
                return Err(GameError::InvariantViolation(format!(
                    "minion {} at {index} is not referenced by its tile",
                    minion.uid
                )));
            }
        }
        Ok(())
    }
}

impl Default for BattlefieldState {
    fn default() -> Self {
        Self::new()
    }
}
