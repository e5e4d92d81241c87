//! Minion registry.
//!
//! Live minions are stored in a slot arena addressed by generation-checked
//! [`MinionHandle`]s, and indexed by their public [`Uid`]. Uids are handed
//! out monotonically and never reused; slots are recycled, but a recycled
//! slot bumps its generation so old handles stop resolving.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{MinionStats, SpeciesId};
use crate::error::{GameError, Result};
use crate::grid::PlayerIndex;

/// Public identifier of a minion. Never zero, never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub u32);

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena handle to a live minion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinionHandle {
    slot: u32,
    generation: u32,
}

/// A minion on (or just removed from) the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minion {
    /// Unique id.
    pub uid: Uid,
    /// Controlling seat.
    pub owner: PlayerIndex,
    /// Species this minion was spawned from.
    pub species: SpeciesId,
    /// Species baseline stats.
    pub base: MinionStats,
    /// Current attack power.
    pub power: i32,
    /// Current health.
    pub health: i32,
    /// Movement points available this turn.
    pub movement: u32,
    /// Tile the minion stands on, `None` when off the grid.
    pub position: Option<usize>,
    /// Tokens vanish on death instead of entering the graveyard.
    pub is_token: bool,
}

impl Minion {
    /// Create a minion at full baseline stats, not yet placed.
    #[must_use]
    pub fn new(uid: Uid, owner: PlayerIndex, species: SpeciesId, base: MinionStats) -> Self {
        Self {
            uid,
            owner,
            species,
            base,
            power: base.power,
            health: base.health,
            movement: base.movement,
            position: None,
            is_token: false,
        }
    }

    /// Returns true if health has dropped to zero or below.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    minion: Option<Minion>,
}

/// Storage for all live minions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinionRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_uid: BTreeMap<Uid, MinionHandle>,
    next_uid: u32,
}

impl MinionRegistry {
    /// Create an empty registry. The first uid handed out is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_uid: BTreeMap::new(),
            next_uid: 1,
        }
    }

    /// Reserve the next uid.
    pub fn allocate_uid(&mut self) -> Uid {
        let uid = Uid(self.next_uid);
        self.next_uid += 1;
        uid
    }

    /// The uid the next call to [`allocate_uid`](Self::allocate_uid) returns.
    #[must_use]
    pub const fn peek_next_uid(&self) -> Uid {
        Uid(self.next_uid)
    }

    /// Store a minion whose uid was obtained from [`allocate_uid`](Self::allocate_uid).
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` if the uid is already live or was never
    /// allocated by this registry.
    pub fn insert(&mut self, minion: Minion) -> Result<MinionHandle> {
        let allocated = minion.uid.0 != 0 && minion.uid.0 < self.next_uid;
        if !allocated || self.by_uid.contains_key(&minion.uid) {
            return Err(GameError::InvariantViolation(format!(
                "uid {} cannot be inserted into the registry",
                minion.uid
            )));
        }
        let uid = minion.uid;
        let handle = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.minion = Some(minion);
            MinionHandle {
                slot,
                generation: entry.generation,
            }
        } else {
            let slot = u32::try_from(self.slots.len())
                .map_err(|_| GameError::InvariantViolation("minion arena exhausted".into()))?;
            self.slots.push(Slot {
                generation: 0,
                minion: Some(minion),
            });
            MinionHandle {
                slot,
                generation: 0,
            }
        };
        self.by_uid.insert(uid, handle);
        Ok(handle)
    }

    /// Resolve a handle. Stale handles resolve to `None`.
    #[must_use]
    pub fn get(&self, handle: MinionHandle) -> Option<&Minion> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.minion.as_ref())
    }

    /// Resolve a handle mutably. Stale handles resolve to `None`.
    pub fn get_mut(&mut self, handle: MinionHandle) -> Option<&mut Minion> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.minion.as_mut())
    }

    /// Remove the minion behind a handle, retiring the handle.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the handle no longer resolves.
    pub fn remove(&mut self, handle: MinionHandle) -> Result<Minion> {
        let stale = GameError::StaleHandle {
            slot: handle.slot,
            generation: handle.generation,
        };
        let Some(entry) = self.slots.get_mut(handle.slot as usize) else {
            return Err(stale);
        };
        if entry.generation != handle.generation {
            return Err(stale);
        }
        let minion = entry.minion.take().ok_or(stale)?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        self.by_uid.remove(&minion.uid);
        Ok(minion)
    }

    /// Current handle for a uid.
    #[must_use]
    pub fn handle_of(&self, uid: Uid) -> Option<MinionHandle> {
        self.by_uid.get(&uid).copied()
    }

    /// Look a minion up by uid.
    #[must_use]
    pub fn by_uid(&self, uid: Uid) -> Option<&Minion> {
        self.handle_of(uid).and_then(|h| self.get(h))
    }

    /// Look a minion up by uid, mutably.
    pub fn by_uid_mut(&mut self, uid: Uid) -> Option<&mut Minion> {
        let handle = self.handle_of(uid)?;
        self.get_mut(handle)
    }

    /// Remove a minion by uid.
    ///
    /// # Errors
    ///
    /// Returns `MinionNotFound` if no live minion has this uid.
    pub fn remove_uid(&mut self, uid: Uid) -> Result<Minion> {
        let handle = self.handle_of(uid).ok_or(GameError::MinionNotFound(uid))?;
        self.remove(handle)
    }

    /// Check whether a uid is live.
    #[must_use]
    pub fn contains(&self, uid: Uid) -> bool {
        self.by_uid.contains_key(&uid)
    }

    /// Number of live minions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    /// Returns true if no minion is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }

    /// Live minions in ascending uid order.
    pub fn iter(&self) -> impl Iterator<Item = &Minion> + '_ {
        self.by_uid.values().filter_map(|&h| self.get(h))
    }

    /// Live minions in arena order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Minion> + '_ {
        self.slots.iter_mut().filter_map(|s| s.minion.as_mut())
    }

    /// Live uids in ascending order.
    #[must_use]
    pub fn uids(&self) -> Vec<Uid> {
        self.by_uid.keys().copied().collect()
    }
}

impl Default for MinionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
