//! Grid topology: the fixed 5×5 board, adjacency, path construction and
//! reachability.
//!
//! Tiles are addressed by row-major index. Every function here is a small
//! bounded computation over at most [`TILE_COUNT`] nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::Uid;

/// Number of columns on the board.
pub const BOARD_COLUMNS: usize = 5;

/// Number of rows on the board.
pub const BOARD_ROWS: usize = 5;

/// Total number of tiles.
pub const TILE_COUNT: usize = BOARD_COLUMNS * BOARD_ROWS;

/// The one tile no minion may enter.
pub const UNPATHABLE_TILE: usize = 12;

/// Index of a seat at the table (0 for the first player, 1 for the second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIndex(pub u8);

impl PlayerIndex {
    /// The seat that moves first.
    pub const FIRST: Self = Self(0);
    /// The second seat.
    pub const SECOND: Self = Self(1);

    /// Seat number as a `usize`, for indexing player lists.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// What a tile is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    /// Hole in the board.
    Unpathable,
    /// Plain terrain.
    #[default]
    Normal,
    /// Deployment point; minions enter the board here.
    Spawn,
    /// A player's home tile.
    Base,
}

impl TileKind {
    /// Returns true if minions may stand on or walk through this tile.
    #[must_use]
    pub const fn is_pathable(self) -> bool {
        !matches!(self, Self::Unpathable)
    }
}

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Row-major index of this tile.
    pub index: usize,
    /// Tile type.
    pub kind: TileKind,
    /// Owning seat, if any.
    pub owner: Option<PlayerIndex>,
    /// Minion standing here, if any.
    pub occupant: Option<Uid>,
}

impl Tile {
    /// Create an unowned, empty tile.
    #[must_use]
    pub const fn new(index: usize, kind: TileKind) -> Self {
        Self {
            index,
            kind,
            owner: None,
            occupant: None,
        }
    }

    /// Builder-style owner assignment.
    #[must_use]
    pub const fn owned_by(mut self, owner: PlayerIndex) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns true if a minion stands on this tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Build the standard board.
///
/// ```text
/// [S0 .  B0 .  S-]
/// [.  .  .  .  . ]
/// [.  .  XX .  . ]
/// [.  .  .  .  . ]
/// [S- .  B1 .  S1]
/// ```
///
/// Corner spawns 4 and 20 are unclaimed.
#[must_use]
pub fn standard_board() -> Vec<Tile> {
    (0..TILE_COUNT)
        .map(|index| match index {
            0 => Tile::new(index, TileKind::Spawn).owned_by(PlayerIndex::FIRST),
            24 => Tile::new(index, TileKind::Spawn).owned_by(PlayerIndex::SECOND),
            4 | 20 => Tile::new(index, TileKind::Spawn),
            2 => Tile::new(index, TileKind::Base).owned_by(PlayerIndex::FIRST),
            22 => Tile::new(index, TileKind::Base).owned_by(PlayerIndex::SECOND),
            UNPATHABLE_TILE => Tile::new(index, TileKind::Unpathable),
            _ => Tile::new(index, TileKind::Normal),
        })
        .collect()
}

#[inline]
const fn row_of(index: usize) -> usize {
    index / BOARD_COLUMNS
}

#[inline]
const fn column_of(index: usize) -> usize {
    index % BOARD_COLUMNS
}

/// Manhattan distance between two tiles.
#[must_use]
pub const fn manhattan_distance(i: usize, j: usize) -> usize {
    row_of(i).abs_diff(row_of(j)) + column_of(i).abs_diff(column_of(j))
}

/// Orthogonal neighbours of tile `i`, in up/down/left/right order.
///
/// Pure boundary check: occupancy and tile type are not considered.
/// Returns nothing for an index outside the board.
#[must_use]
pub fn adjacent_tiles(i: usize) -> Vec<usize> {
    if i >= TILE_COUNT {
        return Vec::new();
    }
    let row = row_of(i);
    let column = column_of(i);
    let mut adjacent = Vec::with_capacity(4);
    if row > 0 {
        adjacent.push(i - BOARD_COLUMNS);
    }
    if row + 1 < BOARD_ROWS {
        adjacent.push(i + BOARD_COLUMNS);
    }
    if column > 0 {
        adjacent.push(i - 1);
    }
    if column + 1 < BOARD_COLUMNS {
        adjacent.push(i + 1);
    }
    adjacent
}

/// Build the canonical path from `i` to `j` using at most `budget` steps.
///
/// Each step closes the row difference first, then the column difference.
/// The returned path excludes `i` and ends with `j`. It is empty when
/// `i == j`, when `j` is farther than `budget`, or when a step would enter an
/// unpathable tile. Occupancy is not checked here.
///
/// Only one path is ever considered, which is sound for budgets up to
/// [`MAX_MOVEMENT`](crate::data::MAX_MOVEMENT) on the standard board.
#[must_use]
pub fn get_path(tiles: &[Tile], i: usize, j: usize, budget: u32) -> Vec<usize> {
    if i == j || i >= tiles.len() || j >= tiles.len() {
        return Vec::new();
    }
    if manhattan_distance(i, j) > budget as usize {
        return Vec::new();
    }

    let (target_row, target_column) = (row_of(j), column_of(j));
    let mut k = i;
    let mut path = Vec::with_capacity(manhattan_distance(i, j));
    for _ in 0..budget {
        let (row, column) = (row_of(k), column_of(k));
        if target_row < row {
            k -= BOARD_COLUMNS;
        } else if target_row > row {
            k += BOARD_COLUMNS;
        } else if target_column < column {
            k -= 1;
        } else {
            k += 1;
        }
        if !tiles[k].kind.is_pathable() {
            return Vec::new();
        }
        path.push(k);
        if k == j {
            return path;
        }
    }
    Vec::new()
}

/// Tiles a minion on `i` could end its move on with `budget` steps.
///
/// Flood-fills over adjacent tiles, skipping unpathable and occupied ones.
/// The origin itself is never included. The result is sorted ascending.
#[must_use]
pub fn get_reach(tiles: &[Tile], i: usize, budget: u32) -> Vec<usize> {
    if budget == 0 || i >= tiles.len() {
        return Vec::new();
    }
    // Best remaining budget seen per tile, so a tile first reached by a long
    // detour is expanded again when a shorter route arrives.
    let mut best: BTreeMap<usize, u32> = BTreeMap::new();
    best.insert(i, budget);
    flood(tiles, &mut best, i, budget);
    best.remove(&i);
    best.into_keys().collect()
}

fn flood(tiles: &[Tile], best: &mut BTreeMap<usize, u32>, i: usize, budget: u32) {
    if budget == 0 {
        return;
    }
    let remaining = budget - 1;
    for k in adjacent_tiles(i) {
        let tile = &tiles[k];
        if !tile.kind.is_pathable() || tile.is_occupied() {
            continue;
        }
        if best.get(&k).is_some_and(|&seen| seen >= remaining) {
            continue;
        }
        best.insert(k, remaining);
        flood(tiles, best, k, remaining);
    }
}
