//! Match rules: timers, capacities and the species roster.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::species_data::{MinionData, SpeciesId};
use crate::error::{GameError, Result};

/// Seconds of simulated time per turn.
pub const TIME_PER_TURN: u32 = 45;

/// Largest movement budget any species may have.
///
/// Path construction only considers one route, which the standard board
/// guarantees to be the only candidate for budgets up to this value.
pub const MAX_MOVEMENT: u32 = 3;

/// Resources granted at the start of each of a player's turns.
pub const INITIAL_RESOURCES: u32 = 1;

/// Bench capacity.
pub const MAX_BENCH_SIZE: usize = 6;

/// Graveyard capacity.
pub const GRAVEYARD_SIZE: usize = 3;

/// Complete rule set for a match.
///
/// # Example RON
///
/// ```ron
/// MatchRules(
///     time_per_turn: 45,
///     graveyard_size: 2,
///     roster: [
///         MinionData(id: "power", power: 3, health: 2, movement: 1, cost: 1),
///     ],
///     starting_bench: ["power", "power"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRules {
    /// Seconds per turn before the turn is forfeited.
    #[serde(default = "default_time_per_turn")]
    pub time_per_turn: u32,

    /// Upper bound for species movement.
    #[serde(default = "default_max_movement")]
    pub max_movement: u32,

    /// Resources at the start of each turn.
    #[serde(default = "default_initial_resources")]
    pub initial_resources: u32,

    /// Bench capacity.
    #[serde(default = "default_max_bench_size")]
    pub max_bench_size: usize,

    /// Graveyard capacity.
    #[serde(default = "default_graveyard_size")]
    pub graveyard_size: usize,

    /// Every species that can appear in the match.
    pub roster: Vec<MinionData>,

    /// Bench contents each player starts with.
    #[serde(default)]
    pub starting_bench: Vec<SpeciesId>,
}

const fn default_time_per_turn() -> u32 {
    TIME_PER_TURN
}

const fn default_max_movement() -> u32 {
    MAX_MOVEMENT
}

const fn default_initial_resources() -> u32 {
    INITIAL_RESOURCES
}

const fn default_max_bench_size() -> usize {
    MAX_BENCH_SIZE
}

const fn default_graveyard_size() -> usize {
    GRAVEYARD_SIZE
}

impl Default for MatchRules {
    /// The power / speed / technical roster with two of each on the bench.
    fn default() -> Self {
        let roster = vec![
            MinionData::new("power", 3, 2, 1, 1),
            MinionData::new("speed", 1, 2, 3, 1),
            MinionData::new("technical", 2, 3, 2, 1),
        ];
        let starting_bench = roster
            .iter()
            .flat_map(|s| [s.id.clone(), s.id.clone()])
            .collect();
        Self {
            time_per_turn: TIME_PER_TURN,
            max_movement: MAX_MOVEMENT,
            initial_resources: INITIAL_RESOURCES,
            max_bench_size: MAX_BENCH_SIZE,
            graveyard_size: GRAVEYARD_SIZE,
            roster,
            starting_bench,
        }
    }
}

impl MatchRules {
    /// Find a species by id.
    #[must_use]
    pub fn species(&self, id: &SpeciesId) -> Option<&MinionData> {
        self.roster.iter().find(|s| &s.id == id)
    }

    /// Species ids in roster order.
    #[must_use]
    pub fn deck(&self) -> Vec<SpeciesId> {
        self.roster.iter().map(|s| s.id.clone()).collect()
    }

    /// Check the rules for internal consistency.
    ///
    /// Returns a list of validation errors, empty when the rules are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_movement == 0 || self.max_movement > MAX_MOVEMENT {
            errors.push(format!(
                "max_movement {} must be within 1..={MAX_MOVEMENT}",
                self.max_movement
            ));
        }
        if self.time_per_turn == 0 {
            errors.push("time_per_turn must be positive".to_string());
        }
        if self.max_bench_size == 0 {
            errors.push("max_bench_size must be positive".to_string());
        }
        if self.graveyard_size == 0 {
            errors.push("graveyard_size must be positive".to_string());
        }
        if self.roster.is_empty() {
            errors.push("roster is empty".to_string());
        }

        let mut seen = BTreeSet::new();
        for species in &self.roster {
            if !seen.insert(&species.id) {
                errors.push(format!("Duplicate species '{}'", species.id));
            }
            if species.movement == 0 || species.movement > self.max_movement {
                errors.push(format!(
                    "Species '{}' movement {} outside 1..={}",
                    species.id, species.movement, self.max_movement
                ));
            }
            if species.health <= 0 {
                errors.push(format!("Species '{}' has no health", species.id));
            }
            if species.power < 0 {
                errors.push(format!("Species '{}' has negative power", species.id));
            }
        }

        if self.starting_bench.len() > self.max_bench_size {
            errors.push(format!(
                "starting_bench holds {} entries, bench capacity is {}",
                self.starting_bench.len(),
                self.max_bench_size
            ));
        }
        for id in &self.starting_bench {
            if self.species(id).is_none() {
                errors.push(format!("Starting bench species '{id}' not in roster"));
            }
        }

        errors
    }

    /// Parse rules from RON text and validate them.
    ///
    /// # Errors
    ///
    /// Returns `DataParseError` for malformed RON and `InvalidRules` when
    /// validation fails.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    /// Load rules from a RON file and validate them.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`from_ron_str`](Self::from_ron_str).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let rules: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        let errors = rules.validate();
        if errors.is_empty() {
            Ok(rules)
        } else {
            Err(GameError::InvalidRules(errors))
        }
    }
}
